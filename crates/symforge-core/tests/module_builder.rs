//! Tests for building synthetic modules

use symforge_core::config::SessionConfig;
use symforge_core::error::SymforgeError;
use symforge_core::module::{BuilderState, ModuleBuilder};
use symforge_core::owner::HostObject;
use symforge_core::session::Session;
use symforge_core::symtab::{AddressClass, Domain, MinimalSymbolKind, SymbolDef};
use symforge_core::typedesc::init_integer_type;
use symforge_core::types::{Address, Language};

fn session() -> Session
{
    Session::new(SessionConfig::default().with_default_architecture("x86_64")).unwrap()
}

#[test]
fn test_empty_module_builds()
{
    let session = session();
    let mut builder = ModuleBuilder::new("empty");
    assert_eq!(builder.state(), BuilderState::Fresh);

    let module = builder.build(&session).unwrap();
    assert_eq!(builder.state(), BuilderState::Built);
    assert!(builder.is_installed());
    assert_eq!(module.name(), "empty");
    assert_eq!(module.minimal_symbol_count(), 0);
    assert_eq!(module.full_symbol_count(), 0);
    assert!(module.minimal_symbols().unwrap().is_empty());
    assert_eq!(module.compunits().len(), 1);
    assert_eq!(module.compunits()[0].name(), "empty");
    assert_eq!(session.modules().len(), 1);
}

#[test]
fn test_fabricated_sections()
{
    let module = ModuleBuilder::new("sections").build(&session()).unwrap();
    let names: Vec<_> = module.sections().iter().map(|section| section.name).collect();
    assert_eq!(names, [".text", ".data", ".rodata", ".bss"]);
    for section in module.sections() {
        assert_eq!(section.address, Address::ZERO);
        assert_eq!(section.size, 0);
        assert!(!section.overlay_mapped);
    }
    let indices = module.section_indices();
    assert_eq!(module.sections()[indices.text].name, ".text");
    assert_eq!(module.sections()[indices.bss].name, ".bss");
}

#[test]
fn test_second_build_fails_without_mutation()
{
    let session = session();
    let mut builder = ModuleBuilder::new("once");
    builder.add_label_symbol("start", 0x1000u64, None).unwrap();
    let first = builder.build(&session).unwrap();

    let second = builder.build(&session);
    assert!(matches!(second, Err(SymforgeError::AlreadyBuilt(ref name)) if name == "once"));
    assert_eq!(session.modules().len(), 1);
    assert!(first.lookup_minimal_symbol("start").is_some());
    assert_eq!(first.full_symbol_count(), 1);
}

#[test]
fn test_add_after_build_fails()
{
    let session = session();
    let mut builder = ModuleBuilder::new("closed");
    builder.build(&session).unwrap();
    assert!(matches!(
        builder.add_static_symbol("late", 0x10u64, None),
        Err(SymforgeError::AlreadyBuilt(_))
    ));
    assert!(builder.is_empty());
}

#[test]
fn test_label_symbol_in_both_tables()
{
    let session = session();
    let mut builder = ModuleBuilder::new("labels");
    assert!(builder.add_label_symbol("jit_entry", 0x7f00_1000u64, Some("c")).unwrap());
    assert_eq!(builder.state(), BuilderState::Accumulating);
    let module = builder.build(&session).unwrap();

    let minimal = module.minimal_symbol_at(Address::new(0x7f00_1000)).unwrap();
    assert_eq!(minimal.name, "jit_entry");
    assert_eq!(minimal.kind, MinimalSymbolKind::Text);

    let symbol = module.lookup_symbol("jit_entry", Domain::Label).unwrap();
    assert_eq!(symbol.class(), AddressClass::Label);
    assert_eq!(symbol.address(), Some(Address::new(0x7f00_1000)));
    assert_eq!(symbol.language(), Language::C);
    assert_eq!(symbol.section_index(), module.section_indices().text);
}

#[test]
fn test_static_symbol_in_both_tables()
{
    let session = session();
    let mut builder = ModuleBuilder::new("statics");
    builder.add_static_symbol("counter", 0x60_0000u64, Some("c")).unwrap();
    let module = builder.build(&session).unwrap();

    let minimal = module.lookup_minimal_symbol("counter").unwrap();
    assert_eq!(minimal.kind, MinimalSymbolKind::Bss);
    assert_eq!(minimal.address, Address::new(0x60_0000));

    let symbol = module.lookup_symbol("counter", Domain::Var).unwrap();
    assert_eq!(symbol.class(), AddressClass::Static);
    assert_eq!(symbol.address(), Some(Address::new(0x60_0000)));
    assert_eq!(symbol.section_index(), module.section_indices().bss);
}

#[test]
fn test_typedef_only_in_full_table()
{
    let session = session();
    let arch = HostObject::from(session.default_architecture().clone());
    let ty = init_integer_type(&arch, 24, true, "uint24_t").unwrap();

    let mut builder = ModuleBuilder::new("typedefs");
    builder.add_type_symbol("uint24_t", &ty, None).unwrap();
    let module = builder.build(&session).unwrap();

    assert!(module.lookup_minimal_symbol("uint24_t").is_none());
    assert_eq!(module.minimal_symbol_count(), 0);
    let symbol = module.lookup_symbol("uint24_t", Domain::Var).unwrap();
    assert_eq!(symbol.class(), AddressClass::Typedef);
    assert_eq!(symbol.address(), None);
    assert_eq!(module.lookup_type("uint24_t"), Some(ty));
}

#[test]
fn test_unknown_language_is_rejected()
{
    let session = session();
    let arch = HostObject::from(session.default_architecture().clone());
    let ty = init_integer_type(&arch, 32, false, "int").unwrap();

    let mut builder = ModuleBuilder::new("klingon");
    assert!(matches!(
        builder.add_label_symbol("qapla", 0x10u64, Some("klingon")),
        Err(SymforgeError::InvalidLanguage(_))
    ));
    assert!(builder.add_static_symbol("batlh", 0x20u64, Some("klingon")).is_err());
    assert!(builder.add_type_symbol("int", &ty, Some("klingon")).is_err());
    assert!(builder.is_empty());
    assert_eq!(builder.state(), BuilderState::Fresh);
}

#[test]
fn test_duplicate_name_keeps_first_definition()
{
    let session = session();
    let mut builder = ModuleBuilder::new("dupes");
    assert!(builder.add_label_symbol("main", 0x1000u64, None).unwrap());
    assert!(!builder.add_static_symbol("main", 0x2000u64, None).unwrap());
    assert_eq!(builder.len(), 1);
    assert!(matches!(
        builder.definition("main"),
        Some(SymbolDef::Label { address, .. }) if *address == Address::new(0x1000)
    ));

    let module = builder.build(&session).unwrap();
    let minimal = module.lookup_minimal_symbol("main").unwrap();
    assert_eq!(minimal.kind, MinimalSymbolKind::Text);
    assert_eq!(minimal.address, Address::new(0x1000));
}

#[test]
fn test_auto_language_detection()
{
    let session = session();
    let mut builder = ModuleBuilder::new("mangled");
    builder
        .add_label_symbol("_ZN5hello4main17h0123456789abcdefE", 0x4000u64, None)
        .unwrap();
    builder.add_label_symbol("_Z6squarei", 0x5000u64, None).unwrap();
    builder.add_label_symbol("plain_c", 0x6000u64, None).unwrap();
    let module = builder.build(&session).unwrap();

    let rust = module.lookup_symbol("hello::main", Domain::Label).unwrap();
    assert_eq!(rust.language(), Language::Rust);
    assert_eq!(rust.name().raw(), "_ZN5hello4main17h0123456789abcdefE");
    assert_eq!(
        module.lookup_symbol("_Z6squarei", Domain::Label).unwrap().language(),
        Language::Cplus
    );
    assert_eq!(module.lookup_symbol("plain_c", Domain::Label).unwrap().language(), Language::C);
}

#[test]
fn test_module_uses_selected_context_architecture()
{
    let session = session();
    let arch = session.architecture("s390x").unwrap();
    session.select_context(Some(symforge_core::session::ExecutionContext {
        architecture: arch,
        pc: Address::new(0x1000),
    }));
    let module = ModuleBuilder::new("big-endian").build(&session).unwrap();
    assert_eq!(module.arch().name(), "s390x");

    session.select_context(None);
    let module = ModuleBuilder::new("default").build(&session).unwrap();
    assert_eq!(module.arch().name(), "x86_64");
}

#[test]
fn test_failed_build_keeps_definitions()
{
    let session = Session::new(
        SessionConfig::default()
            .with_default_architecture("x86_64")
            .with_arena_limit(Some(8)),
    )
    .unwrap();
    let mut builder = ModuleBuilder::new("tiny");
    builder.add_static_symbol("a_rather_long_symbol_name", 0x10u64, None).unwrap();

    assert!(matches!(builder.build(&session), Err(SymforgeError::ResourceExhausted(_))));
    assert_eq!(builder.state(), BuilderState::Accumulating);
    assert_eq!(builder.len(), 1);
    assert!(session.modules().is_empty());
}

#[test]
fn test_read_now_provider_has_nothing_to_expand()
{
    let module = ModuleBuilder::new("eager").build(&session()).unwrap();
    let provider = module.quick_symbols();
    assert!(module.is_read_now());
    assert!(!provider.has_symbols(&module));
    assert!(!provider.has_unexpanded_symtabs(&module));
    assert!(provider.expand_symtabs_matching(&module, None, Domain::Var));
    assert!(provider.dump(&module).contains("eager"));
}

#[test]
fn test_raw_name_wins_over_demangled_alias()
{
    let session = session();
    for _ in 0..16 {
        let mut builder = ModuleBuilder::new("aliases");
        builder.add_label_symbol("hello::main", 0x1000u64, None).unwrap();
        builder
            .add_label_symbol("_ZN5hello4main17h0123456789abcdefE", 0x2000u64, None)
            .unwrap();
        let module = builder.build(&session).unwrap();

        let symbol = module.lookup_symbol("hello::main", Domain::Label).unwrap();
        assert_eq!(symbol.address(), Some(Address::new(0x1000)));
        let mangled = module
            .lookup_symbol("_ZN5hello4main17h0123456789abcdefE", Domain::Label)
            .unwrap();
        assert_eq!(mangled.address(), Some(Address::new(0x2000)));
    }
}

#[test]
fn test_symbol_order_is_stable()
{
    let session = session();
    let names = ["zeta", "alpha", "mu", "beta", "omega", "kappa"];
    let mut builder = ModuleBuilder::new("ordered");
    for (offset, name) in (0u64..).zip(names) {
        builder.add_static_symbol(name, 0x1000 + offset * 8, None).unwrap();
    }
    let module = builder.build(&session).unwrap();

    let order: Vec<_> = module.compunits()[0]
        .symbols()
        .iter()
        .map(|symbol| symbol.name().raw().to_string())
        .collect();
    assert_eq!(order, ["alpha", "beta", "kappa", "mu", "omega", "zeta"]);
}
