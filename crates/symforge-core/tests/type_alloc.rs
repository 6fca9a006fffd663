//! Tests for type construction against architecture and module owners

use std::rc::Rc;

use proptest::prelude::*;
use symforge_core::arch::{Architecture, ByteOrder};
use symforge_core::arena::ArenaScope;
use symforge_core::config::SessionConfig;
use symforge_core::error::SymforgeError;
use symforge_core::module::ModuleBuilder;
use symforge_core::owner::{HostObject, TypeOwner};
use symforge_core::session::Session;
use symforge_core::typedesc::{
    can_create_complex_type, init_boolean_type, init_character_type, init_complex_type, init_decfloat_type,
    init_fixed_point_type, init_float_type, init_integer_type, init_pointer_type, init_type, FixedPointScale,
    FloatFormat, OwnerKind, TypeCode,
};

fn arch_owner(name: &str) -> HostObject
{
    HostObject::from(Architecture::by_name(name, None).unwrap())
}

fn module_owner() -> HostObject
{
    let session = Session::new(SessionConfig::default().with_default_architecture("x86_64")).unwrap();
    let module = ModuleBuilder::new("types").build(&session).unwrap();
    HostObject::from(module)
}

#[test]
fn test_integer_type()
{
    let owner = arch_owner("x86_64");
    let ty = init_integer_type(&owner, 32, true, "uint32_t").unwrap();
    assert_eq!(ty.code(), TypeCode::Int);
    assert_eq!(ty.bit_size(), 32);
    assert_eq!(ty.length(), 4);
    assert_eq!(ty.name(), "uint32_t");
    assert!(ty.is_unsigned());
    assert_eq!(ty.owner_kind(), OwnerKind::Architecture);
    assert_eq!(ty.arena_scope(), Some(ArenaScope::Architecture("x86_64".to_string())));
    assert_eq!(ty.dwarf_encoding(), Some(gimli::DW_ATE_unsigned));
}

#[test]
fn test_character_and_boolean_types()
{
    let owner = arch_owner("aarch64");
    let ch = init_character_type(&owner, 8, false, "char").unwrap();
    assert_eq!(ch.code(), TypeCode::Char);
    assert_eq!(ch.dwarf_encoding(), Some(gimli::DW_ATE_signed_char));

    let flag = init_boolean_type(&owner, 8, true, "_Bool").unwrap();
    assert_eq!(flag.code(), TypeCode::Bool);
    assert!(flag.is_unsigned());
    assert_eq!(flag.dwarf_encoding(), Some(gimli::DW_ATE_boolean));
}

#[test]
fn test_plain_type_from_code()
{
    let owner = arch_owner("x86_64");
    let void = init_type(&owner, 10, 8, "void").unwrap();
    assert_eq!(void.code(), TypeCode::Void);
    assert_eq!(void.dwarf_encoding(), None);

    assert!(matches!(init_type(&owner, 30, 8, "bogus"), Err(SymforgeError::InvalidTypeCode(30))));
    assert!(matches!(init_type(&owner, -1, 8, "bogus"), Err(SymforgeError::InvalidTypeCode(-1))));
}

#[test]
fn test_bit_size_validation()
{
    let owner = arch_owner("x86_64");
    assert!(matches!(
        init_integer_type(&owner, -8, false, "neg"),
        Err(SymforgeError::InvalidArgument(_))
    ));
    assert!(matches!(
        init_integer_type(&owner, 12, false, "odd"),
        Err(SymforgeError::TypeConstruction(_))
    ));
    assert!(init_integer_type(&owner, 0, false, "empty").is_ok());
}

#[test]
fn test_invalid_owner_is_rejected()
{
    for owner in [
        HostObject::None,
        HostObject::Integer(3),
        HostObject::String("x86_64".to_string()),
    ] {
        assert!(!TypeOwner::classify(&owner).is_valid());
        assert!(matches!(
            init_integer_type(&owner, 32, false, "int"),
            Err(SymforgeError::UnsupportedOwner)
        ));
    }

    let ty = init_integer_type(&arch_owner("x86_64"), 32, false, "int").unwrap();
    assert!(matches!(
        init_integer_type(&HostObject::from(ty), 32, false, "int"),
        Err(SymforgeError::UnsupportedOwner)
    ));
}

#[test]
fn test_name_is_copied_into_arena()
{
    let owner = arch_owner("x86_64");
    let ty = {
        let name = String::from("temporary_name_t");
        init_integer_type(&owner, 16, false, &name).unwrap()
    };
    assert_eq!(ty.name(), "temporary_name_t");
}

#[test]
fn test_pointer_keeps_target()
{
    let owner = arch_owner("x86_64");
    let int = init_integer_type(&owner, 32, false, "int").unwrap();
    let ptr = init_pointer_type(&owner, &HostObject::from(int.clone()), 64, "int *").unwrap();
    assert_eq!(ptr.code(), TypeCode::Ptr);
    assert!(ptr.is_unsigned());
    assert!(ptr.target().unwrap().same_as(&int));
    assert_eq!(ptr.dwarf_encoding(), Some(gimli::DW_ATE_address));
}

#[test]
fn test_non_type_handles_are_rejected()
{
    let owner = arch_owner("x86_64");
    for handle in [HostObject::Integer(4), HostObject::String("int".to_string()), HostObject::None, owner.clone()] {
        assert!(matches!(
            init_pointer_type(&owner, &handle, 64, "p"),
            Err(SymforgeError::InvalidArgument(_))
        ));
        assert!(matches!(init_complex_type(&handle, "c"), Err(SymforgeError::InvalidArgument(_))));
        assert!(!can_create_complex_type(&handle));
        assert!(handle.as_type().is_err());
    }
    if let HostObject::Architecture(arch) = &owner {
        assert_eq!(arch.arena().type_count(), 0);
    }
}

#[test]
fn test_float_type_copies_format()
{
    let owner = arch_owner("x86_64");
    let mut format = FloatFormat::ieee_single();
    let ty = init_float_type(&owner, &format, "float").unwrap();
    format.set_totalsize(16).unwrap();

    assert_eq!(ty.code(), TypeCode::Flt);
    assert_eq!(ty.bit_size(), 32);
    let copy = ty.float_format().unwrap();
    assert_eq!(copy.totalsize(), 32);
    assert_eq!(copy.name(), "ieee_single");
    assert_eq!(ty.float_byte_order(), Some(gimli::RunTimeEndian::Little));
    assert!(ty.float_format_for(gimli::RunTimeEndian::Little).is_some());
    assert!(ty.float_format_for(gimli::RunTimeEndian::Big).is_none());
}

#[test]
fn test_float_type_uses_architecture_byte_order()
{
    let ty = init_float_type(&arch_owner("s390x"), &FloatFormat::ieee_double(), "double").unwrap();
    assert_eq!(ty.float_byte_order(), Some(gimli::RunTimeEndian::Big));
}

#[test]
fn test_float_type_rejects_unknown_byte_order()
{
    let arch = Architecture::new("mystery", object::Architecture::Unknown, ByteOrder::Unknown, None);
    let owner = HostObject::from(Rc::clone(&arch));
    assert!(matches!(
        init_float_type(&owner, &FloatFormat::ieee_single(), "float"),
        Err(SymforgeError::TypeConstruction(_))
    ));
    assert_eq!(arch.arena().float_format_count(), 0);
}

#[test]
fn test_float_type_rejects_partial_bytes()
{
    let mut format = FloatFormat::new();
    format.set_totalsize(20).unwrap();
    assert!(matches!(
        init_float_type(&arch_owner("x86_64"), &format, "odd"),
        Err(SymforgeError::TypeConstruction(_))
    ));
}

#[test]
fn test_decimal_float_type()
{
    let ty = init_decfloat_type(&arch_owner("powerpc64"), 64, "_Decimal64").unwrap();
    assert_eq!(ty.code(), TypeCode::DecFloat);
    assert_eq!(ty.dwarf_encoding(), Some(gimli::DW_ATE_decimal_float));
}

#[test]
fn test_complex_type_is_cached()
{
    let owner = arch_owner("x86_64");
    let double = init_float_type(&owner, &FloatFormat::ieee_double(), "double").unwrap();
    let base = HostObject::from(double.clone());
    assert!(can_create_complex_type(&base));

    let complex = init_complex_type(&base, "complex double").unwrap();
    assert_eq!(complex.code(), TypeCode::Complex);
    assert_eq!(complex.bit_size(), 128);
    assert!(complex.target().unwrap().same_as(&double));

    let again = init_complex_type(&base, "another name").unwrap();
    assert!(again.same_as(&complex));
    assert_eq!(again.name(), "complex double");
}

#[test]
fn test_complex_type_requires_numeric_base()
{
    let owner = arch_owner("x86_64");
    let flag = HostObject::from(init_boolean_type(&owner, 8, true, "bool").unwrap());
    assert!(!can_create_complex_type(&flag));
    assert!(matches!(
        init_complex_type(&flag, "complex bool"),
        Err(SymforgeError::NotComplexBase(name)) if name == "bool"
    ));
}

#[test]
fn test_fixed_point_requires_module_owner()
{
    assert!(matches!(
        init_fixed_point_type(&arch_owner("x86_64"), 32, false, "q16"),
        Err(SymforgeError::InvalidArgument(_))
    ));

    let ty = init_fixed_point_type(&module_owner(), 32, true, "uq16").unwrap();
    assert_eq!(ty.code(), TypeCode::FixedPoint);
    assert_eq!(ty.owner_kind(), OwnerKind::Module);
    let scale = ty.fixed_point_scale().unwrap();
    assert_eq!((scale.numerator, scale.denominator), (1, 1));
    assert_eq!(ty.dwarf_encoding(), Some(gimli::DW_ATE_unsigned_fixed));
}

#[test]
fn test_fixed_point_scale_is_charged()
{
    let owner = module_owner();
    let arena = Rc::clone(TypeOwner::classify(&owner).arena().unwrap());

    let before = arena.bytes_used();
    init_integer_type(&owner, 32, false, "i32a").unwrap();
    let integer_cost = arena.bytes_used() - before;

    let before = arena.bytes_used();
    init_fixed_point_type(&owner, 32, false, "q32a").unwrap();
    let fixed_cost = arena.bytes_used() - before;

    assert_eq!(fixed_cost, integer_cost + std::mem::size_of::<FixedPointScale>());
}

#[test]
fn test_module_owned_types_live_in_module_arena()
{
    let owner = module_owner();
    let ty = init_integer_type(&owner, 64, false, "int64_t").unwrap();
    assert_eq!(ty.owner_kind(), OwnerKind::Module);
    assert_eq!(ty.arena_scope(), Some(ArenaScope::Module("types".to_string())));
}

#[test]
fn test_arena_limit_is_enforced()
{
    let arch = Architecture::by_name("x86_64", Some(16)).unwrap();
    let owner = HostObject::from(Rc::clone(&arch));
    assert!(matches!(
        init_integer_type(&owner, 32, false, "int"),
        Err(SymforgeError::ResourceExhausted(_))
    ));
    assert_eq!(arch.arena().bytes_used(), 0);
    assert_eq!(arch.arena().type_count(), 0);
}

proptest! {
    #[test]
    fn prop_pointer_to_integer_resolves(bytes in 0i32..=16, is_unsigned in any::<bool>(), arch_index in 0usize..4) {
        let name = ["x86_64", "aarch64", "s390x", "riscv32"][arch_index];
        let owner = arch_owner(name);
        let int = init_integer_type(&owner, bytes * 8, is_unsigned, "n").unwrap();
        let ptr = init_pointer_type(&owner, &HostObject::from(int.clone()), 64, "n *").unwrap();
        prop_assert!(ptr.target().unwrap().same_as(&int));
        prop_assert_eq!(ptr.target().unwrap().bit_size(), (bytes * 8) as u32);
    }
}
