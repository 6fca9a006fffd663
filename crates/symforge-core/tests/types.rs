//! Tests for addresses, language tags, symbol names and type codes

use std::rc::Rc;

use symforge_core::error::SymforgeError;
use symforge_core::typedesc::TypeCode;
use symforge_core::types::{Address, Language, SymbolName};

#[test]
fn test_address_conversions()
{
    let addr = Address::from(0x1000);
    assert_eq!(addr.value(), 0x1000);
    let raw: u64 = addr.into();
    assert_eq!(raw, 0x1000);
    assert_eq!(Address::default(), Address::ZERO);
}

#[test]
fn test_address_display()
{
    assert_eq!(format!("{}", Address::new(0xdead_beef)), "0x00000000deadbeef");
}

#[test]
fn test_address_ordering()
{
    assert!(Address::new(0x10) < Address::new(0x20));
    assert_eq!(Address::new(7), Address::from(7));
}

#[test]
fn test_language_tags_round_trip()
{
    for language in Language::ALL {
        assert_eq!(language.tag().parse::<Language>().unwrap(), language);
        assert_eq!(language.to_string(), language.tag());
    }
}

#[test]
fn test_language_rejects_unknown_tag()
{
    match Language::parse(Some("klingon")) {
        Err(SymforgeError::InvalidLanguage(name)) => assert_eq!(name, "klingon"),
        other => panic!("expected InvalidLanguage, got {other:?}"),
    }
    // tags are case sensitive
    assert!(Language::parse(Some("Rust")).is_err());
}

#[test]
fn test_language_dwarf_codes()
{
    assert_eq!(Language::Auto.dwarf_code(), None);
    assert_eq!(Language::Rust.dwarf_code(), Some(gimli::DW_LANG_Rust));
    assert_eq!(Language::C.dwarf_code(), Some(gimli::DW_LANG_C));
}

#[test]
fn test_symbol_name_matching()
{
    let name = SymbolName::new(Rc::from("_ZN3app4main17h0011223344556677E"), Some("app::main".to_string()));
    assert_eq!(name.raw(), "_ZN3app4main17h0011223344556677E");
    assert_eq!(name.display_name(), "app::main");
    assert!(name.matches("app::main"));
    assert!(name.matches("_ZN3app4main17h0011223344556677E"));
    assert!(!name.matches("main"));
}

#[test]
fn test_type_code_from_number()
{
    assert_eq!(TypeCode::try_from(1).unwrap(), TypeCode::Ptr);
    assert_eq!(TypeCode::try_from(14).unwrap(), TypeCode::Error);
    assert_eq!(TypeCode::try_from(29).unwrap(), TypeCode::FixedPoint);
    for (number, code) in (0i64..).zip(TypeCode::ALL) {
        assert_eq!(TypeCode::try_from(number).unwrap(), code);
    }
    assert!(matches!(TypeCode::try_from(30), Err(SymforgeError::InvalidTypeCode(30))));
    assert!(matches!(TypeCode::try_from(-5), Err(SymforgeError::InvalidTypeCode(-5))));
}
