//! Tests for float format field access

use proptest::prelude::*;
use symforge_core::error::SymforgeError;
use symforge_core::typedesc::{FloatField, FloatFormat, IntBit};

const UNSIGNED_FIELDS: [FloatField; 7] = [
    FloatField::TotalSize,
    FloatField::SignStart,
    FloatField::ExpStart,
    FloatField::ExpLen,
    FloatField::ExpNan,
    FloatField::ManStart,
    FloatField::ManLen,
];

#[test]
fn test_new_format_is_zeroed()
{
    let format = FloatFormat::new();
    for field in FloatField::ALL {
        assert_eq!(format.get(field), 0, "{}", field.name());
    }
    assert_eq!(format.intbit(), IntBit::Implicit);
    assert_eq!(format.name(), "");
    assert!(format.is_valid(&[0xff; 4]));
}

#[test]
fn test_presets()
{
    let single = FloatFormat::ieee_single();
    assert_eq!(single.totalsize(), 32);
    assert_eq!(single.exp_len(), 8);
    assert_eq!(single.exp_bias(), 127);
    assert_eq!(single.exp_nan(), 0xff);
    assert_eq!(single.man_start(), 9);
    assert_eq!(single.man_len(), 23);

    let ext = FloatFormat::i387_ext();
    assert_eq!(ext.totalsize(), 80);
    assert_eq!(ext.intbit(), IntBit::Explicit);
    assert_eq!(ext.get(FloatField::IntBit), 1);

    assert_eq!(FloatFormat::preset_by_name("ieee_double").unwrap().totalsize(), 64);
    assert!(FloatFormat::preset_by_name("bfloat16").is_none());
}

#[test]
fn test_negative_unsigned_value_is_rejected()
{
    let mut format = FloatFormat::ieee_single();
    match format.set_exp_len(-1) {
        Err(SymforgeError::FieldOutOfRange { field, reason }) => {
            assert_eq!(field, "exp_len");
            assert_eq!(reason, "value must not be smaller than zero");
        }
        other => panic!("expected FieldOutOfRange, got {other:?}"),
    }
    assert_eq!(format.exp_len(), 8);
}

#[test]
fn test_oversized_values_are_rejected()
{
    let mut format = FloatFormat::new();
    assert!(format.set_man_len(i64::from(u32::MAX)).is_ok());
    assert!(matches!(
        format.set_man_len(i64::from(u32::MAX) + 1),
        Err(SymforgeError::FieldOutOfRange {
            reason: "value is too large",
            ..
        })
    ));
    assert!(format.set_exp_bias(i64::from(i32::MIN)).is_ok());
    assert!(format.set_exp_bias(i64::from(i32::MAX) + 1).is_err());
    for bad in [i64::from(i32::MIN) - 1, i64::MIN] {
        assert!(matches!(
            format.set_exp_bias(bad),
            Err(SymforgeError::FieldOutOfRange {
                field: "exp_bias",
                reason: "value is too large",
            })
        ));
    }
    assert_eq!(format.exp_bias(), i32::MIN);
}

#[test]
fn test_intbit_accepts_only_booleans()
{
    let mut format = FloatFormat::new();
    format.set(FloatField::IntBit, 1).unwrap();
    assert_eq!(format.intbit(), IntBit::Explicit);
    for bad in [2, -1, 42] {
        assert!(matches!(
            format.set(FloatField::IntBit, bad),
            Err(SymforgeError::FieldOutOfRange { field: "intbit", .. })
        ));
    }
    assert_eq!(format.intbit(), IntBit::Explicit);
    format.set_intbit(IntBit::from(false));
    assert_eq!(format.intbit(), IntBit::Implicit);
}

#[test]
fn test_overlapping_fields_are_accepted()
{
    let mut format = FloatFormat::new();
    format.set_totalsize(8).unwrap();
    format.set_exp_start(0).unwrap();
    format.set_exp_len(8).unwrap();
    format.set_man_start(0).unwrap();
    format.set_man_len(64).unwrap();
    assert_eq!(format.man_len(), 64);
}

fn unsigned_field() -> impl Strategy<Value = FloatField>
{
    (0..UNSIGNED_FIELDS.len()).prop_map(|index| UNSIGNED_FIELDS[index])
}

proptest! {
    #[test]
    fn prop_unsigned_fields_round_trip(field in unsigned_field(), value in 0..=i64::from(u32::MAX)) {
        let mut format = FloatFormat::new();
        format.set(field, value).unwrap();
        prop_assert_eq!(format.get(field), value);
    }

    #[test]
    fn prop_exp_bias_round_trips(value in i64::from(i32::MIN)..=i64::from(i32::MAX)) {
        let mut format = FloatFormat::new();
        format.set_exp_bias(value).unwrap();
        prop_assert_eq!(format.get(FloatField::ExpBias), value);
    }

    #[test]
    fn prop_out_of_range_leaves_field_unchanged(
        field in unsigned_field(),
        bad in prop_oneof![i64::MIN..0i64, (i64::from(u32::MAX) + 1)..=i64::MAX],
    ) {
        let mut format = FloatFormat::i387_ext();
        let before = format.get(field);
        prop_assert!(format.set(field, bad).is_err());
        prop_assert_eq!(format.get(field), before);
    }
}
