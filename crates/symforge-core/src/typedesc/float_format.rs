//! # Float Formats
//!
//! Bit-level description of a floating-point encoding.
//!
//! A [`FloatFormat`] says where the sign, exponent and mantissa live inside a
//! value of `totalsize` bits, how the exponent is biased, which exponent
//! value marks NaN, and whether the integer bit of the mantissa is stored
//! explicitly. Bit offsets count from the most significant bit of the value.
//!
//! Formats are plain mutable values. The setters take the integers that
//! arrive from the scripting boundary and reject anything that does not fit
//! the field; they do not check fields against each other (an exponent
//! overlapping the mantissa is accepted). When a float type is created the
//! format is copied into the owner's arena, so editing a format afterwards
//! never changes an existing type.
//!
//! ## Example
//!
//! ```rust
//! use symforge_core::typedesc::{FloatField, FloatFormat, IntBit};
//!
//! let mut half = FloatFormat::new();
//! half.set_totalsize(16).unwrap();
//! half.set_exp_start(1).unwrap();
//! half.set_exp_len(5).unwrap();
//! half.set_exp_bias(15).unwrap();
//! half.set_exp_nan(31).unwrap();
//! half.set_man_start(6).unwrap();
//! half.set_man_len(10).unwrap();
//! assert_eq!(half.get(FloatField::ManLen), 10);
//! assert_eq!(half.intbit(), IntBit::Implicit);
//! assert!(half.set_totalsize(-1).is_err());
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::error::{Result, SymforgeError};

/// Whether the integer bit of the mantissa is stored in the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IntBit
{
    /// The integer bit is stored (x87 extended precision).
    Explicit,
    /// The integer bit is implied (IEEE 754 binary formats).
    #[default]
    Implicit,
}

impl From<bool> for IntBit
{
    fn from(explicit: bool) -> Self
    {
        if explicit {
            IntBit::Explicit
        } else {
            IntBit::Implicit
        }
    }
}

impl TryFrom<i64> for IntBit
{
    type Error = SymforgeError;

    /// Only the two boolean sentinels `1` (explicit) and `0` (implicit) are
    /// accepted.
    fn try_from(value: i64) -> Result<Self>
    {
        match value {
            1 => Ok(IntBit::Explicit),
            0 => Ok(IntBit::Implicit),
            _ => Err(SymforgeError::FieldOutOfRange {
                field: "intbit",
                reason: "intbit must be True or False",
            }),
        }
    }
}

/// Addressable fields of a [`FloatFormat`], for generic get/set access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatField
{
    TotalSize,
    SignStart,
    ExpStart,
    ExpLen,
    ExpBias,
    ExpNan,
    ManStart,
    ManLen,
    IntBit,
}

impl FloatField
{
    /// All writable fields, in declaration order.
    pub const ALL: [FloatField; 9] = [
        FloatField::TotalSize,
        FloatField::SignStart,
        FloatField::ExpStart,
        FloatField::ExpLen,
        FloatField::ExpBias,
        FloatField::ExpNan,
        FloatField::ManStart,
        FloatField::ManLen,
        FloatField::IntBit,
    ];

    /// Property name at the scripting boundary.
    #[must_use]
    pub fn name(self) -> &'static str
    {
        match self {
            FloatField::TotalSize => "totalsize",
            FloatField::SignStart => "sign_start",
            FloatField::ExpStart => "exp_start",
            FloatField::ExpLen => "exp_len",
            FloatField::ExpBias => "exp_bias",
            FloatField::ExpNan => "exp_nan",
            FloatField::ManStart => "man_start",
            FloatField::ManLen => "man_len",
            FloatField::IntBit => "intbit",
        }
    }
}

/// Layout of a floating-point encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatFormat
{
    totalsize: u32,
    sign_start: u32,
    exp_start: u32,
    exp_len: u32,
    exp_bias: i32,
    exp_nan: u32,
    man_start: u32,
    man_len: u32,
    intbit: IntBit,
    name: Cow<'static, str>,
}

impl Default for FloatFormat
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl FloatFormat
{
    /// A zeroed format with an empty name and an implicit integer bit.
    #[must_use]
    pub fn new() -> Self
    {
        Self {
            totalsize: 0,
            sign_start: 0,
            exp_start: 0,
            exp_len: 0,
            exp_bias: 0,
            exp_nan: 0,
            man_start: 0,
            man_len: 0,
            intbit: IntBit::Implicit,
            name: Cow::Borrowed(""),
        }
    }

    /// IEEE 754 binary32.
    #[must_use]
    pub fn ieee_single() -> Self
    {
        Self::preset("ieee_single", 32, 8, 127, 23, IntBit::Implicit)
    }

    /// IEEE 754 binary64.
    #[must_use]
    pub fn ieee_double() -> Self
    {
        Self::preset("ieee_double", 64, 11, 1023, 52, IntBit::Implicit)
    }

    /// Intel x87 80-bit extended precision.
    #[must_use]
    pub fn i387_ext() -> Self
    {
        Self::preset("i387_ext", 80, 15, 0x3fff, 64, IntBit::Explicit)
    }

    /// Look up a preset by name (`ieee_single`, `ieee_double`, `i387_ext`).
    pub fn preset_by_name(name: &str) -> Option<Self>
    {
        match name {
            "ieee_single" => Some(Self::ieee_single()),
            "ieee_double" => Some(Self::ieee_double()),
            "i387_ext" => Some(Self::i387_ext()),
            _ => None,
        }
    }

    // sign | exponent | mantissa, packed from the most significant bit
    fn preset(name: &'static str, totalsize: u32, exp_len: u32, exp_bias: i32, man_len: u32, intbit: IntBit) -> Self
    {
        Self {
            totalsize,
            sign_start: 0,
            exp_start: 1,
            exp_len,
            exp_bias,
            exp_nan: (1 << exp_len) - 1,
            man_start: 1 + exp_len,
            man_len,
            intbit,
            name: Cow::Borrowed(name),
        }
    }

    pub fn totalsize(&self) -> u32
    {
        self.totalsize
    }

    pub fn sign_start(&self) -> u32
    {
        self.sign_start
    }

    pub fn exp_start(&self) -> u32
    {
        self.exp_start
    }

    pub fn exp_len(&self) -> u32
    {
        self.exp_len
    }

    pub fn exp_bias(&self) -> i32
    {
        self.exp_bias
    }

    pub fn exp_nan(&self) -> u32
    {
        self.exp_nan
    }

    pub fn man_start(&self) -> u32
    {
        self.man_start
    }

    pub fn man_len(&self) -> u32
    {
        self.man_len
    }

    pub fn intbit(&self) -> IntBit
    {
        self.intbit
    }

    /// Diagnostic name. Read-only.
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Formats described here are always considered valid: no structural
    /// check is run on the bytes of a value.
    pub fn is_valid(&self, _bytes: &[u8]) -> bool
    {
        true
    }

    /// Read a field as a scripting-boundary integer.
    #[must_use]
    pub fn get(&self, field: FloatField) -> i64
    {
        match field {
            FloatField::TotalSize => i64::from(self.totalsize),
            FloatField::SignStart => i64::from(self.sign_start),
            FloatField::ExpStart => i64::from(self.exp_start),
            FloatField::ExpLen => i64::from(self.exp_len),
            FloatField::ExpBias => i64::from(self.exp_bias),
            FloatField::ExpNan => i64::from(self.exp_nan),
            FloatField::ManStart => i64::from(self.man_start),
            FloatField::ManLen => i64::from(self.man_len),
            FloatField::IntBit => i64::from(self.intbit == IntBit::Explicit),
        }
    }

    /// Write a field from a scripting-boundary integer.
    ///
    /// ## Errors
    ///
    /// Returns [`SymforgeError::FieldOutOfRange`] and leaves the field
    /// unchanged if the value does not fit: negative or above `u32::MAX` for
    /// the unsigned fields, outside `i32` for `exp_bias`, anything but `0`/`1`
    /// for `intbit`.
    pub fn set(&mut self, field: FloatField, value: i64) -> Result<()>
    {
        let name = field.name();
        match field {
            FloatField::TotalSize => self.totalsize = to_unsigned(name, value)?,
            FloatField::SignStart => self.sign_start = to_unsigned(name, value)?,
            FloatField::ExpStart => self.exp_start = to_unsigned(name, value)?,
            FloatField::ExpLen => self.exp_len = to_unsigned(name, value)?,
            FloatField::ExpBias => self.exp_bias = to_signed(name, value)?,
            FloatField::ExpNan => self.exp_nan = to_unsigned(name, value)?,
            FloatField::ManStart => self.man_start = to_unsigned(name, value)?,
            FloatField::ManLen => self.man_len = to_unsigned(name, value)?,
            FloatField::IntBit => self.intbit = IntBit::try_from(value)?,
        }
        Ok(())
    }

    pub fn set_totalsize(&mut self, value: i64) -> Result<()>
    {
        self.set(FloatField::TotalSize, value)
    }

    pub fn set_sign_start(&mut self, value: i64) -> Result<()>
    {
        self.set(FloatField::SignStart, value)
    }

    pub fn set_exp_start(&mut self, value: i64) -> Result<()>
    {
        self.set(FloatField::ExpStart, value)
    }

    pub fn set_exp_len(&mut self, value: i64) -> Result<()>
    {
        self.set(FloatField::ExpLen, value)
    }

    pub fn set_exp_bias(&mut self, value: i64) -> Result<()>
    {
        self.set(FloatField::ExpBias, value)
    }

    pub fn set_exp_nan(&mut self, value: i64) -> Result<()>
    {
        self.set(FloatField::ExpNan, value)
    }

    pub fn set_man_start(&mut self, value: i64) -> Result<()>
    {
        self.set(FloatField::ManStart, value)
    }

    pub fn set_man_len(&mut self, value: i64) -> Result<()>
    {
        self.set(FloatField::ManLen, value)
    }

    /// The integer-bit convention takes a typed value, so it cannot fail.
    pub fn set_intbit(&mut self, intbit: IntBit)
    {
        self.intbit = intbit;
    }
}

impl fmt::Display for FloatFormat
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let name = if self.name.is_empty() { "<unnamed>" } else { self.name() };
        write!(
            f,
            "{name}: {} bits, sign@{}, exp@{}+{} (bias {}, nan {:#x}), man@{}+{}, {:?} int bit",
            self.totalsize,
            self.sign_start,
            self.exp_start,
            self.exp_len,
            self.exp_bias,
            self.exp_nan,
            self.man_start,
            self.man_len,
            self.intbit
        )
    }
}

fn to_unsigned(field: &'static str, value: i64) -> Result<u32>
{
    if value < 0 {
        return Err(SymforgeError::FieldOutOfRange {
            field,
            reason: "value must not be smaller than zero",
        });
    }
    u32::try_from(value).map_err(|_| SymforgeError::FieldOutOfRange {
        field,
        reason: "value is too large",
    })
}

fn to_signed(field: &'static str, value: i64) -> Result<i32>
{
    i32::try_from(value).map_err(|_| SymforgeError::FieldOutOfRange {
        field,
        reason: "value is too large",
    })
}
