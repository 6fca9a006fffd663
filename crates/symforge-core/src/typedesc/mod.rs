//! # Type Descriptors
//!
//! Synthetic type metadata and the allocator that creates it.
//!
//! A [`Type`] is a cheap, clonable handle to a descriptor living in some
//! owner's [`TypeArena`](crate::arena::TypeArena). Two handles are equal only
//! if they refer to the same descriptor; structurally identical types built
//! twice are distinct, exactly like types read from two compilation units.
//!
//! Construction goes through [`TypeAllocator`] (obtained from a
//! [`TypeOwner`](crate::owner::TypeOwner)) or through the `init_*` functions
//! in [`init`], which mirror the calls available at the scripting boundary.

pub mod alloc;
pub mod float_format;
pub mod init;

use std::fmt;
use std::rc::{Rc, Weak};

use gimli::constants;
use once_cell::unsync::OnceCell;

pub use self::alloc::TypeAllocator;
pub use self::float_format::{FloatField, FloatFormat, IntBit};
pub use self::init::{
    can_create_complex_type, init_boolean_type, init_character_type, init_complex_type, init_decfloat_type,
    init_fixed_point_type, init_float_type, init_integer_type, init_pointer_type, init_type,
};
use crate::arena::{ArenaScope, TypeArena};
use crate::error::SymforgeError;

/// Width of the host's smallest addressable unit, in bits.
pub const TARGET_CHAR_BIT: u32 = 8;

/// Category of a type.
///
/// Discriminants follow the host's type-code numbering so that codes passed
/// through the scripting boundary as integers map one to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeCode
{
    Undef = 0,
    Ptr = 1,
    Array = 2,
    Struct = 3,
    Union = 4,
    Enum = 5,
    Flags = 6,
    Func = 7,
    Int = 8,
    Flt = 9,
    Void = 10,
    Set = 11,
    Range = 12,
    String = 13,
    Error = 14,
    Method = 15,
    MethodPtr = 16,
    MemberPtr = 17,
    Ref = 18,
    RvalueRef = 19,
    Char = 20,
    Bool = 21,
    Complex = 22,
    Typedef = 23,
    Namespace = 24,
    DecFloat = 25,
    Module = 26,
    InternalFunction = 27,
    XMethod = 28,
    FixedPoint = 29,
}

impl TypeCode
{
    /// Every code, indexed by its number.
    pub const ALL: [TypeCode; 30] = [
        TypeCode::Undef,
        TypeCode::Ptr,
        TypeCode::Array,
        TypeCode::Struct,
        TypeCode::Union,
        TypeCode::Enum,
        TypeCode::Flags,
        TypeCode::Func,
        TypeCode::Int,
        TypeCode::Flt,
        TypeCode::Void,
        TypeCode::Set,
        TypeCode::Range,
        TypeCode::String,
        TypeCode::Error,
        TypeCode::Method,
        TypeCode::MethodPtr,
        TypeCode::MemberPtr,
        TypeCode::Ref,
        TypeCode::RvalueRef,
        TypeCode::Char,
        TypeCode::Bool,
        TypeCode::Complex,
        TypeCode::Typedef,
        TypeCode::Namespace,
        TypeCode::DecFloat,
        TypeCode::Module,
        TypeCode::InternalFunction,
        TypeCode::XMethod,
        TypeCode::FixedPoint,
    ];
}

impl TryFrom<i64> for TypeCode
{
    type Error = SymforgeError;

    fn try_from(value: i64) -> Result<Self, SymforgeError>
    {
        usize::try_from(value)
            .ok()
            .and_then(|index| TypeCode::ALL.get(index).copied())
            .ok_or(SymforgeError::InvalidTypeCode(value))
    }
}

/// Which kind of owner a type was allocated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerKind
{
    Architecture,
    Module,
}

/// Float-specific data: the arena copy of the format, usable in exactly one
/// byte order.
#[derive(Debug)]
pub(crate) struct FloatSpec
{
    pub(crate) format: Rc<FloatFormat>,
    pub(crate) byte_order: gimli::RunTimeEndian,
}

/// Scaling factor of a fixed-point type, as a rational number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPointScale
{
    pub numerator: i64,
    pub denominator: u64,
}

impl Default for FixedPointScale
{
    fn default() -> Self
    {
        Self {
            numerator: 1,
            denominator: 1,
        }
    }
}

/// Storage behind a [`Type`] handle.
pub struct TypeData
{
    pub(crate) code: TypeCode,
    pub(crate) bit_size: u32,
    pub(crate) name: Rc<str>,
    pub(crate) is_unsigned: bool,
    pub(crate) target: Option<Type>,
    pub(crate) float: Option<FloatSpec>,
    pub(crate) fixed_point: Option<FixedPointScale>,
    pub(crate) owner: OwnerKind,
    pub(crate) arena: Weak<TypeArena>,
    // weak: the complex type holds its base as target
    pub(crate) complex: OnceCell<Weak<TypeData>>,
}

impl TypeData
{
    pub(crate) fn new(code: TypeCode, bit_size: u32, name: Rc<str>, owner: OwnerKind) -> Self
    {
        Self {
            code,
            bit_size,
            name,
            is_unsigned: false,
            target: None,
            float: None,
            fixed_point: None,
            owner,
            arena: Weak::new(),
            complex: OnceCell::new(),
        }
    }
}

/// Handle to a type descriptor.
///
/// ## Example
///
/// ```rust
/// use symforge_core::arch::Architecture;
/// use symforge_core::owner::{HostObject, TypeOwner};
/// use symforge_core::typedesc::{init_integer_type, init_pointer_type, TypeCode};
///
/// let arch = HostObject::Architecture(Architecture::by_name("x86_64", None).unwrap());
/// let u32_ty = init_integer_type(&arch, 32, true, "u32").unwrap();
/// let ptr = init_pointer_type(&arch, &HostObject::from(u32_ty.clone()), 64, "u32 *").unwrap();
/// assert_eq!(ptr.code(), TypeCode::Ptr);
/// assert_eq!(ptr.target(), Some(&u32_ty));
/// ```
#[derive(Clone)]
pub struct Type(Rc<TypeData>);

impl Type
{
    pub(crate) fn from_data(data: TypeData) -> Self
    {
        Type(Rc::new(data))
    }

    pub fn code(&self) -> TypeCode
    {
        self.0.code
    }

    /// Size in bits.
    pub fn bit_size(&self) -> u32
    {
        self.0.bit_size
    }

    /// Size in bytes.
    pub fn length(&self) -> u32
    {
        self.0.bit_size / TARGET_CHAR_BIT
    }

    pub fn name(&self) -> &str
    {
        &self.0.name
    }

    pub fn is_unsigned(&self) -> bool
    {
        self.0.is_unsigned
    }

    /// Pointee of a pointer type, or base of a complex type.
    pub fn target(&self) -> Option<&Type>
    {
        self.0.target.as_ref()
    }

    pub fn owner_kind(&self) -> OwnerKind
    {
        self.0.owner
    }

    /// Scope of the arena this type lives in, if the arena is still alive.
    pub fn arena_scope(&self) -> Option<ArenaScope>
    {
        self.0.arena.upgrade().map(|arena| arena.scope().clone())
    }

    /// Float format of a float type, if it was built for `byte_order`.
    pub fn float_format_for(&self, byte_order: gimli::RunTimeEndian) -> Option<&FloatFormat>
    {
        self.0
            .float
            .as_ref()
            .filter(|spec| spec.byte_order == byte_order)
            .map(|spec| spec.format.as_ref())
    }

    /// Float format of a float type, in the byte order it was built for.
    pub fn float_format(&self) -> Option<&FloatFormat>
    {
        self.0.float.as_ref().map(|spec| spec.format.as_ref())
    }

    /// The single byte order a float type supports.
    pub fn float_byte_order(&self) -> Option<gimli::RunTimeEndian>
    {
        self.0.float.as_ref().map(|spec| spec.byte_order)
    }

    /// Scaling factor of a fixed-point type.
    pub fn fixed_point_scale(&self) -> Option<FixedPointScale>
    {
        self.0.fixed_point
    }

    /// Whether both handles refer to the same descriptor.
    pub fn same_as(&self, other: &Type) -> bool
    {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// DWARF base-type encoding (`DW_AT_encoding`) for scalar types.
    #[must_use]
    pub fn dwarf_encoding(&self) -> Option<gimli::DwAte>
    {
        let unsigned = self.is_unsigned();
        let encoding = match self.code() {
            TypeCode::Int if unsigned => constants::DW_ATE_unsigned,
            TypeCode::Int => constants::DW_ATE_signed,
            TypeCode::Char if unsigned => constants::DW_ATE_unsigned_char,
            TypeCode::Char => constants::DW_ATE_signed_char,
            TypeCode::Bool => constants::DW_ATE_boolean,
            TypeCode::Flt => constants::DW_ATE_float,
            TypeCode::DecFloat => constants::DW_ATE_decimal_float,
            TypeCode::Complex => constants::DW_ATE_complex_float,
            TypeCode::FixedPoint if unsigned => constants::DW_ATE_unsigned_fixed,
            TypeCode::FixedPoint => constants::DW_ATE_signed_fixed,
            TypeCode::Ptr => constants::DW_ATE_address,
            _ => return None,
        };
        Some(encoding)
    }

    pub(crate) fn data(&self) -> &TypeData
    {
        &self.0
    }

    pub(crate) fn cached_complex(&self) -> Option<Type>
    {
        self.0.complex.get().and_then(Weak::upgrade).map(Type)
    }

    pub(crate) fn cache_complex(&self, complex: &Type)
    {
        // a concurrent set is impossible: arenas are single-threaded
        let _ = self.0.complex.set(Rc::downgrade(&complex.0));
    }
}

impl PartialEq for Type
{
    fn eq(&self, other: &Self) -> bool
    {
        self.same_as(other)
    }
}

impl Eq for Type {}

impl fmt::Debug for Type
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Type")
            .field("code", &self.code())
            .field("bit_size", &self.bit_size())
            .field("name", &self.name())
            .field("unsigned", &self.is_unsigned())
            .field("target", &self.target().map(Type::name))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Type
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.name())
    }
}
