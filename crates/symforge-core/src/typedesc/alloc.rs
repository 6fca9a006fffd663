//! Type allocator bound to an owner.
//!
//! Every constructor validates its parameters first, then checks that the
//! arena has room for the descriptor and its name, and only then touches the
//! arena. A rejected call therefore never leaves an interned name or a
//! half-built descriptor behind.

use std::mem;
use std::rc::Rc;

use tracing::debug;

use super::float_format::FloatFormat;
use super::{FixedPointScale, FloatSpec, OwnerKind, Type, TypeCode, TypeData, TARGET_CHAR_BIT};
use crate::error::{Result, SymforgeError};
use crate::owner::{TypeOwner, TypeStorage};

/// Allocates types in one owner's arena.
pub struct TypeAllocator<'a>
{
    storage: &'a dyn TypeStorage,
    kind: OwnerKind,
}

impl<'a> TypeAllocator<'a>
{
    /// Bind an allocator to a valid owner.
    ///
    /// ## Errors
    ///
    /// Returns [`SymforgeError::UnsupportedOwner`] if the owner is invalid.
    pub fn new(owner: &'a TypeOwner) -> Result<Self>
    {
        let kind = if owner.is_module() {
            OwnerKind::Module
        } else {
            OwnerKind::Architecture
        };
        Ok(Self {
            storage: owner.storage()?,
            kind,
        })
    }

    /// A type of any category with no category-specific data.
    pub fn new_type(&self, code: TypeCode, bit_size: i32, name: &str) -> Result<Type>
    {
        let bits = checked_bit_size(bit_size)?;
        self.alloc(TypeData::new(code, bits, Rc::from(""), self.kind), name, 0)
    }

    pub fn integer(&self, bit_size: i32, is_unsigned: bool, name: &str) -> Result<Type>
    {
        self.scalar(TypeCode::Int, bit_size, is_unsigned, name)
    }

    pub fn character(&self, bit_size: i32, is_unsigned: bool, name: &str) -> Result<Type>
    {
        self.scalar(TypeCode::Char, bit_size, is_unsigned, name)
    }

    pub fn boolean(&self, bit_size: i32, is_unsigned: bool, name: &str) -> Result<Type>
    {
        self.scalar(TypeCode::Bool, bit_size, is_unsigned, name)
    }

    /// A float type laid out by `format`.
    ///
    /// `bit_size` of `-1` takes the size from `format.totalsize()`. The
    /// format is copied into the arena and tied to the architecture's byte
    /// order; the type is not usable in the other byte order.
    ///
    /// ## Errors
    ///
    /// Fails with [`SymforgeError::TypeConstruction`] if the architecture's
    /// byte order is unknown, if the size is not a whole number of bytes, or
    /// if the format does not fit in the requested size.
    pub fn float(&self, format: &FloatFormat, bit_size: i32, name: &str) -> Result<Type>
    {
        let architecture = self.storage.architecture();
        let byte_order = architecture.byte_order().to_runtime_endian().ok_or_else(|| {
            SymforgeError::TypeConstruction(format!("architecture {architecture} has an unrecognized byte order"))
        })?;

        let bits = if bit_size == -1 {
            format.totalsize()
        } else {
            checked_bit_size(bit_size)?
        };
        if bits % TARGET_CHAR_BIT != 0 {
            return Err(SymforgeError::TypeConstruction(format!(
                "float size of {bits} bits is not a whole number of bytes"
            )));
        }
        if format.totalsize() > bits {
            return Err(SymforgeError::TypeConstruction(format!(
                "float format of {} bits does not fit in {bits} bits",
                format.totalsize()
            )));
        }

        let arena = self.storage.arena();
        arena.ensure_room(mem::size_of::<FloatFormat>() + name.len() + 1 + mem::size_of::<TypeData>())?;
        let copy = arena.alloc_float_format(format)?;

        let mut data = TypeData::new(TypeCode::Flt, bits, Rc::from(""), self.kind);
        data.float = Some(FloatSpec {
            format: copy,
            byte_order,
        });
        self.alloc(data, name, 0)
    }

    pub fn decimal_float(&self, bit_size: i32, name: &str) -> Result<Type>
    {
        self.new_type(TypeCode::DecFloat, bit_size, name)
    }

    /// A pointer to `target`. Pointers are unsigned.
    pub fn pointer(&self, target: &Type, bit_size: i32, name: &str) -> Result<Type>
    {
        let bits = checked_bit_size(bit_size)?;
        let mut data = TypeData::new(TypeCode::Ptr, bits, Rc::from(""), self.kind);
        data.is_unsigned = true;
        data.target = Some(target.clone());
        self.alloc(data, name, 0)
    }

    /// A fixed-point type with a scaling factor of 1.
    ///
    /// ## Errors
    ///
    /// Returns [`SymforgeError::InvalidArgument`] unless the owner is a
    /// module: fixed-point data is always module-owned.
    pub fn fixed_point(&self, bit_size: i32, is_unsigned: bool, name: &str) -> Result<Type>
    {
        if self.kind != OwnerKind::Module {
            return Err(SymforgeError::InvalidArgument(
                "fixed point types can only be owned by a module".to_string(),
            ));
        }
        let bits = checked_bit_size(bit_size)?;
        let mut data = TypeData::new(TypeCode::FixedPoint, bits, Rc::from(""), self.kind);
        data.is_unsigned = is_unsigned;
        data.fixed_point = Some(FixedPointScale::default());
        self.alloc(data, name, mem::size_of::<FixedPointScale>())
    }

    fn scalar(&self, code: TypeCode, bit_size: i32, is_unsigned: bool, name: &str) -> Result<Type>
    {
        let bits = checked_bit_size(bit_size)?;
        let mut data = TypeData::new(code, bits, Rc::from(""), self.kind);
        data.is_unsigned = is_unsigned;
        self.alloc(data, name, 0)
    }

    fn alloc(&self, mut data: TypeData, name: &str, extra: usize) -> Result<Type>
    {
        let arena = self.storage.arena();
        arena.ensure_room(name.len() + 1 + mem::size_of::<TypeData>() + extra)?;
        data.name = self.storage.intern(name)?;
        let ty = arena.alloc_type(data, extra)?;
        debug!(
            code = ?ty.code(),
            bits = ty.bit_size(),
            name = ty.name(),
            scope = %arena.scope(),
            "created type"
        );
        Ok(ty)
    }
}

/// Whether `base` can be the component type of a complex type.
pub fn is_complex_base(base: &Type) -> bool
{
    matches!(base.code(), TypeCode::Int | TypeCode::Flt)
}

/// The complex type whose components are `base`.
///
/// The complex type lives in the base type's arena and is cached on the base:
/// asking again returns the same descriptor, whatever name is passed.
pub(crate) fn complex_of(base: &Type, name: &str) -> Result<Type>
{
    if !is_complex_base(base) {
        return Err(SymforgeError::NotComplexBase(base.name().to_string()));
    }
    if let Some(existing) = base.cached_complex() {
        return Ok(existing);
    }

    let arena = base
        .data()
        .arena
        .upgrade()
        .ok_or_else(|| SymforgeError::Internal(format!("owner of type {base} has been released")))?;
    let bits = base.bit_size().checked_mul(2).ok_or_else(|| {
        SymforgeError::TypeConstruction(format!("complex type of {base} would be too large"))
    })?;

    arena.ensure_room(name.len() + 1 + mem::size_of::<TypeData>())?;
    let mut data = TypeData::new(TypeCode::Complex, bits, arena.intern(name)?, base.owner_kind());
    data.target = Some(base.clone());
    let complex = arena.alloc_type(data, 0)?;
    base.cache_complex(&complex);
    debug!(base = base.name(), name = complex.name(), scope = %arena.scope(), "created complex type");
    Ok(complex)
}

fn checked_bit_size(bit_size: i32) -> Result<u32>
{
    let bits = u32::try_from(bit_size)
        .map_err(|_| SymforgeError::InvalidArgument(format!("bit size must not be negative, got {bit_size}")))?;
    if bits % TARGET_CHAR_BIT != 0 {
        return Err(SymforgeError::TypeConstruction(format!(
            "bit size {bits} is not a multiple of {TARGET_CHAR_BIT}"
        )));
    }
    Ok(bits)
}
