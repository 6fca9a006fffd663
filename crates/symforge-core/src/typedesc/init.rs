//! Type constructors as exposed to the scripting boundary.
//!
//! Each function classifies the owner handle, then delegates to
//! [`TypeAllocator`]. Names are copied into the owner's arena, so the
//! caller's string does not need to outlive the call.

use super::alloc::{complex_of, is_complex_base};
use super::float_format::FloatFormat;
use super::{Type, TypeAllocator, TypeCode};
use crate::error::Result;
use crate::owner::{HostObject, TypeOwner};

fn with_allocator<T>(owner: &HostObject, f: impl FnOnce(&TypeAllocator<'_>) -> Result<T>) -> Result<T>
{
    let owner = TypeOwner::classify(owner);
    let allocator = owner.allocator()?;
    f(&allocator)
}

/// Create a type of an arbitrary category from its numeric type code.
///
/// ## Errors
///
/// Unknown codes are rejected with
/// [`SymforgeError::InvalidTypeCode`](crate::error::SymforgeError::InvalidTypeCode)
/// before the owner is touched.
pub fn init_type(owner: &HostObject, code: i64, bit_size: i32, name: &str) -> Result<Type>
{
    let code = TypeCode::try_from(code)?;
    with_allocator(owner, |alloc| alloc.new_type(code, bit_size, name))
}

pub fn init_integer_type(owner: &HostObject, bit_size: i32, is_unsigned: bool, name: &str) -> Result<Type>
{
    with_allocator(owner, |alloc| alloc.integer(bit_size, is_unsigned, name))
}

pub fn init_character_type(owner: &HostObject, bit_size: i32, is_unsigned: bool, name: &str) -> Result<Type>
{
    with_allocator(owner, |alloc| alloc.character(bit_size, is_unsigned, name))
}

pub fn init_boolean_type(owner: &HostObject, bit_size: i32, is_unsigned: bool, name: &str) -> Result<Type>
{
    with_allocator(owner, |alloc| alloc.boolean(bit_size, is_unsigned, name))
}

/// Create a float type from a copy of `format`, sized by its `totalsize`.
pub fn init_float_type(owner: &HostObject, format: &FloatFormat, name: &str) -> Result<Type>
{
    with_allocator(owner, |alloc| alloc.float(format, -1, name))
}

pub fn init_decfloat_type(owner: &HostObject, bit_size: i32, name: &str) -> Result<Type>
{
    with_allocator(owner, |alloc| alloc.decimal_float(bit_size, name))
}

/// Whether `ty` is a type that can be the base of a complex type.
pub fn can_create_complex_type(ty: &HostObject) -> bool
{
    ty.as_type().is_ok_and(is_complex_base)
}

/// Create (or fetch the cached) complex type built on `base`.
///
/// There is no owner parameter: the complex type is owned by whoever owns
/// `base`.
///
/// ## Errors
///
/// - [`SymforgeError::InvalidArgument`](crate::error::SymforgeError::InvalidArgument)
///   if `base` is not a type
/// - [`SymforgeError::NotComplexBase`](crate::error::SymforgeError::NotComplexBase)
///   if [`can_create_complex_type`] is false for `base`
pub fn init_complex_type(base: &HostObject, name: &str) -> Result<Type>
{
    complex_of(base.as_type()?, name)
}

/// Create a pointer to `target`.
///
/// ## Errors
///
/// [`SymforgeError::InvalidArgument`](crate::error::SymforgeError::InvalidArgument)
/// if `target` is not a type; the owner is not consulted in that case.
pub fn init_pointer_type(owner: &HostObject, target: &HostObject, bit_size: i32, name: &str) -> Result<Type>
{
    let target = target.as_type()?;
    with_allocator(owner, |alloc| alloc.pointer(target, bit_size, name))
}

/// Create a fixed-point type. `owner` must be a module.
pub fn init_fixed_point_type(owner: &HostObject, bit_size: i32, is_unsigned: bool, name: &str) -> Result<Type>
{
    with_allocator(owner, |alloc| alloc.fixed_point(bit_size, is_unsigned, name))
}
