//! # Type Owners
//!
//! Classification of caller-supplied owner handles.
//!
//! Types are always allocated against an owner. Architecture owners keep
//! their types for the whole session; module owners keep them until the
//! module is discarded. The allocator does not care which one it has: both
//! expose the same [`TypeStorage`] capabilities (an arena, an architecture and
//! name interning), and [`TypeOwner`] dispatches to whichever it wraps.

use std::rc::Rc;

use tracing::debug;

use crate::arch::Architecture;
use crate::arena::TypeArena;
use crate::error::{Result, SymforgeError};
use crate::module::Module;
use crate::typedesc::{Type, TypeAllocator};

/// A value handed over by the scripting boundary.
///
/// Only architectures and modules can own types; everything else classifies
/// as an invalid owner.
#[derive(Debug, Clone)]
pub enum HostObject
{
    Architecture(Rc<Architecture>),
    Module(Rc<Module>),
    Type(Type),
    Integer(i64),
    String(String),
    None,
}

impl HostObject
{
    /// Short description of what kind of object this is, for messages.
    pub fn kind_name(&self) -> &'static str
    {
        match self {
            HostObject::Architecture(_) => "architecture",
            HostObject::Module(_) => "module",
            HostObject::Type(_) => "type",
            HostObject::Integer(_) => "integer",
            HostObject::String(_) => "string",
            HostObject::None => "none",
        }
    }

    /// The type this object wraps.
    ///
    /// ## Errors
    ///
    /// Returns [`SymforgeError::InvalidArgument`] if the object is not a type.
    pub fn as_type(&self) -> Result<&Type>
    {
        match self {
            HostObject::Type(ty) => Ok(ty),
            other => Err(SymforgeError::InvalidArgument(format!(
                "expected a type, got {}",
                other.kind_name()
            ))),
        }
    }
}

impl From<Type> for HostObject
{
    fn from(ty: Type) -> Self
    {
        HostObject::Type(ty)
    }
}

impl From<Rc<Architecture>> for HostObject
{
    fn from(arch: Rc<Architecture>) -> Self
    {
        HostObject::Architecture(arch)
    }
}

impl From<Rc<Module>> for HostObject
{
    fn from(module: Rc<Module>) -> Self
    {
        HostObject::Module(module)
    }
}

/// What an owner offers to type construction.
pub trait TypeStorage
{
    /// Arena that types of this owner are allocated in.
    fn arena(&self) -> &Rc<TypeArena>;

    /// Architecture the owner's types are laid out for.
    fn architecture(&self) -> &Architecture;

    /// Copy a string into the owner's arena.
    fn intern(&self, s: &str) -> Result<Rc<str>>
    {
        self.arena().intern(s)
    }
}

impl TypeStorage for Architecture
{
    fn arena(&self) -> &Rc<TypeArena>
    {
        Architecture::arena(self)
    }

    fn architecture(&self) -> &Architecture
    {
        self
    }
}

/// A classified owner handle.
#[derive(Debug, Clone)]
pub enum TypeOwner
{
    Architecture(Rc<Architecture>),
    Module(Rc<Module>),
    /// The handle was neither an architecture nor a module.
    Invalid,
}

impl TypeOwner
{
    /// Classify a handle. Never fails; unsupported handles become
    /// [`TypeOwner::Invalid`].
    pub fn classify(object: &HostObject) -> Self
    {
        match object {
            HostObject::Architecture(arch) => TypeOwner::Architecture(Rc::clone(arch)),
            HostObject::Module(module) => TypeOwner::Module(Rc::clone(module)),
            other => {
                debug!(kind = other.kind_name(), "unsupported owner type");
                TypeOwner::Invalid
            }
        }
    }

    pub fn is_valid(&self) -> bool
    {
        !matches!(self, TypeOwner::Invalid)
    }

    pub fn is_module(&self) -> bool
    {
        matches!(self, TypeOwner::Module(_))
    }

    /// The owner's capabilities.
    ///
    /// ## Errors
    ///
    /// Returns [`SymforgeError::UnsupportedOwner`] for an invalid owner.
    pub fn storage(&self) -> Result<&dyn TypeStorage>
    {
        match self {
            TypeOwner::Architecture(arch) => Ok(arch.as_ref()),
            TypeOwner::Module(module) => Ok(module.as_ref()),
            TypeOwner::Invalid => Err(SymforgeError::UnsupportedOwner),
        }
    }

    pub fn arena(&self) -> Result<&Rc<TypeArena>>
    {
        Ok(self.storage()?.arena())
    }

    pub fn architecture(&self) -> Result<&Architecture>
    {
        Ok(self.storage()?.architecture())
    }

    pub fn intern(&self, s: &str) -> Result<Rc<str>>
    {
        self.storage()?.intern(s)
    }

    /// A type allocator bound to this owner.
    pub fn allocator(&self) -> Result<TypeAllocator<'_>>
    {
        TypeAllocator::new(self)
    }
}
