//! # Type Arenas
//!
//! Bump-style storage for type descriptors, float formats and names.
//!
//! An arena never frees individual objects: everything allocated in it stays
//! alive (at a stable address) until the arena itself is dropped together
//! with its owner, either an [`Architecture`](crate::arch::Architecture) or a
//! [`Module`](crate::module::Module). Type descriptors only keep a weak
//! back-reference to their arena, so an arena and the types in it never form
//! a reference cycle.
//!
//! ## Thread Safety
//!
//! Arenas use `Cell`/`RefCell` and are deliberately `!Sync`: allocation
//! assumes a single caller, the host's command thread.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::error::{Result, SymforgeError};
use crate::typedesc::float_format::FloatFormat;
use crate::typedesc::{Type, TypeData};

/// Which kind of owner an arena belongs to, and its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArenaScope
{
    /// Architecture-global arena.
    Architecture(String),
    /// Per-module arena.
    Module(String),
}

impl ArenaScope
{
    pub fn is_module(&self) -> bool
    {
        matches!(self, ArenaScope::Module(_))
    }

    /// Name of the owning architecture or module.
    pub fn owner_name(&self) -> &str
    {
        match self {
            ArenaScope::Architecture(name) | ArenaScope::Module(name) => name,
        }
    }
}

impl fmt::Display for ArenaScope
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            ArenaScope::Architecture(name) => write!(f, "architecture {name}"),
            ArenaScope::Module(name) => write!(f, "module {name}"),
        }
    }
}

/// Arena owning the types, float formats and interned names of one owner.
pub struct TypeArena
{
    scope: ArenaScope,
    limit: Option<usize>,
    used: Cell<usize>,
    strings: RefCell<HashSet<Rc<str>>>,
    types: RefCell<Vec<Type>>,
    float_formats: RefCell<Vec<Rc<FloatFormat>>>,
    this: Weak<TypeArena>,
}

impl TypeArena
{
    /// Create an empty arena. `limit` is a byte budget; `None` is unlimited.
    pub fn new(scope: ArenaScope, limit: Option<usize>) -> Rc<Self>
    {
        Rc::new_cyclic(|this| Self {
            scope,
            limit,
            used: Cell::new(0),
            strings: RefCell::new(HashSet::new()),
            types: RefCell::new(Vec::new()),
            float_formats: RefCell::new(Vec::new()),
            this: this.clone(),
        })
    }

    pub fn scope(&self) -> &ArenaScope
    {
        &self.scope
    }

    /// Bytes handed out so far.
    pub fn bytes_used(&self) -> usize
    {
        self.used.get()
    }

    /// Number of type descriptors allocated in this arena.
    pub fn type_count(&self) -> usize
    {
        self.types.borrow().len()
    }

    /// Number of float formats copied into this arena.
    pub fn float_format_count(&self) -> usize
    {
        self.float_formats.borrow().len()
    }

    /// Copy `s` into the arena, returning the arena's copy.
    ///
    /// Equal strings are stored once; interning a string that is already
    /// present costs nothing.
    ///
    /// ## Errors
    ///
    /// Returns [`SymforgeError::ResourceExhausted`] if storing a new string
    /// would exceed the arena's budget.
    pub fn intern(&self, s: &str) -> Result<Rc<str>>
    {
        if let Some(existing) = self.strings.borrow().get(s) {
            return Ok(Rc::clone(existing));
        }
        self.charge(s.len() + 1)?;
        let interned: Rc<str> = Rc::from(s);
        self.strings.borrow_mut().insert(Rc::clone(&interned));
        Ok(interned)
    }

    /// Store a type descriptor, plus `extra` bytes of per-kind payload, in
    /// the arena and hand out a handle to it.
    pub(crate) fn alloc_type(&self, mut data: TypeData, extra: usize) -> Result<Type>
    {
        self.charge(mem::size_of::<TypeData>() + extra)?;
        data.arena = self.this.clone();
        let ty = Type::from_data(data);
        trace!(scope = %self.scope, name = ty.name(), "allocated type");
        self.types.borrow_mut().push(ty.clone());
        Ok(ty)
    }

    /// Copy a float format into the arena.
    ///
    /// The copy is independent of `format`: later edits to the caller's
    /// format never reach types built from the copy.
    pub(crate) fn alloc_float_format(&self, format: &FloatFormat) -> Result<Rc<FloatFormat>>
    {
        self.charge(mem::size_of::<FloatFormat>())?;
        let copy = Rc::new(format.clone());
        self.float_formats.borrow_mut().push(Rc::clone(&copy));
        Ok(copy)
    }

    /// Check that `bytes` more fit into the budget without allocating.
    pub(crate) fn ensure_room(&self, bytes: usize) -> Result<()>
    {
        match self.limit {
            Some(limit) if self.used.get().saturating_add(bytes) > limit => Err(SymforgeError::ResourceExhausted(format!(
                "{} arena limit of {limit} bytes reached",
                self.scope
            ))),
            _ => Ok(()),
        }
    }

    fn charge(&self, bytes: usize) -> Result<()>
    {
        self.ensure_room(bytes)?;
        self.used.set(self.used.get() + bytes);
        Ok(())
    }
}

impl fmt::Debug for TypeArena
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("TypeArena")
            .field("scope", &self.scope)
            .field("limit", &self.limit)
            .field("used", &self.used.get())
            .field("types", &self.type_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_intern_deduplicates()
    {
        let arena = TypeArena::new(ArenaScope::Module("m".into()), None);
        let a = arena.intern("uint24_t").unwrap();
        let used = arena.bytes_used();
        let b = arena.intern("uint24_t").unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(arena.bytes_used(), used);
    }

    #[test]
    fn test_limit_rejects_without_charging()
    {
        let arena = TypeArena::new(ArenaScope::Architecture("x86_64".into()), Some(4));
        assert!(arena.intern("abc").is_ok());
        let used = arena.bytes_used();
        assert!(matches!(arena.intern("toolong"), Err(SymforgeError::ResourceExhausted(_))));
        assert_eq!(arena.bytes_used(), used);
    }
}
