//! # Modules
//!
//! A module is a unit of debug information installed in the session: a
//! section table, a minimal symbol table and a full symbol table, plus a
//! per-module type arena.
//!
//! Synthetic modules have no file behind them. Their section table is
//! fabricated (four sections at address zero with zero size) so that code
//! indexing sections by kind keeps working, and their tables are populated
//! eagerly by [`ModuleBuilder::build`](builder::ModuleBuilder::build).

pub mod builder;
#[allow(unsafe_code)] // in-place construction over host-allocated memory
pub mod hosted;

use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use smallvec::SmallVec;

pub use self::builder::{BuilderState, ModuleBuilder};
pub use self::hosted::{HostAllocator, HostSlot, HostedModuleBuilder, SystemAllocator};
use crate::arch::Architecture;
use crate::arena::{ArenaScope, TypeArena};
use crate::error::{Result, SymforgeError};
use crate::owner::TypeStorage;
use crate::symtab::{AddressClass, CompunitSymtab, Domain, MinimalSymbol, MinimalSymbolTable, Symbol};
use crate::typedesc::Type;
use crate::types::Address;

/// A section of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjSection
{
    pub name: &'static str,
    pub address: Address,
    pub size: u64,
    /// Whether an overlay maps this section (never, for synthetic modules).
    pub overlay_mapped: bool,
}

impl ObjSection
{
    fn placeholder(name: &'static str) -> Self
    {
        Self {
            name,
            address: Address::ZERO,
            size: 0,
            overlay_mapped: false,
        }
    }
}

/// Positions of the well-known sections in a module's section table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionIndices
{
    pub text: usize,
    pub data: usize,
    pub rodata: usize,
    pub bss: usize,
}

/// Lazy symbol-table expansion hooks.
///
/// The session asks a module's provider whether it has more symbols to
/// expand before falling back to the module's installed tables.
pub trait QuickSymbolFunctions: fmt::Debug
{
    /// Whether the provider holds symbols not yet in the full table.
    fn has_symbols(&self, module: &Module) -> bool;

    /// Whether any symbol table is still waiting to be expanded.
    fn has_unexpanded_symtabs(&self, module: &Module) -> bool;

    /// Expand every symbol table defining `name` in `domain`.
    fn expand_matching_symbols(&self, module: &Module, name: &str, domain: Domain);

    /// Expand symbol tables matching `name` (or all of them for `None`).
    /// Returns `false` if the search was cut short.
    fn expand_symtabs_matching(&self, module: &Module, name: Option<&str>, domain: Domain) -> bool;

    /// Human-readable state of the provider.
    fn dump(&self, module: &Module) -> String;
}

/// Provider for modules whose tables are fully read up front.
///
/// Nothing is ever left to expand, so every hook is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadNowSymbols;

impl QuickSymbolFunctions for ReadNowSymbols
{
    fn has_symbols(&self, _module: &Module) -> bool
    {
        false
    }

    fn has_unexpanded_symtabs(&self, _module: &Module) -> bool
    {
        false
    }

    fn expand_matching_symbols(&self, _module: &Module, _name: &str, _domain: Domain) {}

    fn expand_symtabs_matching(&self, _module: &Module, _name: Option<&str>, _domain: Domain) -> bool
    {
        true
    }

    fn dump(&self, module: &Module) -> String
    {
        format!("{}: all symbols read", module.name())
    }
}

/// A module installed (or about to be installed) in a session.
pub struct Module
{
    name: String,
    architecture: Rc<Architecture>,
    arena: Rc<TypeArena>,
    read_now: bool,
    sections: SmallVec<[ObjSection; 4]>,
    section_indices: SectionIndices,
    minimal_symbols: OnceCell<MinimalSymbolTable>,
    compunits: OnceCell<Vec<CompunitSymtab>>,
    quick_symbols: Box<dyn QuickSymbolFunctions>,
}

impl Module
{
    /// Create an empty synthetic module with a fabricated section table.
    pub fn new_synthetic(name: impl Into<String>, architecture: Rc<Architecture>, arena_limit: Option<usize>) -> Rc<Self>
    {
        let name = name.into();
        let sections: SmallVec<[ObjSection; 4]> = [".text", ".data", ".rodata", ".bss"]
            .into_iter()
            .map(ObjSection::placeholder)
            .collect();
        Rc::new(Self {
            arena: TypeArena::new(ArenaScope::Module(name.clone()), arena_limit),
            name,
            architecture,
            read_now: true,
            sections,
            section_indices: SectionIndices {
                text: 0,
                data: 1,
                rodata: 2,
                bss: 3,
            },
            minimal_symbols: OnceCell::new(),
            compunits: OnceCell::new(),
            quick_symbols: Box::new(ReadNowSymbols),
        })
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Shared handle to the module's architecture.
    pub fn arch(&self) -> &Rc<Architecture>
    {
        &self.architecture
    }

    /// Whether all symbols were read when the module was created.
    pub fn is_read_now(&self) -> bool
    {
        self.read_now
    }

    pub fn sections(&self) -> &[ObjSection]
    {
        &self.sections
    }

    pub fn section_indices(&self) -> SectionIndices
    {
        self.section_indices
    }

    pub fn quick_symbols(&self) -> &dyn QuickSymbolFunctions
    {
        self.quick_symbols.as_ref()
    }

    /// Install the fast lookup table. Allowed once.
    pub fn install_minimal_symbols(&self, table: MinimalSymbolTable) -> Result<()>
    {
        self.minimal_symbols
            .set(table)
            .map_err(|_| SymforgeError::Internal(format!("minimal symbols of {} installed twice", self.name)))
    }

    /// Install the full symbol table. Allowed once.
    pub fn install_compunits(&self, compunits: Vec<CompunitSymtab>) -> Result<()>
    {
        self.compunits
            .set(compunits)
            .map_err(|_| SymforgeError::Internal(format!("full symbols of {} installed twice", self.name)))
    }

    /// The fast lookup table, once installed.
    pub fn minimal_symbols(&self) -> Option<&MinimalSymbolTable>
    {
        self.minimal_symbols.get()
    }

    /// Compilation units of the full table (empty before installation).
    pub fn compunits(&self) -> &[CompunitSymtab]
    {
        self.compunits.get().map_or(&[][..], Vec::as_slice)
    }

    pub fn minimal_symbol_count(&self) -> usize
    {
        self.minimal_symbols().map_or(0, MinimalSymbolTable::len)
    }

    pub fn full_symbol_count(&self) -> usize
    {
        self.compunits().iter().map(CompunitSymtab::len).sum()
    }

    pub fn lookup_minimal_symbol(&self, name: &str) -> Option<&MinimalSymbol>
    {
        self.minimal_symbols()?.lookup_by_name(name)
    }

    pub fn minimal_symbol_at(&self, address: Address) -> Option<&MinimalSymbol>
    {
        self.minimal_symbols()?.lookup_by_address(address)
    }

    /// Find a full symbol by name in `domain`.
    pub fn lookup_symbol(&self, name: &str, domain: Domain) -> Option<&Symbol>
    {
        self.quick_symbols.expand_matching_symbols(self, name, domain);
        self.compunits().iter().find_map(|cu| cu.lookup(name, domain))
    }

    /// Find a type by its typedef name.
    pub fn lookup_type(&self, name: &str) -> Option<Type>
    {
        self.lookup_symbol(name, Domain::Var)
            .filter(|symbol| symbol.class() == AddressClass::Typedef)
            .and_then(|symbol| symbol.ty().cloned())
    }
}

impl TypeStorage for Module
{
    fn arena(&self) -> &Rc<TypeArena>
    {
        &self.arena
    }

    fn architecture(&self) -> &Architecture
    {
        &self.architecture
    }
}

impl fmt::Debug for Module
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("architecture", &self.architecture.name())
            .field("read_now", &self.read_now)
            .field("minimal_symbols", &self.minimal_symbol_count())
            .field("full_symbols", &self.full_symbol_count())
            .finish_non_exhaustive()
    }
}
