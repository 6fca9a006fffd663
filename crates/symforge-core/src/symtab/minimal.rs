//! # Minimal Symbols
//!
//! The fast lookup table: name, address and a coarse kind, no types.
//!
//! Entries are collected with a [`MinimalSymbolReader`] and frozen into a
//! [`MinimalSymbolTable`] by [`MinimalSymbolReader::install`], which sorts
//! them by address, drops exact duplicates and builds the name index.

use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::types::Address;

/// Coarse classification of a minimal symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinimalSymbolKind
{
    /// Code address.
    Text,
    /// Initialized data address.
    Data,
    /// Uninitialized (static storage) data address.
    Bss,
    /// Absolute value, not an address in any section.
    Abs,
}

impl MinimalSymbolKind
{
    pub fn is_text(self) -> bool
    {
        self == MinimalSymbolKind::Text
    }

    /// Data-like kinds: initialized or uninitialized storage.
    pub fn is_data(self) -> bool
    {
        matches!(self, MinimalSymbolKind::Data | MinimalSymbolKind::Bss)
    }
}

impl fmt::Display for MinimalSymbolKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            MinimalSymbolKind::Text => "text",
            MinimalSymbolKind::Data => "data",
            MinimalSymbolKind::Bss => "bss",
            MinimalSymbolKind::Abs => "abs",
        };
        f.pad(label)
    }
}

/// One entry of the fast lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimalSymbol
{
    pub name: String,
    pub address: Address,
    pub kind: MinimalSymbolKind,
}

/// Collects minimal symbols for one module.
#[derive(Debug, Default)]
pub struct MinimalSymbolReader
{
    pending: Vec<MinimalSymbol>,
}

impl MinimalSymbolReader
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Queue a symbol for installation.
    pub fn record(&mut self, name: &str, address: Address, kind: MinimalSymbolKind)
    {
        trace!(name, %address, %kind, "recording minimal symbol");
        self.pending.push(MinimalSymbol {
            name: name.to_string(),
            address,
            kind,
        });
    }

    /// Number of symbols queued so far.
    pub fn len(&self) -> usize
    {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.pending.is_empty()
    }

    /// Freeze the queued symbols into a table.
    #[must_use]
    pub fn install(self) -> MinimalSymbolTable
    {
        let mut symbols = self.pending;
        symbols.sort_by(|a, b| a.address.cmp(&b.address).then_with(|| a.name.cmp(&b.name)));
        symbols.dedup();

        let mut by_name = HashMap::with_capacity(symbols.len());
        for (index, symbol) in symbols.iter().enumerate() {
            by_name.entry(symbol.name.clone()).or_insert(index);
        }
        MinimalSymbolTable { symbols, by_name }
    }
}

/// Address-ordered fast lookup table of a module.
#[derive(Debug, Default, Clone)]
pub struct MinimalSymbolTable
{
    symbols: Vec<MinimalSymbol>,
    by_name: HashMap<String, usize>,
}

impl MinimalSymbolTable
{
    pub fn len(&self) -> usize
    {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.symbols.is_empty()
    }

    /// Symbols in address order.
    pub fn iter(&self) -> impl Iterator<Item = &MinimalSymbol>
    {
        self.symbols.iter()
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<&MinimalSymbol>
    {
        self.by_name.get(name).map(|&index| &self.symbols[index])
    }

    /// First symbol at exactly `address`.
    pub fn lookup_by_address(&self, address: Address) -> Option<&MinimalSymbol>
    {
        let start = self.symbols.partition_point(|symbol| symbol.address < address);
        self.symbols.get(start).filter(|symbol| symbol.address == address)
    }

    /// Closest text symbol at or below `pc`.
    pub fn lookup_by_pc(&self, pc: Address) -> Option<&MinimalSymbol>
    {
        let end = self.symbols.partition_point(|symbol| symbol.address <= pc);
        self.symbols[..end].iter().rev().find(|symbol| symbol.kind.is_text())
    }
}
