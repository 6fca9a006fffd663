//! # Full Symbols
//!
//! Typed symbols grouped into a compilation unit.
//!
//! A synthetic module gets exactly one compilation unit, named after the
//! module. Symbols are added to its file-level scope through a
//! [`CompunitBuilder`], which [`end_compunit_symtab`](CompunitBuilder::end_compunit_symtab)
//! turns into an immutable, indexed [`CompunitSymtab`].

use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use super::demangle::{make_symbol_name, resolve_language};
use crate::error::Result;
use crate::module::Module;
use crate::owner::TypeStorage;
use crate::typedesc::Type;
use crate::types::{Address, Language, SymbolName};

/// Namespace a symbol is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain
{
    /// Variables, functions and typedefs.
    Var,
    /// Code labels.
    Label,
}

/// How a symbol's value is to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressClass
{
    /// A type name; the symbol has no address.
    Typedef,
    /// A code label bound to an address.
    Label,
    /// Static-storage-duration data bound to an address.
    Static,
}

impl fmt::Display for AddressClass
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            AddressClass::Typedef => "typedef",
            AddressClass::Label => "label",
            AddressClass::Static => "static",
        };
        f.pad(label)
    }
}

/// A symbol of the full table.
#[derive(Debug, Clone)]
pub struct Symbol
{
    name: SymbolName,
    language: Language,
    domain: Domain,
    class: AddressClass,
    section_index: usize,
    address: Option<Address>,
    ty: Option<Type>,
}

impl Symbol
{
    /// Create a symbol whose name is interned in `module`'s arena.
    ///
    /// `Language::Auto` is resolved from the name here.
    pub fn new(
        module: &Module,
        name: &str,
        language: Language,
        domain: Domain,
        class: AddressClass,
        section_index: usize,
    ) -> Result<Self>
    {
        let language = resolve_language(language, name);
        let raw = module.intern(name)?;
        Ok(Self {
            name: make_symbol_name(raw, language),
            language,
            domain,
            class,
            section_index,
            address: None,
            ty: None,
        })
    }

    /// Bind the symbol to an address.
    #[must_use]
    pub fn with_address(mut self, address: Address) -> Self
    {
        self.address = Some(address);
        self
    }

    /// Attach a type to the symbol.
    #[must_use]
    pub fn with_type(mut self, ty: Type) -> Self
    {
        self.ty = Some(ty);
        self
    }

    pub fn name(&self) -> &SymbolName
    {
        &self.name
    }

    pub fn language(&self) -> Language
    {
        self.language
    }

    pub fn domain(&self) -> Domain
    {
        self.domain
    }

    pub fn class(&self) -> AddressClass
    {
        self.class
    }

    pub fn section_index(&self) -> usize
    {
        self.section_index
    }

    pub fn address(&self) -> Option<Address>
    {
        self.address
    }

    pub fn ty(&self) -> Option<&Type>
    {
        self.ty.as_ref()
    }
}

/// Accumulates the file-level symbols of one compilation unit.
#[derive(Debug)]
pub struct CompunitBuilder
{
    name: String,
    comp_dir: String,
    language: Language,
    file_symbols: Vec<Symbol>,
}

impl CompunitBuilder
{
    pub fn new(name: impl Into<String>, comp_dir: impl Into<String>, language: Language) -> Self
    {
        Self {
            name: name.into(),
            comp_dir: comp_dir.into(),
            language,
            file_symbols: Vec::new(),
        }
    }

    pub fn add_file_symbol(&mut self, symbol: Symbol)
    {
        trace!(cu = %self.name, symbol = %symbol.name, class = %symbol.class, "adding file symbol");
        self.file_symbols.push(symbol);
    }

    /// Freeze the unit.
    ///
    /// Raw names always win over demangled aliases, whatever order the
    /// symbols were added in.
    #[must_use]
    pub fn end_compunit_symtab(self) -> CompunitSymtab
    {
        let mut index = HashMap::with_capacity(self.file_symbols.len());
        for (position, symbol) in self.file_symbols.iter().enumerate() {
            index.entry((symbol.name.raw().to_string(), symbol.domain)).or_insert(position);
        }
        for (position, symbol) in self.file_symbols.iter().enumerate() {
            if let Some(demangled) = symbol.name.demangled() {
                index.entry((demangled.to_string(), symbol.domain)).or_insert(position);
            }
        }
        CompunitSymtab {
            name: self.name,
            comp_dir: self.comp_dir,
            language: self.language,
            symbols: self.file_symbols,
            index,
        }
    }
}

/// A finished compilation unit.
#[derive(Debug, Clone)]
pub struct CompunitSymtab
{
    name: String,
    comp_dir: String,
    language: Language,
    symbols: Vec<Symbol>,
    index: HashMap<(String, Domain), usize>,
}

impl CompunitSymtab
{
    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn comp_dir(&self) -> &str
    {
        &self.comp_dir
    }

    pub fn language(&self) -> Language
    {
        self.language
    }

    pub fn symbols(&self) -> &[Symbol]
    {
        &self.symbols
    }

    pub fn len(&self) -> usize
    {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.symbols.is_empty()
    }

    /// Find a symbol by raw or demangled name in `domain`.
    pub fn lookup(&self, name: &str, domain: Domain) -> Option<&Symbol>
    {
        self.index
            .get(&(name.to_string(), domain))
            .map(|&position| &self.symbols[position])
    }
}
