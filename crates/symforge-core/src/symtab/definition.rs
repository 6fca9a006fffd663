//! # Symbol Definitions
//!
//! The three kinds of symbol a synthetic module can carry, and how each one
//! lands in the two symbol tables.
//!
//! | kind    | minimal table        | full table                                   |
//! |---------|----------------------|----------------------------------------------|
//! | typedef | (none, no address)   | `Var` domain, `Typedef` class, text section |
//! | label   | `Text` at address    | `Label` domain, `Label` class, text section |
//! | static  | `Bss` at address     | `Var` domain, `Static` class, bss section   |

use super::compunit::{AddressClass, CompunitBuilder, Domain, Symbol};
use super::minimal::{MinimalSymbolKind, MinimalSymbolReader};
use crate::error::Result;
use crate::module::Module;
use crate::typedesc::Type;
use crate::types::{Address, Language};

/// A pending symbol of a module builder.
#[derive(Debug, Clone)]
pub enum SymbolDef
{
    /// A name for a type.
    Typedef
    {
        ty: Type,
        language: Language,
    },
    /// A code label.
    Label
    {
        address: Address,
        language: Language,
    },
    /// A static-storage variable.
    Static
    {
        address: Address,
        language: Language,
    },
}

impl SymbolDef
{
    pub fn language(&self) -> Language
    {
        match self {
            SymbolDef::Typedef { language, .. } | SymbolDef::Label { language, .. } | SymbolDef::Static { language, .. } => {
                *language
            }
        }
    }

    /// Address of label and static definitions.
    pub fn address(&self) -> Option<Address>
    {
        match self {
            SymbolDef::Typedef { .. } => None,
            SymbolDef::Label { address, .. } | SymbolDef::Static { address, .. } => Some(*address),
        }
    }

    /// Add this definition to the fast lookup table, if it has an address.
    pub fn register_minimal(&self, name: &str, reader: &mut MinimalSymbolReader)
    {
        match self {
            SymbolDef::Typedef { .. } => {}
            SymbolDef::Label { address, .. } => reader.record(name, *address, MinimalSymbolKind::Text),
            SymbolDef::Static { address, .. } => reader.record(name, *address, MinimalSymbolKind::Bss),
        }
    }

    /// Add this definition to the full table of `module`.
    ///
    /// ## Errors
    ///
    /// Fails only if the module's arena cannot store the symbol name.
    pub fn register_full(&self, name: &str, module: &Module, builder: &mut CompunitBuilder) -> Result<()>
    {
        let sections = module.section_indices();
        let symbol = match self {
            SymbolDef::Typedef { ty, language } => {
                Symbol::new(module, name, *language, Domain::Var, AddressClass::Typedef, sections.text)?.with_type(ty.clone())
            }
            SymbolDef::Label { address, language } => {
                Symbol::new(module, name, *language, Domain::Label, AddressClass::Label, sections.text)?.with_address(*address)
            }
            SymbolDef::Static { address, language } => {
                Symbol::new(module, name, *language, Domain::Var, AddressClass::Static, sections.bss)?.with_address(*address)
            }
        };
        builder.add_file_symbol(symbol);
        Ok(())
    }
}
