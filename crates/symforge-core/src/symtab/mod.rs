//! # Symbol Tables
//!
//! The two tables every module carries:
//!
//! - the **minimal** table ([`MinimalSymbolTable`]): names and addresses,
//!   used for quick address-to-name resolution;
//! - the **full** table ([`CompunitSymtab`]): typed symbols organized per
//!   compilation unit.
//!
//! [`SymbolDef`] describes a pending symbol and knows how to register itself
//! in both.

pub mod compunit;
pub mod definition;
pub mod demangle;
pub mod minimal;

pub use compunit::{AddressClass, CompunitBuilder, CompunitSymtab, Domain, Symbol};
pub use definition::SymbolDef;
pub use demangle::{detect_language, resolve_language};
pub use minimal::{MinimalSymbol, MinimalSymbolKind, MinimalSymbolReader, MinimalSymbolTable};
