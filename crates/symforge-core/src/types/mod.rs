//! # Types
//!
//! Small value types shared by the type allocator and the symbol tables.

pub mod address;
pub mod symbols;

// Re-export all public types
pub use address::Address;
pub use symbols::{Language, SymbolName};
