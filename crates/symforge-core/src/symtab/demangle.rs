//! Symbol demangling and language detection.
//!
//! Symbols registered with the `auto` language tag get their language from
//! their mangling:
//!
//! - **Rust**: demangleable `_R...` (v0) or `_ZN...17h<hash>E` (legacy)
//!   names, or a `::` path
//! - **C++**: other `_Z...` (Itanium) names
//! - **C**: everything else

use std::rc::Rc;

use rustc_demangle::try_demangle;

use crate::types::{Language, SymbolName};

/// Guess the source language of a linkage name.
pub fn detect_language(raw: &str) -> Language
{
    let mangled_rust = (raw.starts_with("_R") || has_legacy_hash(raw)) && try_demangle(raw).is_ok();
    if mangled_rust || raw.contains("::") {
        Language::Rust
    } else if raw.starts_with("_Z") {
        Language::Cplus
    } else {
        Language::C
    }
}

// `_ZN...17h<16 hex digits>E`
fn has_legacy_hash(raw: &str) -> bool
{
    raw.starts_with("_ZN")
        && raw
            .strip_suffix('E')
            .and_then(|body| body.len().checked_sub(19).and_then(|start| body.get(start..)))
            .and_then(|tail| tail.strip_prefix("17h"))
            .is_some_and(|hash| hash.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Replace `Auto` with the language detected from `raw`.
pub fn resolve_language(language: Language, raw: &str) -> Language
{
    match language {
        Language::Auto => detect_language(raw),
        explicit => explicit,
    }
}

/// Build a `SymbolName` from an interned raw name, demangling Rust names.
pub(crate) fn make_symbol_name(raw: Rc<str>, language: Language) -> SymbolName
{
    let demangled = match language {
        Language::Rust => try_demangle(&raw).ok().map(|d| format!("{d:#}")),
        _ => None,
    };
    SymbolName::new(raw, demangled)
}
