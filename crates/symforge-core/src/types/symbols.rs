//! Symbol names and source-language tags.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use gimli::constants;

use crate::error::SymforgeError;

/// Source language a synthetic symbol is attributed to.
///
/// `Auto` is what callers get when they don't name a language; it is
/// resolved from the symbol's mangling when the symbol is materialized (see
/// [`detect_language`](crate::symtab::detect_language)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language
{
    /// Detect from the symbol name at build time.
    Auto,
    C,
    ObjC,
    Cplus,
    D,
    Go,
    Fortran,
    M2,
    Asm,
    Pascal,
    OpenCL,
    Rust,
    Ada,
}

impl Language
{
    /// Every language tag accepted by [`Language::parse`].
    pub const ALL: [Language; 13] = [
        Language::Auto,
        Language::C,
        Language::ObjC,
        Language::Cplus,
        Language::D,
        Language::Go,
        Language::Fortran,
        Language::M2,
        Language::Asm,
        Language::Pascal,
        Language::OpenCL,
        Language::Rust,
        Language::Ada,
    ];

    /// Parse an optional language tag as it arrives from the scripting
    /// boundary. `None` means auto-detection.
    ///
    /// ## Errors
    ///
    /// Returns [`SymforgeError::InvalidLanguage`] for any name that is not
    /// one of the recognized tags.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use symforge_core::types::Language;
    ///
    /// assert_eq!(Language::parse(None).unwrap(), Language::Auto);
    /// assert_eq!(Language::parse(Some("rust")).unwrap(), Language::Rust);
    /// assert!(Language::parse(Some("klingon")).is_err());
    /// ```
    pub fn parse(tag: Option<&str>) -> Result<Self, SymforgeError>
    {
        tag.map_or(Ok(Language::Auto), str::parse)
    }

    /// The tag this language is spelled as at the scripting boundary.
    #[must_use]
    pub fn tag(self) -> &'static str
    {
        match self {
            Language::Auto => "auto",
            Language::C => "c",
            Language::ObjC => "objc",
            Language::Cplus => "cplus",
            Language::D => "d",
            Language::Go => "go",
            Language::Fortran => "fortran",
            Language::M2 => "m2",
            Language::Asm => "asm",
            Language::Pascal => "pascal",
            Language::OpenCL => "opencl",
            Language::Rust => "rust",
            Language::Ada => "ada",
        }
    }

    /// DWARF `DW_AT_language` code for this language, if it has one.
    #[must_use]
    pub fn dwarf_code(self) -> Option<gimli::DwLang>
    {
        let code = match self {
            Language::Auto => return None,
            Language::C => constants::DW_LANG_C,
            Language::ObjC => constants::DW_LANG_ObjC,
            Language::Cplus => constants::DW_LANG_C_plus_plus,
            Language::D => constants::DW_LANG_D,
            Language::Go => constants::DW_LANG_Go,
            Language::Fortran => constants::DW_LANG_Fortran95,
            Language::M2 => constants::DW_LANG_Modula2,
            Language::Asm => constants::DW_LANG_Mips_Assembler,
            Language::Pascal => constants::DW_LANG_Pascal83,
            Language::OpenCL => constants::DW_LANG_OpenCL,
            Language::Rust => constants::DW_LANG_Rust,
            Language::Ada => constants::DW_LANG_Ada95,
        };
        Some(code)
    }
}

impl FromStr for Language
{
    type Err = SymforgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        Language::ALL
            .into_iter()
            .find(|language| language.tag() == s)
            .ok_or_else(|| SymforgeError::InvalidLanguage(s.to_string()))
    }
}

impl fmt::Display for Language
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.tag())
    }
}

/// A symbol name with demangling metadata.
///
/// The raw name is interned in the owning module's arena, so cloning a
/// `SymbolName` never copies the string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolName
{
    raw: Rc<str>,
    demangled: Option<String>,
}

impl SymbolName
{
    /// Construct from an interned linkage name.
    pub fn new(raw: Rc<str>, demangled: Option<String>) -> Self
    {
        Self { raw, demangled }
    }

    /// Raw (possibly mangled) name as it was registered.
    pub fn raw(&self) -> &str
    {
        &self.raw
    }

    /// Demangled human-friendly name if available.
    pub fn demangled(&self) -> Option<&str>
    {
        self.demangled.as_deref()
    }

    /// Preferred presentation (demangled fallback to raw).
    pub fn display_name(&self) -> &str
    {
        self.demangled.as_deref().unwrap_or(&self.raw)
    }

    /// Whether `name` matches either the raw or the demangled spelling.
    pub fn matches(&self, name: &str) -> bool
    {
        &*self.raw == name || self.demangled.as_deref() == Some(name)
    }
}

impl fmt::Display for SymbolName
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.pad(self.display_name())
    }
}
