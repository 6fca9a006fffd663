//! # Error Types
//!
//! Error handling for synthetic debug information.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

/// Broad classification of a [`SymforgeError`].
///
/// Callers at the scripting boundary use this to decide how to surface a
/// failure: invalid arguments and protocol violations are reported back to
/// the caller, fatal errors go to the host's internal-error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind
{
    /// The caller passed something the operation cannot accept.
    InvalidArgument,
    /// The call is not allowed in the current state (e.g. building twice).
    Protocol,
    /// Construction or allocation failed; not retried.
    Fatal,
}

/// Main error type for type construction and module building
///
/// Every recoverable variant is produced before any arena allocation or
/// symbol-table insertion happens, so an error never leaves a builder or an
/// arena half-modified.
///
/// ## Error Categories
///
/// 1. **Invalid arguments**: InvalidArgument, UnsupportedOwner, InvalidLanguage,
///    FieldOutOfRange, InvalidTypeCode, NotComplexBase
/// 2. **Protocol violations**: AlreadyBuilt
/// 3. **Fatal errors**: TypeConstruction, ResourceExhausted, Internal
#[derive(Error, Debug)]
pub enum SymforgeError
{
    /// Invalid argument passed to a type or module operation
    ///
    /// Examples:
    /// - A negative bit size
    /// - A non-type handle where a type was required
    /// - A fixed-point type requested with an architecture owner
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The owner handle is neither an architecture nor a module
    #[error("unsupported owner type")]
    UnsupportedOwner,

    /// The source-language tag is not one of the recognized names
    #[error("invalid language name: {0}")]
    InvalidLanguage(String),

    /// A float-format field was set to a value outside its range
    #[error("{field}: {reason}")]
    FieldOutOfRange
    {
        /// Name of the float-format field
        field: &'static str,
        /// Why the value was rejected
        reason: &'static str,
    },

    /// The numeric type code does not name a known type category
    #[error("Invalid argument: unknown type code {0}")]
    InvalidTypeCode(i64),

    /// The type cannot be used as the base of a complex type
    ///
    /// Only integer and floating-point types qualify. Use
    /// [`can_create_complex_type`](crate::typedesc::can_create_complex_type)
    /// before asking for one.
    #[error("type {0} cannot be used as the base of a complex type")]
    NotComplexBase(String),

    /// `build()` was called on a builder whose module is already installed
    #[error("module {0} has already been built")]
    AlreadyBuilt(String),

    /// The underlying type construction rejected its parameters
    #[error("type construction failed: {0}")]
    TypeConstruction(String),

    /// An arena ran out of its allocation budget, or the host allocator
    /// refused to hand out storage
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// An internal invariant did not hold
    #[error("internal error: {0}")]
    Internal(String),
}

impl SymforgeError
{
    /// Classify the error according to how it should be reported.
    #[must_use]
    pub fn kind(&self) -> ErrorKind
    {
        match self {
            Self::InvalidArgument(_)
            | Self::UnsupportedOwner
            | Self::InvalidLanguage(_)
            | Self::FieldOutOfRange { .. }
            | Self::InvalidTypeCode(_)
            | Self::NotComplexBase(_) => ErrorKind::InvalidArgument,
            Self::AlreadyBuilt(_) => ErrorKind::Protocol,
            Self::TypeConstruction(_) | Self::ResourceExhausted(_) | Self::Internal(_) => ErrorKind::Fatal,
        }
    }

    /// Whether the caller can recover by fixing its input.
    #[must_use]
    pub fn is_recoverable(&self) -> bool
    {
        self.kind() != ErrorKind::Fatal
    }
}

/// Convenience type alias for `Result<T, SymforgeError>`
///
/// ```rust
/// use symforge_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, SymforgeError>;
