//! # Session Configuration
//!
//! Settings that shape a [`Session`](crate::session::Session).
//!
//! ## Environment Variables
//!
//! - `SYMFORGE_TARGET_ARCH`: default target architecture (e.g. `x86_64`,
//!   `aarch64`); defaults to the architecture the debugger runs on
//! - `SYMFORGE_ARENA_LIMIT`: byte budget for every type arena the session
//!   creates; unlimited if unset

use std::env;

use crate::arch::Architecture;
use crate::error::{Result, SymforgeError};

/// Environment variable naming the default target architecture.
pub const TARGET_ARCH_VAR: &str = "SYMFORGE_TARGET_ARCH";
/// Environment variable holding the arena byte budget.
pub const ARENA_LIMIT_VAR: &str = "SYMFORGE_ARENA_LIMIT";

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig
{
    /// Architecture used when no execution context is selected.
    pub default_architecture: String,
    /// Byte budget of each arena; `None` is unlimited.
    pub arena_limit: Option<usize>,
}

impl Default for SessionConfig
{
    fn default() -> Self
    {
        Self {
            default_architecture: Architecture::host_name().to_string(),
            arena_limit: None,
        }
    }
}

impl SessionConfig
{
    /// Defaults overridden by the environment.
    ///
    /// ## Errors
    ///
    /// Returns [`SymforgeError::InvalidArgument`] if `SYMFORGE_ARENA_LIMIT` is
    /// not a decimal byte count.
    pub fn from_env() -> Result<Self>
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self>
    {
        let mut config = Self::default();
        if let Some(arch) = lookup(TARGET_ARCH_VAR).filter(|value| !value.trim().is_empty()) {
            config.default_architecture = arch.trim().to_string();
        }
        if let Some(limit) = lookup(ARENA_LIMIT_VAR) {
            let parsed = limit.trim().parse::<usize>().map_err(|err| {
                SymforgeError::InvalidArgument(format!("{ARENA_LIMIT_VAR}={limit:?} is not a byte count: {err}"))
            })?;
            config.arena_limit = Some(parsed);
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_default_architecture(mut self, name: impl Into<String>) -> Self
    {
        self.default_architecture = name.into();
        self
    }

    #[must_use]
    pub fn with_arena_limit(mut self, limit: Option<usize>) -> Self
    {
        self.arena_limit = limit;
        self
    }
}
