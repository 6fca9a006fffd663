//! Session event types and helpers.
//!
//! Consumers that cache symbol information (breakpoint resolution, symbol
//! lookup front ends) subscribe to these events to learn about new modules
//! without polling the registry. The session publishes an event whenever a
//! module is installed or the selected execution context changes.

use std::sync::mpsc;

use crate::types::Address;

/// Event emitted by a [`Session`](crate::session::Session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent
{
    /// A module was installed in the registry.
    NewModule
    {
        /// Name of the module.
        name: String,
        /// Entries in its fast lookup table.
        minimal_symbols: usize,
        /// Entries in its full symbol table.
        full_symbols: usize,
    },
    /// An execution context was selected (or cleared).
    ContextSelected
    {
        /// Architecture of the selected frame, if any.
        architecture: Option<String>,
        /// Program counter of the selected frame, if any.
        pc: Option<Address>,
    },
}

impl SessionEvent
{
    /// Human-readable description of the event.
    #[must_use]
    pub fn describe(&self) -> String
    {
        match self {
            Self::NewModule {
                name,
                minimal_symbols,
                full_symbols,
            } => format!("New module {name} ({minimal_symbols} minimal, {full_symbols} full symbols)"),
            Self::ContextSelected {
                architecture: Some(architecture),
                pc,
            } => {
                let mut description = format!("Selected {architecture} context");
                if let Some(pc) = pc {
                    description.push_str(&format!(" at {pc}"));
                }
                description
            }
            Self::ContextSelected { architecture: None, .. } => "Cleared execution context".to_string(),
        }
    }
}

/// Sender side of the session event channel.
pub type SessionEventSender = mpsc::Sender<SessionEvent>;
/// Receiver side of the session event channel.
pub type SessionEventReceiver = mpsc::Receiver<SessionEvent>;

/// Create a new session event channel.
#[must_use]
pub fn event_channel() -> (SessionEventSender, SessionEventReceiver)
{
    mpsc::channel()
}
