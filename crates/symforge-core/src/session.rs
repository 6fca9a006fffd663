//! # Session
//!
//! The host side of synthetic debug information: the architectures in use,
//! the currently selected execution context, and the registry of installed
//! modules that symbol lookups walk.
//!
//! ## Thread Safety
//!
//! A session is used from the host's command thread only. It is not `Sync`
//! and nothing in it is locked.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::arch::Architecture;
use crate::config::SessionConfig;
use crate::error::{Result, SymforgeError};
use crate::events::{event_channel, SessionEvent, SessionEventReceiver, SessionEventSender};
use crate::module::Module;
use crate::symtab::{Domain, MinimalSymbol, Symbol};
use crate::typedesc::Type;
use crate::types::Address;

/// The frame the user is looking at.
#[derive(Debug, Clone)]
pub struct ExecutionContext
{
    pub architecture: Rc<Architecture>,
    pub pc: Address,
}

/// A debugging session.
///
/// ## Example
///
/// ```rust
/// use symforge_core::config::SessionConfig;
/// use symforge_core::module::ModuleBuilder;
/// use symforge_core::session::Session;
///
/// let session = Session::new(SessionConfig::default().with_default_architecture("x86_64")).unwrap();
/// let mut builder = ModuleBuilder::new("jit-code");
/// builder.add_label_symbol("jit_entry", 0x7000_0000u64, None).unwrap();
/// let module = builder.build(&session).unwrap();
///
/// assert_eq!(session.modules().len(), 1);
/// assert!(session.lookup_minimal_symbol("jit_entry").is_some());
/// assert_eq!(module.arch().name(), "x86_64");
/// ```
#[derive(Debug)]
pub struct Session
{
    config: SessionConfig,
    architectures: RefCell<HashMap<String, Rc<Architecture>>>,
    default_architecture: Rc<Architecture>,
    selected: RefCell<Option<ExecutionContext>>,
    modules: RefCell<Vec<Rc<Module>>>,
    subscribers: RefCell<Vec<SessionEventSender>>,
}

impl Session
{
    /// Start a session.
    ///
    /// ## Errors
    ///
    /// Returns [`SymforgeError::InvalidArgument`] if the configured default
    /// architecture is not a known architecture.
    pub fn new(config: SessionConfig) -> Result<Self>
    {
        let default_architecture = Architecture::by_name(&config.default_architecture, config.arena_limit).ok_or_else(|| {
            SymforgeError::InvalidArgument(format!("unknown architecture {}", config.default_architecture))
        })?;
        let mut architectures = HashMap::new();
        architectures.insert(default_architecture.name().to_string(), Rc::clone(&default_architecture));
        debug!(architecture = default_architecture.name(), "session started");

        Ok(Self {
            config,
            architectures: RefCell::new(architectures),
            default_architecture,
            selected: RefCell::new(None),
            modules: RefCell::new(Vec::new()),
            subscribers: RefCell::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &SessionConfig
    {
        &self.config
    }

    /// The architecture named `name`, shared by every caller of the session.
    ///
    /// Each architecture is instantiated once, so all architecture-owned
    /// types of the same architecture share one arena.
    pub fn architecture(&self, name: &str) -> Result<Rc<Architecture>>
    {
        let probe = Architecture::by_name(name, self.config.arena_limit)
            .ok_or_else(|| SymforgeError::InvalidArgument(format!("unknown architecture {name}")))?;
        let mut architectures = self.architectures.borrow_mut();
        let shared = architectures.entry(probe.name().to_string()).or_insert(probe);
        Ok(Rc::clone(shared))
    }

    pub fn default_architecture(&self) -> &Rc<Architecture>
    {
        &self.default_architecture
    }

    /// Select (or clear, with `None`) the current execution context.
    pub fn select_context(&self, context: Option<ExecutionContext>)
    {
        let event = SessionEvent::ContextSelected {
            architecture: context.as_ref().map(|ctx| ctx.architecture.name().to_string()),
            pc: context.as_ref().map(|ctx| ctx.pc),
        };
        *self.selected.borrow_mut() = context;
        self.notify(&event);
    }

    pub fn selected_context(&self) -> Option<ExecutionContext>
    {
        self.selected.borrow().clone()
    }

    /// Architecture of the selected context, else the default target.
    pub fn current_architecture(&self) -> Rc<Architecture>
    {
        self.selected
            .borrow()
            .as_ref()
            .map_or_else(|| Rc::clone(&self.default_architecture), |ctx| Rc::clone(&ctx.architecture))
    }

    /// Receive an event for every module installed from now on.
    pub fn subscribe(&self) -> SessionEventReceiver
    {
        let (sender, receiver) = event_channel();
        self.subscribers.borrow_mut().push(sender);
        receiver
    }

    /// Add a module to the registry and tell the subscribers.
    pub(crate) fn publish(&self, module: Rc<Module>)
    {
        let event = SessionEvent::NewModule {
            name: module.name().to_string(),
            minimal_symbols: module.minimal_symbol_count(),
            full_symbols: module.full_symbol_count(),
        };
        debug!(module = module.name(), registered = self.modules.borrow().len() + 1, "publishing module");
        self.modules.borrow_mut().push(module);
        self.notify(&event);
    }

    fn notify(&self, event: &SessionEvent)
    {
        // drop subscribers whose receiver is gone
        self.subscribers
            .borrow_mut()
            .retain(|sender| sender.send(event.clone()).is_ok());
    }

    /// Installed modules, in installation order.
    pub fn modules(&self) -> Vec<Rc<Module>>
    {
        self.modules.borrow().clone()
    }

    /// The most recently installed module called `name`.
    pub fn module(&self, name: &str) -> Option<Rc<Module>>
    {
        self.modules.borrow().iter().rev().find(|module| module.name() == name).cloned()
    }

    pub fn lookup_minimal_symbol(&self, name: &str) -> Option<(Rc<Module>, MinimalSymbol)>
    {
        self.find_in_modules(|module| module.lookup_minimal_symbol(name).cloned())
    }

    pub fn minimal_symbol_at(&self, address: Address) -> Option<(Rc<Module>, MinimalSymbol)>
    {
        self.find_in_modules(|module| module.minimal_symbol_at(address).cloned())
    }

    pub fn lookup_symbol(&self, name: &str, domain: Domain) -> Option<(Rc<Module>, Symbol)>
    {
        self.find_in_modules(|module| module.lookup_symbol(name, domain).cloned())
    }

    pub fn lookup_type(&self, name: &str) -> Option<Type>
    {
        self.modules.borrow().iter().find_map(|module| module.lookup_type(name))
    }

    fn find_in_modules<T>(&self, f: impl Fn(&Module) -> Option<T>) -> Option<(Rc<Module>, T)>
    {
        self.modules
            .borrow()
            .iter()
            .find_map(|module| f(module).map(|found| (Rc::clone(module), found)))
    }
}
