//! # Module Builder
//!
//! Accumulates named symbol definitions and turns them, exactly once, into
//! an installed [`Module`].
//!
//! ```text
//!   new()          add_*()           build()
//! ───────► Fresh ─────────► Accumulating ─────────► Built
//!            │                                        ▲
//!            └────────────────────────────────────────┘
//!                          build()
//! ```
//!
//! `Built` is terminal: further `add_*` and `build` calls fail with
//! [`SymforgeError::AlreadyBuilt`] and change nothing. A failed build leaves
//! the builder where it was, with its definitions intact.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use symforge_utils::timer::CheckpointTimer;
use tracing::{debug, info, trace, warn};

use super::Module;
use crate::error::{Result, SymforgeError};
use crate::session::Session;
use crate::symtab::{CompunitBuilder, MinimalSymbolReader, SymbolDef};
use crate::typedesc::Type;
use crate::types::{Address, Language};

/// Lifecycle state of a [`ModuleBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuilderState
{
    /// Constructed, nothing added.
    Fresh,
    /// At least one add was attempted.
    Accumulating,
    /// The module was built and published.
    Built,
}

impl fmt::Display for BuilderState
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            BuilderState::Fresh => "fresh",
            BuilderState::Accumulating => "accumulating",
            BuilderState::Built => "built",
        };
        write!(f, "{label}")
    }
}

/// Builds one synthetic module.
///
/// ## Example
///
/// ```rust
/// use symforge_core::config::SessionConfig;
/// use symforge_core::module::ModuleBuilder;
/// use symforge_core::owner::HostObject;
/// use symforge_core::session::Session;
/// use symforge_core::symtab::Domain;
/// use symforge_core::typedesc::init_integer_type;
///
/// let session = Session::new(SessionConfig::default().with_default_architecture("aarch64")).unwrap();
/// let arch = HostObject::from(session.default_architecture().clone());
/// let u32_type = init_integer_type(&arch, 32, true, "u32").unwrap();
///
/// let mut builder = ModuleBuilder::new("scratch");
/// builder.add_type_symbol("word_t", &u32_type, Some("c")).unwrap();
/// builder.add_static_symbol("counter", 0x4000u64, None).unwrap();
/// let module = builder.build(&session).unwrap();
///
/// assert_eq!(module.lookup_type("word_t"), Some(u32_type));
/// assert!(module.lookup_symbol("counter", Domain::Var).is_some());
/// ```
#[derive(Debug)]
pub struct ModuleBuilder
{
    name: String,
    state: BuilderState,
    /// Pending definitions, in name order.
    symbols: BTreeMap<String, SymbolDef>,
}

impl ModuleBuilder
{
    pub fn new(name: impl Into<String>) -> Self
    {
        Self {
            name: name.into(),
            state: BuilderState::Fresh,
            symbols: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn state(&self) -> BuilderState
    {
        self.state
    }

    /// Whether [`build`](Self::build) has succeeded.
    pub fn is_installed(&self) -> bool
    {
        self.state == BuilderState::Built
    }

    /// Number of pending definitions.
    pub fn len(&self) -> usize
    {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.symbols.is_empty()
    }

    /// The pending definition called `name`.
    pub fn definition(&self, name: &str) -> Option<&SymbolDef>
    {
        self.symbols.get(name)
    }

    /// Store `def` under `name`.
    ///
    /// Returns `Ok(false)` without replacing anything if `name` is already
    /// defined.
    ///
    /// ## Errors
    ///
    /// [`SymforgeError::AlreadyBuilt`] once the module was built.
    pub fn add_symbol_def(&mut self, name: impl Into<String>, def: SymbolDef) -> Result<bool>
    {
        self.ensure_open()?;
        self.state = BuilderState::Accumulating;

        let name = name.into();
        if self.symbols.contains_key(&name) {
            warn!(module = %self.name, symbol = %name, "symbol already defined, ignoring");
            return Ok(false);
        }
        trace!(module = %self.name, symbol = %name, language = %def.language(), "adding symbol");
        self.symbols.insert(name, def);
        Ok(true)
    }

    /// Define `name` as a typedef of `ty`.
    ///
    /// ## Errors
    ///
    /// [`SymforgeError::InvalidLanguage`] for an unknown language name, in
    /// which case nothing is stored.
    pub fn add_type_symbol(&mut self, name: impl Into<String>, ty: &Type, language: Option<&str>) -> Result<bool>
    {
        let language = Language::parse(language)?;
        self.add_symbol_def(
            name,
            SymbolDef::Typedef {
                ty: ty.clone(),
                language,
            },
        )
    }

    /// Define `name` as a code label at `address`.
    pub fn add_label_symbol(&mut self, name: impl Into<String>, address: impl Into<Address>, language: Option<&str>)
    -> Result<bool>
    {
        let language = Language::parse(language)?;
        self.add_symbol_def(
            name,
            SymbolDef::Label {
                address: address.into(),
                language,
            },
        )
    }

    /// Define `name` as static data at `address`.
    pub fn add_static_symbol(&mut self, name: impl Into<String>, address: impl Into<Address>, language: Option<&str>)
    -> Result<bool>
    {
        let language = Language::parse(language)?;
        self.add_symbol_def(
            name,
            SymbolDef::Static {
                address: address.into(),
                language,
            },
        )
    }

    /// Materialize the module and publish it to `session`.
    ///
    /// The module takes the architecture of the selected execution context,
    /// or the session's default architecture when none is selected.
    ///
    /// ## Errors
    ///
    /// - [`SymforgeError::AlreadyBuilt`] on a second call
    /// - [`SymforgeError::ResourceExhausted`] if the module's arena cannot
    ///   hold the symbol names
    ///
    /// On error nothing is published and the builder keeps its definitions.
    pub fn build(&mut self, session: &Session) -> Result<Rc<Module>>
    {
        self.ensure_open()?;
        let mut timer = CheckpointTimer::new();
        timer.begin(format!("build {}", self.name));

        timer.begin("sections");
        let architecture = session.current_architecture();
        let module = Module::new_synthetic(self.name.clone(), architecture, session.config().arena_limit);
        self.checkpoint(&mut timer)?;

        timer.begin("minimal symbols");
        let mut reader = MinimalSymbolReader::new();
        for (name, def) in &self.symbols {
            def.register_minimal(name, &mut reader);
        }
        module.install_minimal_symbols(reader.install())?;
        self.checkpoint(&mut timer)?;

        timer.begin("full symbols");
        let mut compunit = CompunitBuilder::new(self.name.clone(), "", Language::C);
        for (name, def) in &self.symbols {
            def.register_full(name, &module, &mut compunit)?;
        }
        module.install_compunits(vec![compunit.end_compunit_symtab()])?;
        self.checkpoint(&mut timer)?;

        timer.begin("publish");
        session.publish(Rc::clone(&module));
        self.checkpoint(&mut timer)?;
        self.checkpoint(&mut timer)?;

        self.state = BuilderState::Built;
        self.symbols.clear();
        info!(
            module = %self.name,
            architecture = module.arch().name(),
            minimal_symbols = module.minimal_symbol_count(),
            full_symbols = module.full_symbol_count(),
            "built synthetic module"
        );
        trace!(module = %self.name, "build timing:\n{}", timer.report());
        Ok(module)
    }

    fn ensure_open(&self) -> Result<()>
    {
        if self.is_installed() {
            debug!(module = %self.name, "builder already built");
            return Err(SymforgeError::AlreadyBuilt(self.name.clone()));
        }
        Ok(())
    }

    fn checkpoint(&self, timer: &mut CheckpointTimer) -> Result<()>
    {
        timer
            .end()
            .map(drop)
            .map_err(|err| SymforgeError::Internal(format!("timing build of {}: {err}", self.name)))
    }
}
