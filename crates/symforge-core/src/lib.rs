//! # symforge-core
//!
//! Synthetic debug information for a host debugger.
//!
//! A debugger usually learns about types and symbols by reading them out of
//! a binary. This crate lets the host invent them at runtime instead, for
//! JIT-compiled code, memory regions without a backing file or values a
//! script computes, and install the result so that ordinary symbol lookup
//! finds it:
//!
//! - [`typedesc`]: type descriptors (integers, floats with an explicit bit
//!   layout, pointers, fixed-point, complex) allocated in an owner's arena
//! - [`owner`]: whether a type lives as long as an architecture or only as
//!   long as one module
//! - [`symtab`]: typedef, label and static symbol definitions and the two
//!   tables they land in
//! - [`module`]: the one-shot builder that turns definitions into an
//!   installed module, and its host-allocated variant
//! - [`session`]: the module registry, architectures and selected context
//!
//! ## Example
//!
//! ```rust
//! use symforge_core::prelude::*;
//!
//! let session = Session::new(SessionConfig::default().with_default_architecture("x86_64")).unwrap();
//! let arch = HostObject::from(session.default_architecture().clone());
//! let byte = init_integer_type(&arch, 8, true, "byte").unwrap();
//! let byte_ptr = init_pointer_type(&arch, &HostObject::from(byte.clone()), 64, "byte *").unwrap();
//! assert_eq!(byte_ptr.target(), Some(&byte));
//!
//! let mut builder = ModuleBuilder::new("jit");
//! builder.add_label_symbol("trampoline", 0x1000u64, Some("c")).unwrap();
//! builder.build(&session).unwrap();
//! assert!(session.lookup_minimal_symbol("trampoline").is_some());
//! ```
//!
//! ## Unsafe code
//!
//! Only [`module::hosted`] uses `unsafe`: it constructs and destroys a
//! builder in place inside memory handed over by the host allocator.

pub mod arch;
pub mod arena;
pub mod config;
pub mod error;
pub mod events;
pub mod module;
pub mod owner;
pub mod prelude;
pub mod session;
pub mod symtab;
pub mod typedesc;
pub mod types;

pub use arch::Architecture;
pub use error::{Result, SymforgeError};
pub use module::{Module, ModuleBuilder};
pub use session::Session;
pub use typedesc::Type;
