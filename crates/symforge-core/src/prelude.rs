//! Common imports for working with synthetic debug information

pub use crate::arch::{Architecture, ByteOrder};
pub use crate::config::SessionConfig;
pub use crate::error::{Result, SymforgeError};
pub use crate::module::{BuilderState, HostedModuleBuilder, Module, ModuleBuilder};
pub use crate::owner::{HostObject, TypeOwner};
pub use crate::session::{ExecutionContext, Session};
pub use crate::symtab::{AddressClass, Domain, MinimalSymbolKind, SymbolDef};
pub use crate::typedesc::{
    can_create_complex_type, init_boolean_type, init_character_type, init_complex_type, init_decfloat_type,
    init_fixed_point_type, init_float_type, init_integer_type, init_pointer_type, init_type, FloatField, FloatFormat,
    IntBit, Type, TypeCode,
};
pub use crate::types::{Address, Language};
