// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod ast;
mod binder;
mod callable;
mod config;
mod convert;
mod defaults;
mod error;
mod globals;
mod info;
mod interpreter;
mod lexer;
mod parser;
mod provider;
pub mod registry;
mod schema;
mod types;
mod value;

pub use binder::{Binder, CallArgs};
pub use callable::Callable;
pub use config::BindConfig;
pub use convert::{InfoParam, Signature};
pub use defaults::DefaultCache;
pub use error::{BindError, DeclarationError, EvalError, InfoError, RegistryError};
pub use globals::{Globals, GlobalsBuilder};
pub use info::{DynInfo, Info, InfoValue};
pub use interpreter::{Interpreter, LiteralEvaluator};
pub use provider::{Declaration, InstantiationKind, Provider, ProviderKey};
pub use schema::{ConsumerKind, ParamSpec, Schema};
pub use types::TypeTag;
pub use value::Value;

/// Items in `unstable` are likely to change.
pub mod unstable {
    pub use crate::ast::*;
    pub use crate::lexer::*;
    pub use crate::parser::*;
}
