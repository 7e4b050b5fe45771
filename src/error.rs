// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

type String = Arc<str>;

/// Errors in a provider declaration. These are fatal: the provider cannot be
/// built, or one of its defaults can never be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    #[error("{provider}: the name '{name}' is not a valid identifier")]
    InvalidName { provider: String, name: String },

    #[error("{provider}: parameter '{name}' is declared more than once")]
    DuplicateParam { provider: String, name: String },

    #[error("{provider}: {defaults} default values cannot be aligned with {params} parameters")]
    MisalignedDefaults {
        provider: String,
        params: usize,
        defaults: usize,
    },

    #[error("{provider}: no {consumer} argument provides a type for parameter '{param}'")]
    UnresolvedParamType {
        provider: String,
        consumer: &'static str,
        param: String,
    },

    #[error("{provider}: {consumer} takes {expected} arguments but {declared} parameters are declared")]
    ConsumerArity {
        provider: String,
        consumer: &'static str,
        expected: usize,
        declared: usize,
    },

    #[error("{provider}: no constructor declared")]
    MissingConstructor { provider: String },

    #[error("{provider}: invalid default `{literal}` for parameter '{param}': {message}")]
    MalformedDefault {
        provider: String,
        param: String,
        literal: String,
        message: String,
    },
}

/// Errors binding call arguments to a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("missing mandatory argument '{param}' in call to {provider}")]
    MissingArgument { provider: String, param: String },

    #[error("unexpected keyword argument '{name}' in call to {provider}")]
    UnexpectedArgument { provider: String, name: String },

    #[error("got multiple values for parameter '{param}' in call to {provider}")]
    DuplicateArgument { provider: String, param: String },

    #[error("{provider} accepts at most {max} positional arguments but {given} were given")]
    TooManyPositional {
        provider: String,
        max: usize,
        given: usize,
    },

    #[error("{provider} only accepts keyword arguments")]
    PositionalNotAllowed { provider: String },

    #[error("{provider} expects {expected} arguments but {given} were given")]
    ArityMismatch {
        provider: String,
        expected: usize,
        given: usize,
    },

    #[error("expected value of type '{expected}' for parameter '{param}' in call to {provider}, got value of type '{actual}'")]
    TypeMismatch {
        provider: String,
        param: String,
        expected: String,
        actual: String,
    },

    /// The value has the parameter's declared type but does not fit the
    /// Rust type the consumer takes (an `i32` given a large int).
    #[error("value {value} is out of range for parameter '{param}' in call to {provider}")]
    OutOfRange {
        provider: String,
        param: String,
        value: String,
    },

    #[error(transparent)]
    Default(#[from] DeclarationError),
}

/// The evaluator's error type. Factories report validation failures with it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EvalError {
    message: std::string::String,
}

impl EvalError {
    pub fn new(message: impl Into<std::string::String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors creating an info record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InfoError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Factory(#[from] EvalError),
}

impl From<DeclarationError> for InfoError {
    fn from(error: DeclarationError) -> Self {
        InfoError::Bind(BindError::Default(error))
    }
}

impl From<InfoError> for EvalError {
    fn from(error: InfoError) -> Self {
        match error {
            InfoError::Bind(e) => EvalError::new(e.to_string()),
            InfoError::Factory(e) => e,
        }
    }
}

/// Errors that can occur when registering providers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{registry} registration failed: a different provider is already registered as '{name}'.")]
    AlreadyExists { name: String, registry: String },

    #[error("{registry} registration failed: the name '{name}' is not a valid identifier.")]
    InvalidName { name: String, registry: String },
}
