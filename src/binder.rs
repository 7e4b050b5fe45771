// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::config::BindConfig;
use crate::defaults::DefaultCache;
use crate::error::BindError;
use crate::interpreter::LiteralEvaluator;
use crate::schema::Schema;
use crate::types::TypeTag;
use crate::value::Value;

use std::sync::Arc;

/// Arguments supplied at a call site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    /// Keyword arguments in call-site order.
    pub named: Vec<(Arc<str>, Value)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kwargs<K, V>(named: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Arc<str>>,
        V: Into<Value>,
    {
        Self {
            positional: vec![],
            named: named
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// Maps call arguments and schema defaults to a positioned, coerced
/// argument vector.
pub struct Binder<'a> {
    schema: &'a Schema,
    defaults: &'a DefaultCache,
    evaluator: &'a dyn LiteralEvaluator,
    config: &'a BindConfig,
}

impl<'a> Binder<'a> {
    pub fn new(
        schema: &'a Schema,
        defaults: &'a DefaultCache,
        evaluator: &'a dyn LiteralEvaluator,
        config: &'a BindConfig,
    ) -> Self {
        Self {
            schema,
            defaults,
            evaluator,
            config,
        }
    }

    fn provider(&self) -> Arc<str> {
        self.schema.provider().into()
    }

    pub fn bind(&self, args: CallArgs) -> Result<Vec<Value>, BindError> {
        let n = self.schema.len();
        let mut slots: Vec<Option<Value>> = vec![None; n];

        if !args.positional.is_empty() && !self.config.allow_positional {
            return Err(BindError::PositionalNotAllowed {
                provider: self.provider(),
            });
        }
        if args.positional.len() > n {
            return Err(BindError::TooManyPositional {
                provider: self.provider(),
                max: n,
                given: args.positional.len(),
            });
        }
        for (slot, value) in slots.iter_mut().zip(args.positional) {
            *slot = Some(value);
        }

        // Reject every unknown or repeated name before any default is
        // resolved.
        for (name, value) in args.named {
            let Some(idx) = self.schema.index_of(&name) else {
                return Err(BindError::UnexpectedArgument {
                    provider: self.provider(),
                    name,
                });
            };
            if slots[idx].is_some() {
                return Err(BindError::DuplicateArgument {
                    provider: self.provider(),
                    param: name,
                });
            }
            slots[idx] = Some(value);
        }

        let mut bound = Vec::with_capacity(n);
        for (idx, (slot, param)) in slots.into_iter().zip(self.schema.params()).enumerate() {
            let value = match slot {
                Some(v) => v,
                None => match self.defaults.resolve(idx, self.evaluator) {
                    Some(default) => {
                        tracing::trace!(provider = self.schema.provider(), param = %param.name, "using default");
                        default?
                    }
                    None => {
                        return Err(BindError::MissingArgument {
                            provider: self.provider(),
                            param: param.name.clone(),
                        })
                    }
                },
            };
            bound.push(self.coerce(idx, &param.expected, value)?);
        }
        Ok(bound)
    }

    /// Bind already positioned values against `types`, which may differ from
    /// the schema's own types (the constructor's types for a record built by
    /// a factory).
    pub fn bind_positional(
        &self,
        values: Vec<Value>,
        types: &[TypeTag],
    ) -> Result<Vec<Value>, BindError> {
        if values.len() != types.len() {
            return Err(BindError::ArityMismatch {
                provider: self.provider(),
                expected: types.len(),
                given: values.len(),
            });
        }
        values
            .into_iter()
            .zip(types)
            .enumerate()
            .map(|(idx, (value, expected))| self.coerce(idx, expected, value))
            .collect()
    }

    fn coerce(&self, idx: usize, expected: &TypeTag, value: Value) -> Result<Value, BindError> {
        let actual: Arc<str> = value.type_name().into();
        expected
            .coerce(value)
            .ok_or_else(|| self.type_mismatch(idx, expected, actual))
    }

    fn param_name(&self, idx: usize) -> Arc<str> {
        match self.schema.get(idx) {
            Some(p) => p.name.clone(),
            None => format!("#{idx}").into(),
        }
    }

    pub(crate) fn type_mismatch(&self, idx: usize, expected: &TypeTag, actual: Arc<str>) -> BindError {
        BindError::TypeMismatch {
            provider: self.provider(),
            param: self.param_name(idx),
            expected: expected.to_string().into(),
            actual,
        }
    }

    pub(crate) fn out_of_range(&self, idx: usize, value: &Value) -> BindError {
        BindError::OutOfRange {
            provider: self.provider(),
            param: self.param_name(idx),
            value: value.to_string().into(),
        }
    }
}
