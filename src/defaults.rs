// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::DeclarationError;
use crate::interpreter::LiteralEvaluator;
use crate::schema::Schema;
use crate::types::TypeTag;
use crate::value::Value;

use core::fmt;
use std::sync::Arc;

use spin::Once;

struct DefaultSlot {
    param: Arc<str>,
    source: Arc<str>,
    expected: TypeTag,
    resolved: Once<Result<Value, DeclarationError>>,
}

/// Lazily resolved default values of a schema.
///
/// Each default is evaluated at most once. `spin::Once` moves a slot from
/// incomplete to running to complete with atomic transitions; callers that
/// arrive while another caller is resolving the slot wait for its result.
/// Failures are stored like successes and returned to every later caller.
pub struct DefaultCache {
    provider: Arc<str>,
    slots: Vec<Option<DefaultSlot>>,
}

impl fmt::Debug for DefaultCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for slot in self.slots.iter().flatten() {
            list.entry(&(slot.param.as_ref(), slot.source.as_ref(), slot.resolved.get()));
        }
        list.finish()
    }
}

impl DefaultCache {
    pub fn new(schema: &Schema) -> Self {
        let slots = schema
            .params()
            .iter()
            .map(|p| {
                p.default.as_ref().map(|source| DefaultSlot {
                    param: p.name.clone(),
                    source: source.clone(),
                    expected: p.expected.clone(),
                    resolved: Once::new(),
                })
            })
            .collect();
        Self {
            provider: schema.provider().into(),
            slots,
        }
    }

    pub fn has_default(&self, idx: usize) -> bool {
        matches!(self.slots.get(idx), Some(Some(_)))
    }

    pub fn is_resolved(&self, idx: usize) -> bool {
        match self.slots.get(idx) {
            Some(Some(slot)) => slot.resolved.is_completed(),
            _ => false,
        }
    }

    /// Resolve the default of parameter `idx`, if it has one.
    pub fn resolve(
        &self,
        idx: usize,
        evaluator: &dyn LiteralEvaluator,
    ) -> Option<Result<Value, DeclarationError>> {
        let slot = self.slots.get(idx)?.as_ref()?;
        Some(
            slot.resolved
                .call_once(|| self.compute(slot, evaluator))
                .clone(),
        )
    }

    /// Resolve every default, returning the first failure.
    pub fn resolve_all(&self, evaluator: &dyn LiteralEvaluator) -> Result<(), DeclarationError> {
        for idx in 0..self.slots.len() {
            if let Some(Err(e)) = self.resolve(idx, evaluator) {
                return Err(e);
            }
        }
        Ok(())
    }

    fn compute(
        &self,
        slot: &DefaultSlot,
        evaluator: &dyn LiteralEvaluator,
    ) -> Result<Value, DeclarationError> {
        let malformed = |message: String| DeclarationError::MalformedDefault {
            provider: self.provider.clone(),
            param: slot.param.clone(),
            literal: slot.source.clone(),
            message: message.into(),
        };

        let result = match evaluator.eval_literal(&slot.source) {
            Ok(value) => {
                let actual = value.type_name().to_string();
                slot.expected.coerce(value).ok_or_else(|| {
                    malformed(format!(
                        "expected value of type '{}', got value of type '{actual}'",
                        slot.expected
                    ))
                })
            }
            Err(e) => Err(malformed(e.to_string())),
        };

        match &result {
            Ok(value) => tracing::debug!(
                provider = %self.provider,
                param = %slot.param,
                %value,
                "resolved default value"
            ),
            Err(e) => tracing::error!(provider = %self.provider, param = %slot.param, "{e}"),
        }
        result
    }
}
