// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::binder::CallArgs;
use crate::error::EvalError;
use crate::provider::ProviderKey;
use crate::value::Value;

use core::any::Any;
use core::fmt::Debug;

/// A provider as seen by the evaluator.
///
/// The evaluator knows nothing about record types; it hands over evaluated
/// call arguments and receives a value or an [`EvalError`].
pub trait Callable: Debug + Send + Sync {
    /// Name the provider is bound to in build files.
    fn name(&self) -> &str;

    /// Identity used for registration and lookup.
    fn key(&self) -> ProviderKey;

    /// Human-readable call signature.
    fn signature(&self) -> String;

    fn call(&self, args: CallArgs) -> Result<Value, EvalError>;

    fn as_any(&self) -> &dyn Any;
}

impl<C: Callable + ?Sized> Callable for &'static C {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn key(&self) -> ProviderKey {
        (**self).key()
    }

    fn signature(&self) -> String {
        (**self).signature()
    }

    fn call(&self, args: CallArgs) -> Result<Value, EvalError> {
        (**self).call(args)
    }

    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }
}
