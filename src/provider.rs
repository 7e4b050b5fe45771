// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::binder::{Binder, CallArgs};
use crate::callable::Callable;
use crate::config::BindConfig;
use crate::convert::Signature;
use crate::defaults::DefaultCache;
use crate::error::{BindError, DeclarationError, EvalError, InfoError};
use crate::info::Info;
use crate::interpreter::{Interpreter, LiteralEvaluator};
use crate::schema::{is_identifier, ConsumerKind, Schema};
use crate::types::TypeTag;
use crate::value::Value;

use core::any::{Any, TypeId};
use core::{cmp, fmt, hash};
use std::sync::Arc;

/// Identity of a provider: the record type it produces.
///
/// The name is carried for display only. Two keys are equal exactly when
/// they were made for the same record type.
#[derive(Clone)]
pub struct ProviderKey {
    type_id: TypeId,
    name: Arc<str>,
}

impl ProviderKey {
    pub fn of<T: 'static>(name: impl Into<Arc<str>>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl cmp::PartialEq for ProviderKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl cmp::Eq for ProviderKey {}

impl cmp::Ord for ProviderKey {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.type_id.cmp(&other.type_id)
    }
}

impl cmp::PartialOrd for ProviderKey {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl hash::Hash for ProviderKey {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state)
    }
}

impl fmt::Debug for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProviderKey({})", self.name)
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// How a dynamic call turns bound arguments into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstantiationKind {
    /// Pass the bound arguments to the constructor.
    Construct,
    /// Pass them to the factory, which validates and derives the fields.
    Factory,
}

// A consumer closure with its argument types. `Err(idx)` reports an
// argument that could not be converted to the closure's Rust type.
struct Consumer<R> {
    types: Vec<TypeTag>,
    f: Box<dyn Fn(&[Value]) -> Result<R, usize> + Send + Sync>,
}

impl<R> Consumer<R> {
    fn new<A, F>(f: F) -> Self
    where
        A: Signature,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self {
            types: A::type_tags(),
            f: Box::new(move |args| A::from_args(args).map(&f)),
        }
    }
}

/// Builder for a [`Provider`].
///
/// Parameter names are given in call order; defaults align with the
/// trailing parameters. A constructor is required. A factory is optional and,
/// when present, receives dynamic calls in place of the constructor.
pub struct Declaration<T> {
    name: Option<Arc<str>>,
    params: Vec<Arc<str>>,
    defaults: Vec<Arc<str>>,
    constructor: Option<Consumer<T>>,
    factory: Option<Consumer<Result<T, EvalError>>>,
    evaluator: Option<Arc<dyn LiteralEvaluator>>,
    config: BindConfig,
}

fn default_name<T>() -> &'static str {
    let full = core::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

impl<T: 'static> Declaration<T> {
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            name: None,
            params: params.into_iter().map(Into::into).collect(),
            defaults: vec![],
            constructor: None,
            factory: None,
            evaluator: None,
            config: BindConfig::default(),
        }
    }

    /// Name used in build files. Defaults to the record's type name.
    pub fn name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn defaults<I, S>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        self.defaults = defaults.into_iter().map(Into::into).collect();
        self
    }

    pub fn constructor<A, F>(mut self, f: F) -> Self
    where
        A: Signature,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        self.constructor = Some(Consumer::new(f));
        self
    }

    pub fn factory<A, F>(mut self, f: F) -> Self
    where
        A: Signature,
        F: Fn(A) -> Result<T, EvalError> + Send + Sync + 'static,
    {
        self.factory = Some(Consumer::new(f));
        self
    }

    /// Evaluator for default sources. Defaults to an [`Interpreter`] with no
    /// globals.
    pub fn literal_evaluator(mut self, evaluator: Arc<dyn LiteralEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn config(mut self, config: BindConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Provider<T>, DeclarationError> {
        let name: Arc<str> = match self.name {
            Some(name) => name,
            None => default_name::<T>().into(),
        };
        if !is_identifier(&name) {
            return Err(DeclarationError::InvalidName {
                provider: name.clone(),
                name,
            });
        }

        let Some(constructor) = self.constructor else {
            return Err(DeclarationError::MissingConstructor { provider: name });
        };

        // The constructor must cover every parameter even when a factory
        // takes the dynamic calls; `create_info` always goes through it.
        let constructor_schema = Schema::derive(
            &name,
            &self.params,
            &self.defaults,
            ConsumerKind::Constructor,
            &constructor.types,
        )?;
        let schema = match &self.factory {
            Some(factory) => Schema::derive(
                &name,
                &self.params,
                &self.defaults,
                ConsumerKind::Factory,
                &factory.types,
            )?,
            None => constructor_schema,
        };

        let provider = Provider {
            key: ProviderKey::of::<T>(name),
            defaults: DefaultCache::new(&schema),
            schema,
            constructor,
            factory: self.factory,
            evaluator: self
                .evaluator
                .unwrap_or_else(|| Arc::new(Interpreter::default())),
            config: self.config,
        };

        tracing::debug!(
            provider = provider.name(),
            signature = %provider.signature(),
            instantiation = ?provider.instantiation(),
            "declared provider"
        );

        if provider.config.preload_defaults {
            provider.preload_defaults()?;
        }
        Ok(provider)
    }
}

/// The single factory and identity for records of type `T`.
pub struct Provider<T> {
    key: ProviderKey,
    schema: Schema,
    defaults: DefaultCache,
    constructor: Consumer<T>,
    factory: Option<Consumer<Result<T, EvalError>>>,
    evaluator: Arc<dyn LiteralEvaluator>,
    config: BindConfig,
}

impl<T> fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("key", &self.key)
            .field("schema", &self.schema)
            .field("defaults", &self.defaults)
            .field("instantiation", &self.instantiation())
            .field("config", &self.config)
            .finish()
    }
}

impl<T> Provider<T> {
    pub fn name(&self) -> &str {
        self.key.name()
    }

    pub fn key(&self) -> &ProviderKey {
        &self.key
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn defaults(&self) -> &DefaultCache {
        &self.defaults
    }

    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    pub fn instantiation(&self) -> InstantiationKind {
        match self.factory {
            Some(_) => InstantiationKind::Factory,
            None => InstantiationKind::Construct,
        }
    }

    pub fn signature(&self) -> String {
        self.schema.signature()
    }

    fn binder(&self) -> Binder<'_> {
        Binder::new(
            &self.schema,
            &self.defaults,
            self.evaluator.as_ref(),
            &self.config,
        )
    }

    /// Resolve every default now.
    pub fn preload_defaults(&self) -> Result<(), DeclarationError> {
        self.defaults.resolve_all(self.evaluator.as_ref())
    }

    /// Build a record from typed values in schema order. Always uses the
    /// constructor.
    pub fn create_info<A: Signature>(&self, args: A) -> Result<T, InfoError> {
        self.create_info_from_values(args.into_args())
    }

    pub fn create_info_from_values(&self, values: Vec<Value>) -> Result<T, InfoError> {
        let binder = self.binder();
        let bound = binder.bind_positional(values, &self.constructor.types)?;
        tracing::trace!(provider = self.name(), "create_info");
        Ok(self.invoke(&binder, &self.constructor, &bound)?)
    }

    /// Bind a dynamic call and instantiate the record.
    pub fn call(&self, args: CallArgs) -> Result<T, InfoError> {
        let binder = self.binder();
        let bound = binder.bind(args)?;
        tracing::trace!(
            provider = self.name(),
            instantiation = ?self.instantiation(),
            "call"
        );
        match &self.factory {
            Some(factory) => Ok(self.invoke(&binder, factory, &bound)??),
            None => Ok(self.invoke(&binder, &self.constructor, &bound)?),
        }
    }

    fn invoke<R>(
        &self,
        binder: &Binder<'_>,
        consumer: &Consumer<R>,
        bound: &[Value],
    ) -> Result<R, BindError> {
        (consumer.f)(bound).map_err(|idx| {
            let expected = consumer.types.get(idx).cloned().unwrap_or(TypeTag::Any);
            match bound.get(idx) {
                // Passed coercion, so only the Rust parameter type rejected it.
                Some(value) if expected.coerce(value.clone()).is_some() => {
                    binder.out_of_range(idx, value)
                }
                value => {
                    let actual = value.map_or("NoneType", |v| v.type_name());
                    binder.type_mismatch(idx, &expected, actual.into())
                }
            }
        })
    }
}

impl<T: Info> Callable for Provider<T> {
    fn name(&self) -> &str {
        self.key.name()
    }

    fn key(&self) -> ProviderKey {
        self.key.clone()
    }

    fn signature(&self) -> String {
        self.schema.signature()
    }

    fn call(&self, args: CallArgs) -> Result<Value, EvalError> {
        let info = Provider::<T>::call(self, args)?;
        Ok(Value::from_info(info))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
