// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::provider::{Provider, ProviderKey};
use crate::value::Value;

use core::any::Any;
use core::{cmp, fmt};
use std::sync::Arc;

/// An immutable record produced by a [`Provider`].
///
/// Implementors are plain Rust value types. Each implementation names the
/// single provider for its type; every instance, however it was built,
/// resolves to that provider.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct SomeInfo { str: String, my_info: i64 }
///
/// lazy_static! {
///     static ref SOME_INFO: Provider<SomeInfo> = Declaration::new(["str", "my_info"])
///         .defaults(["\"default value\"", "1"])
///         .constructor(|(str, my_info): (String, i64)| SomeInfo { str, my_info })
///         .build()
///         .expect("SomeInfo declaration");
/// }
///
/// impl Info for SomeInfo {
///     fn provider() -> &'static Provider<Self> { &SOME_INFO }
///     fn fields(&self) -> Vec<(&'static str, Value)> {
///         vec![("str", Value::from(self.str.as_str())), ("my_info", Value::from(self.my_info))]
///     }
/// }
/// ```
pub trait Info: fmt::Debug + Clone + PartialEq + Send + Sync + 'static {
    /// The provider shared by all instances of this type.
    fn provider() -> &'static Provider<Self>;

    /// Field names and values, in accessor order.
    ///
    /// These drive display, serialization and ordering, so they should cover
    /// every field `PartialEq` compares. Unequal records whose fields agree
    /// are ordered by their `Debug` output.
    fn fields(&self) -> Vec<(&'static str, Value)>;

    /// Recover the provider that produced this instance.
    fn get_provider(&self) -> &'static Provider<Self> {
        Self::provider()
    }
}

/// Object safe view of an [`Info`] used inside [`Value`].
pub trait DynInfo: fmt::Debug + Send + Sync {
    fn provider_key(&self) -> &ProviderKey;

    fn field_values(&self) -> Vec<(&'static str, Value)>;

    fn as_any(&self) -> &dyn Any;

    /// Structural equality against another record of any type.
    fn eq_dyn(&self, other: &dyn DynInfo) -> bool;
}

impl<T: Info> DynInfo for T {
    fn provider_key(&self) -> &ProviderKey {
        self.get_provider().key()
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        Info::fields(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_dyn(&self, other: &dyn DynInfo) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// A type-erased, shared info record.
#[derive(Clone)]
pub struct InfoValue {
    r: Arc<dyn DynInfo>,
}

impl InfoValue {
    pub fn new<T: Info>(info: T) -> Self {
        Self { r: Arc::new(info) }
    }

    pub fn provider_key(&self) -> &ProviderKey {
        self.r.provider_key()
    }

    pub fn provider_name(&self) -> &str {
        self.r.provider_key().name()
    }

    pub fn fields(&self) -> Vec<(&'static str, Value)> {
        self.r.field_values()
    }

    /// Look up a field by name.
    pub fn get_attr(&self, name: &str) -> Option<Value> {
        self.r
            .field_values()
            .into_iter()
            .find(|(field, _)| *field == name)
            .map(|(_, v)| v)
    }

    pub fn downcast_ref<T: Info>(&self) -> Option<&T> {
        self.r.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Info>(&self) -> bool {
        self.r.as_any().is::<T>()
    }
}

impl fmt::Debug for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.r, f)
    }
}

impl cmp::PartialEq for InfoValue {
    fn eq(&self, other: &Self) -> bool {
        self.provider_key() == other.provider_key() && self.r.eq_dyn(other.r.as_ref())
    }
}

impl cmp::Eq for InfoValue {}

impl cmp::Ord for InfoValue {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        match self.provider_key().cmp(other.provider_key()) {
            cmp::Ordering::Equal if self == other => cmp::Ordering::Equal,
            cmp::Ordering::Equal => {
                let (lhs, rhs) = (self.fields(), other.fields());
                let lhs = lhs.iter().map(|(_, v)| v);
                let rhs = rhs.iter().map(|(_, v)| v);
                lhs.cmp(rhs)
                    .then_with(|| format!("{:?}", self.r).cmp(&format!("{:?}", other.r)))
                    .then_with(|| {
                        let (lhs, rhs) = (Arc::as_ptr(&self.r), Arc::as_ptr(&other.r));
                        lhs.cast::<()>().cmp(&rhs.cast::<()>())
                    })
            }
            ordering => ordering,
        }
    }
}

impl cmp::PartialOrd for InfoValue {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}
