// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::callable::Callable;
use crate::schema::is_identifier;

pub use crate::error::RegistryError;

use dashmap::DashMap;
use std::sync::Arc;

type String = Arc<str>;

/// Validates that a name can be bound in a build file.
pub fn validate_name(name: &str, registry_name: &str) -> Result<(), RegistryError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(RegistryError::InvalidName {
            name: String::from(name),
            registry: String::from(registry_name),
        })
    }
}

/// Thread-safe name -> provider map.
///
/// Registration is idempotent per provider identity: registering the same
/// provider twice under its name succeeds, while a different provider under
/// a taken name is rejected.
pub struct ProviderRegistry {
    inner: DashMap<String, Arc<dyn Callable>>,
    name: String,
}

impl ProviderRegistry {
    /// Create a new, empty registry with a given name.
    pub fn new(registry_name: impl Into<String>) -> Self {
        Self {
            inner: DashMap::new(),
            name: registry_name.into(),
        }
    }

    /// Get the name of this registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a provider under its own name.
    pub fn register(&self, item: Arc<dyn Callable>) -> Result<(), RegistryError> {
        let name = String::from(item.name());
        if let Err(e) = validate_name(&name, &self.name) {
            tracing::warn!(registry = %self.name, "{e}");
            return Err(e);
        }

        use dashmap::mapref::entry::Entry;
        match self.inner.entry(name) {
            Entry::Occupied(e) if e.get().key() == item.key() => Ok(()),
            Entry::Occupied(e) => {
                let err = RegistryError::AlreadyExists {
                    name: e.key().clone(),
                    registry: self.name.clone(),
                };
                tracing::warn!(registry = %self.name, "{err}");
                Err(err)
            }
            Entry::Vacant(e) => {
                tracing::debug!(registry = %self.name, provider = %e.key(), "registered provider");
                e.insert(item);
                Ok(())
            }
        }
    }

    /// Retrieve a provider by name, if it exists.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Callable>> {
        self.inner.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove a provider by name. Returns the removed provider if it existed.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn Callable>> {
        self.inner.remove(name).map(|(_, v)| v)
    }

    /// List all registered provider names, sorted.
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.inner.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get all registered providers as a vector.
    pub fn list_items(&self) -> Vec<Arc<dyn Callable>> {
        self.inner
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}

/// Global registry instances
pub mod instances {
    use super::*;

    lazy_static::lazy_static! {
        /// Process-wide providers, visible to every interpreter whose globals
        /// were built with `GlobalsBuilder::add_registered`.
        pub static ref PROVIDER_REGISTRY: ProviderRegistry = ProviderRegistry::new("PROVIDER_REGISTRY");
    }
}

/// Helper functions for the global provider registry.
pub mod providers {
    use super::instances::PROVIDER_REGISTRY;
    use super::*;

    /// Register a provider with the global registry.
    pub fn register(item: Arc<dyn Callable>) -> Result<(), RegistryError> {
        PROVIDER_REGISTRY.register(item)
    }

    /// Register a provider that lives in a static.
    pub fn register_static<C: Callable + 'static>(item: &'static C) -> Result<(), RegistryError> {
        PROVIDER_REGISTRY.register(Arc::new(item))
    }

    /// Retrieve a provider by name.
    pub fn get(name: &str) -> Option<Arc<dyn Callable>> {
        PROVIDER_REGISTRY.get(name)
    }

    /// Remove a provider by name.
    pub fn remove(name: &str) -> Option<Arc<dyn Callable>> {
        PROVIDER_REGISTRY.remove(name)
    }

    /// List all registered provider names.
    pub fn list_names() -> Vec<String> {
        PROVIDER_REGISTRY.list_names()
    }

    /// Check if a provider with the given name exists.
    pub fn contains(name: &str) -> bool {
        PROVIDER_REGISTRY.contains(name)
    }

    /// Get the number of registered providers.
    pub fn len() -> usize {
        PROVIDER_REGISTRY.len()
    }

    /// Check if the provider registry is empty.
    pub fn is_empty() -> bool {
        PROVIDER_REGISTRY.is_empty()
    }
}
