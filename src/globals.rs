// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::callable::Callable;
use crate::error::RegistryError;
use crate::registry::{instances::PROVIDER_REGISTRY, validate_name};

use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

const GLOBALS: &str = "Globals";

/// The names an [`Interpreter`](crate::Interpreter) can call.
///
/// Globals are immutable once built and cheap to clone.
#[derive(Clone, Default)]
pub struct Globals {
    members: Arc<BTreeMap<Arc<str>, Arc<dyn Callable>>>,
}

impl fmt::Debug for Globals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.members.keys()).finish()
    }
}

impl Globals {
    pub fn builder() -> GlobalsBuilder {
        GlobalsBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Callable>> {
        self.members.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.members.keys().map(|k| k.as_ref())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Default)]
pub struct GlobalsBuilder {
    members: BTreeMap<Arc<str>, Arc<dyn Callable>>,
}

impl GlobalsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `callable` under its own name. Adding the same provider again is
    /// a no-op.
    pub fn add(&mut self, callable: Arc<dyn Callable>) -> Result<(), RegistryError> {
        let name: Arc<str> = callable.name().into();
        validate_name(&name, GLOBALS)?;
        match self.members.get(&name) {
            Some(existing) if existing.key() == callable.key() => Ok(()),
            Some(_) => {
                let err = RegistryError::AlreadyExists {
                    name,
                    registry: GLOBALS.into(),
                };
                tracing::warn!("{err}");
                Err(err)
            }
            None => {
                self.members.insert(name, callable);
                Ok(())
            }
        }
    }

    pub fn add_static<C: Callable + 'static>(&mut self, callable: &'static C) -> Result<(), RegistryError> {
        self.add(Arc::new(callable))
    }

    /// Bind every provider of the process-wide registry.
    pub fn add_registered(&mut self) -> Result<(), RegistryError> {
        for callable in PROVIDER_REGISTRY.list_items() {
            self.add(callable)?;
        }
        Ok(())
    }

    pub fn build(self) -> Globals {
        Globals {
            members: Arc::new(self.members),
        }
    }
}
