// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A schema is the call signature of a provider: the ordered parameters a
//! call binds, the static type each bound value must have, and the default
//! source text for trailing parameters.
//!
//! Types are never discovered from the record itself. They come from the
//! *consumer* that receives the bound arguments:
//!
//!     Constructor  the closure that builds the record field by field.
//!     Factory      an optional closure that receives the arguments
//!                  instead and derives the field values itself.
//!
//! The two may disagree on a parameter's type. For example a record with a
//! `str_list: Vec<String>` field can be built by a factory taking a
//! `dict[string, string]` and keeping its keys. Whichever consumer is active
//! for a record decides, once, at declaration time.
//!
//! Defaults align with the *end* of the parameter list:
//!
//!     params   = ["srcs", "deps", "visibility"]
//!     defaults =         ["[]",  "[]"]
//!
//! makes `srcs` required. An empty default source also means required.

use crate::error::DeclarationError;
use crate::types::TypeTag;

use core::fmt;
use std::sync::Arc;

/// Which consumer a schema's types were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerKind {
    Constructor,
    Factory,
}

impl ConsumerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumerKind::Constructor => "constructor",
            ConsumerKind::Factory => "factory",
        }
    }
}

impl fmt::Display for ConsumerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: Arc<str>,
    pub expected: TypeTag,
    pub default: Option<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    provider: Arc<str>,
    params: Vec<ParamSpec>,
    consumer: ConsumerKind,
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

impl Schema {
    /// Derive a schema from a declaration and its active consumer's types.
    pub fn derive<N, D>(
        provider: &str,
        names: &[N],
        defaults: &[D],
        consumer: ConsumerKind,
        consumer_types: &[TypeTag],
    ) -> Result<Schema, DeclarationError>
    where
        N: AsRef<str>,
        D: AsRef<str>,
    {
        let provider: Arc<str> = provider.into();

        for (idx, name) in names.iter().enumerate() {
            let name = name.as_ref();
            if !is_identifier(name) {
                return Err(DeclarationError::InvalidName {
                    provider,
                    name: name.into(),
                });
            }
            if names[..idx].iter().any(|n| n.as_ref() == name) {
                return Err(DeclarationError::DuplicateParam {
                    provider,
                    name: name.into(),
                });
            }
        }

        if defaults.len() > names.len() {
            return Err(DeclarationError::MisalignedDefaults {
                provider,
                params: names.len(),
                defaults: defaults.len(),
            });
        }

        if names.len() > consumer_types.len() {
            return Err(DeclarationError::UnresolvedParamType {
                provider,
                consumer: consumer.as_str(),
                param: names[consumer_types.len()].as_ref().into(),
            });
        }

        if consumer_types.len() > names.len() {
            return Err(DeclarationError::ConsumerArity {
                provider,
                consumer: consumer.as_str(),
                expected: consumer_types.len(),
                declared: names.len(),
            });
        }

        let first_default = names.len() - defaults.len();
        let params = names
            .iter()
            .zip(consumer_types)
            .enumerate()
            .map(|(idx, (name, expected))| {
                let default = match idx.checked_sub(first_default) {
                    Some(d) => {
                        let source = defaults[d].as_ref().trim();
                        (!source.is_empty()).then(|| Arc::from(source))
                    }
                    None => None,
                };
                ParamSpec {
                    name: name.as_ref().into(),
                    expected: expected.clone(),
                    default,
                }
            })
            .collect();

        Ok(Schema {
            provider,
            params,
            consumer,
        })
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn consumer(&self) -> ConsumerKind {
        self.consumer
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&ParamSpec> {
        self.params.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name.as_ref() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.params.iter().map(|p| p.name.as_ref())
    }

    /// Render the call signature, e.g. `SomeInfo(str: string = "a", my_info: int)`.
    pub fn signature(&self) -> std::string::String {
        let params: Vec<_> = self
            .params
            .iter()
            .map(|p| match &p.default {
                Some(d) => format!("{}: {} = {d}", p.name, p.expected),
                None => format!("{}: {}", p.name, p.expected),
            })
            .collect();
        format!("{}({})", self.provider, params.join(", "))
    }
}
