// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::value::Value;

use core::fmt;
use std::collections::{BTreeMap, BTreeSet};

/// Static type expected by the consumer of a bound argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Any,
    Bool,
    Int,
    String,
    List(Box<TypeTag>),
    Set(Box<TypeTag>),
    Dict(Box<TypeTag>, Box<TypeTag>),
    Optional(Box<TypeTag>),
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Any => f.write_str("any"),
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::Int => f.write_str("int"),
            TypeTag::String => f.write_str("string"),
            TypeTag::List(t) if **t == TypeTag::Any => f.write_str("list"),
            TypeTag::List(t) => write!(f, "list[{t}]"),
            TypeTag::Set(t) if **t == TypeTag::Any => f.write_str("set"),
            TypeTag::Set(t) => write!(f, "set[{t}]"),
            TypeTag::Dict(k, v) if **k == TypeTag::Any && **v == TypeTag::Any => {
                f.write_str("dict")
            }
            TypeTag::Dict(k, v) => write!(f, "dict[{k}, {v}]"),
            TypeTag::Optional(t) => write!(f, "{t} or None"),
        }
    }
}

impl TypeTag {
    pub fn list_of(t: TypeTag) -> TypeTag {
        TypeTag::List(Box::new(t))
    }

    pub fn set_of(t: TypeTag) -> TypeTag {
        TypeTag::Set(Box::new(t))
    }

    pub fn dict_of(k: TypeTag, v: TypeTag) -> TypeTag {
        TypeTag::Dict(Box::new(k), Box::new(v))
    }

    pub fn optional(t: TypeTag) -> TypeTag {
        TypeTag::Optional(Box::new(t))
    }

    /// Coerce a dynamic value into this type.
    ///
    /// Lists coerce to lists and sets, dicts to dicts and scalars only to
    /// their own type. Returns `None` when no coercion applies.
    pub fn coerce(&self, value: Value) -> Option<Value> {
        match (self, value) {
            (TypeTag::Any, v) => Some(v),
            (TypeTag::Optional(_), Value::None) => Some(Value::None),
            (TypeTag::Optional(t), v) => t.coerce(v),
            (TypeTag::Bool, v @ Value::Bool(_)) => Some(v),
            (TypeTag::Int, v @ Value::Int(_)) => Some(v),
            (TypeTag::String, v @ Value::String(_)) => Some(v),

            // Untyped collections need no element walk.
            (TypeTag::List(t), v @ Value::List(_)) if **t == TypeTag::Any => Some(v),
            (TypeTag::List(t), Value::List(items)) => {
                let mut coerced = Vec::with_capacity(items.len());
                for item in items.iter() {
                    coerced.push(t.coerce(item.clone())?);
                }
                Some(Value::from(coerced))
            }

            (TypeTag::Set(t), v @ Value::Set(_)) if **t == TypeTag::Any => Some(v),
            (TypeTag::Set(t), Value::List(items)) => Self::coerce_into_set(t, items.iter()),
            (TypeTag::Set(t), Value::Set(items)) => Self::coerce_into_set(t, items.iter()),

            (TypeTag::Dict(k, v), d @ Value::Dict(_))
                if **k == TypeTag::Any && **v == TypeTag::Any =>
            {
                Some(d)
            }
            (TypeTag::Dict(kt, vt), Value::Dict(fields)) => {
                let mut coerced = BTreeMap::new();
                for (k, v) in fields.iter() {
                    coerced.insert(kt.coerce(k.clone())?, vt.coerce(v.clone())?);
                }
                Some(Value::from(coerced))
            }

            _ => None,
        }
    }

    fn coerce_into_set<'a>(t: &TypeTag, items: impl Iterator<Item = &'a Value>) -> Option<Value> {
        let mut coerced = BTreeSet::new();
        for item in items {
            coerced.insert(t.coerce(item.clone())?);
        }
        Some(Value::from(coerced))
    }
}
