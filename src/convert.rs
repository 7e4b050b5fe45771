// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::types::TypeTag;
use crate::value::Value;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// A Rust type that can receive a bound argument.
///
/// `type_tag` is what the binder coerces to; `from_value` is only called on
/// values that already passed that coercion, and returns `None` for the
/// few cases a tag cannot express (e.g. an `i32` out of range).
pub trait InfoParam: Sized {
    fn type_tag() -> TypeTag;

    fn from_value(value: &Value) -> Option<Self>;

    fn into_value(self) -> Value;
}

impl InfoParam for Value {
    fn type_tag() -> TypeTag {
        TypeTag::Any
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    fn into_value(self) -> Value {
        self
    }
}

impl InfoParam for bool {
    fn type_tag() -> TypeTag {
        TypeTag::Bool
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl InfoParam for i64 {
    fn type_tag() -> TypeTag {
        TypeTag::Int
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl InfoParam for i32 {
    fn type_tag() -> TypeTag {
        TypeTag::Int
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => i32::try_from(*i).ok(),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl InfoParam for String {
    fn type_tag() -> TypeTag {
        TypeTag::String
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.as_ref().to_string()),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl InfoParam for Arc<str> {
    fn type_tag() -> TypeTag {
        TypeTag::String
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl<T: InfoParam> InfoParam for Option<T> {
    fn type_tag() -> TypeTag {
        TypeTag::optional(T::type_tag())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::None => Some(None),
            v => T::from_value(v).map(Some),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::None,
        }
    }
}

impl<T: InfoParam> InfoParam for Vec<T> {
    fn type_tag() -> TypeTag {
        TypeTag::list_of(T::type_tag())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::from(self.into_iter().map(T::into_value).collect::<Vec<_>>())
    }
}

impl<T: InfoParam + Ord> InfoParam for BTreeSet<T> {
    fn type_tag() -> TypeTag {
        TypeTag::set_of(T::type_tag())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Set(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::from(self.into_iter().map(T::into_value).collect::<BTreeSet<_>>())
    }
}

impl<K: InfoParam + Ord, V: InfoParam> InfoParam for BTreeMap<K, V> {
    fn type_tag() -> TypeTag {
        TypeTag::dict_of(K::type_tag(), V::type_tag())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Dict(fields) => fields
                .iter()
                .map(|(k, v)| Some((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::from(
            self.into_iter()
                .map(|(k, v)| (k.into_value(), v.into_value()))
                .collect::<BTreeMap<_, _>>(),
        )
    }
}

/// The argument list of a constructor or factory.
///
/// Implemented for tuples of [`InfoParam`] up to eight elements. The tuple
/// type of a consumer closure is what a schema's expected types are read
/// from.
pub trait Signature: Sized {
    fn type_tags() -> Vec<TypeTag>;

    /// Convert bound, coerced arguments. On failure returns the index of the
    /// argument that could not be converted.
    fn from_args(args: &[Value]) -> Result<Self, usize>;

    fn into_args(self) -> Vec<Value>;
}

macro_rules! impl_signature {
    ($($idx:tt $t:ident),*) => {
        impl<$($t: InfoParam),*> Signature for ($($t,)*) {
            fn type_tags() -> Vec<TypeTag> {
                vec![$($t::type_tag()),*]
            }

            #[allow(unused_variables)]
            fn from_args(args: &[Value]) -> Result<Self, usize> {
                Ok(($(
                    args.get($idx).and_then($t::from_value).ok_or($idx as usize)?,
                )*))
            }

            fn into_args(self) -> Vec<Value> {
                vec![$(self.$idx.into_value()),*]
            }
        }
    };
}

impl_signature!();
impl_signature!(0 A);
impl_signature!(0 A, 1 B);
impl_signature!(0 A, 1 B, 2 C);
impl_signature!(0 A, 1 B, 2 C, 3 D);
impl_signature!(0 A, 1 B, 2 C, 3 D, 4 E);
impl_signature!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
impl_signature!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
impl_signature!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);
