// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::lexer::*;
use crate::value::Value;

use core::{cmp, fmt, ops::Deref};
use std::sync::Arc;

pub struct NodeRef<T> {
    r: Arc<T>,
}

impl<T> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        Self { r: self.r.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for NodeRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.r.as_ref().fmt(f)
    }
}

impl<T> cmp::PartialEq for NodeRef<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.r, &other.r)
    }
}

impl<T> cmp::Eq for NodeRef<T> {}

impl<T> Deref for NodeRef<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.r
    }
}

impl<T> AsRef<T> for NodeRef<T> {
    fn as_ref(&self) -> &T {
        self.deref()
    }
}

impl<T> NodeRef<T> {
    pub fn new(t: T) -> Self {
        Self { r: Arc::new(t) }
    }
}

pub type Ref<T> = NodeRef<T>;

#[derive(Debug)]
pub enum Expr {
    None(Span),
    Bool { span: Span, value: bool },

    Int { span: Span, value: Value },

    /// Value holds the unescaped text.
    String { span: Span, value: Value },

    Var(Span),

    List {
        span: Span,
        items: Vec<Ref<Expr>>,
    },

    Dict {
        span: Span,
        fields: Vec<(Ref<Expr>, Ref<Expr>)>,
    },

    Dot {
        span: Span,
        refr: Ref<Expr>,
        field: Span,
    },

    Call {
        span: Span,
        fcn: Ref<Expr>,
        args: Vec<Argument>,
    },
}

#[derive(Debug)]
pub enum Argument {
    Positional(Ref<Expr>),
    Keyword { name: Span, value: Ref<Expr> },
}

impl Argument {
    pub fn value(&self) -> &Ref<Expr> {
        match self {
            Self::Positional(v) | Self::Keyword { value: v, .. } => v,
        }
    }
}

impl Expr {
    pub const fn span(&self) -> &Span {
        match self {
            Self::None(span) | Self::Var(span) => span,
            Self::Bool { span, .. }
            | Self::Int { span, .. }
            | Self::String { span, .. }
            | Self::List { span, .. }
            | Self::Dict { span, .. }
            | Self::Dot { span, .. }
            | Self::Call { span, .. } => span,
        }
    }

    /// Whether the expression is built only from constants and containers.
    /// Default values must be literals.
    pub fn is_literal(&self) -> bool {
        match self {
            Self::None(_) | Self::Bool { .. } | Self::Int { .. } | Self::String { .. } => true,
            Self::List { items, .. } => items.iter().all(|i| i.is_literal()),
            Self::Dict { fields, .. } => fields.iter().all(|(k, v)| k.is_literal() && v.is_literal()),
            Self::Var(_) | Self::Dot { .. } | Self::Call { .. } => false,
        }
    }
}
