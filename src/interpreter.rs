// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::*;
use crate::binder::CallArgs;
use crate::globals::Globals;
use crate::lexer::*;
use crate::parser::*;
use crate::value::*;

use std::collections::BTreeMap;

use anyhow::{bail, Result};

/// Evaluates the source text of a default value.
pub trait LiteralEvaluator: Send + Sync {
    fn eval_literal(&self, source: &str) -> Result<Value>;
}

/// Tree-walking evaluator for build-file expressions.
///
/// Names resolve only against the [`Globals`] the interpreter was created
/// with; a name can only be called, never used as a value.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    globals: Globals,
}

impl Interpreter {
    pub fn new(globals: Globals) -> Self {
        Self { globals }
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn parse_str(file: &str, src: &str) -> Result<Ref<Expr>> {
        let source = Source::from_contents(file, src)?;
        let mut parser = Parser::new(&source)?;
        parser.parse()
    }

    pub fn eval_str(&self, file: &str, src: &str) -> Result<Value> {
        let expr = Self::parse_str(file, src)?;
        self.eval_expr(&expr)
    }

    pub fn eval_expr(&self, expr: &Ref<Expr>) -> Result<Value> {
        match expr.as_ref() {
            Expr::None(_) => Ok(Value::None),
            Expr::Bool { value, .. } => Ok(Value::Bool(*value)),
            Expr::Int { value, .. } | Expr::String { value, .. } => Ok(value.clone()),
            Expr::Var(span) => {
                let name = span.text();
                if self.globals.get(name).is_some() {
                    bail!(span.error(&format!("'{name}' can only be called")));
                }
                bail!(span.error(&format!("name '{name}' is not defined")))
            }
            Expr::List { items, .. } => {
                let items = items
                    .iter()
                    .map(|i| self.eval_expr(i))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::from(items))
            }
            Expr::Dict { fields, .. } => self.eval_dict(fields),
            Expr::Dot { refr, field, .. } => {
                let value = self.eval_expr(refr)?;
                let name = field.text();
                match &value {
                    Value::Info(info) => match info.get_attr(name) {
                        Some(v) => Ok(v),
                        None => bail!(field.error(&format!(
                            "{} has no field '{name}'",
                            info.provider_name()
                        ))),
                    },
                    _ => bail!(field.error(&format!(
                        "value of type '{}' has no attribute '{name}'",
                        value.type_name()
                    ))),
                }
            }
            Expr::Call { span, fcn, args } => self.eval_call(span, fcn, args),
        }
    }

    fn eval_dict(&self, fields: &[(Ref<Expr>, Ref<Expr>)]) -> Result<Value> {
        let mut map = BTreeMap::new();
        for (key_expr, value_expr) in fields {
            let key = self.eval_expr(key_expr)?;
            let value = self.eval_expr(value_expr)?;
            if map.insert(key.clone(), value).is_some() {
                bail!(key_expr
                    .span()
                    .error(&format!("duplicate key {key} in dict literal")));
            }
        }
        Ok(Value::from(map))
    }

    fn eval_call(&self, span: &Span, fcn: &Ref<Expr>, args: &[Argument]) -> Result<Value> {
        let Expr::Var(name) = fcn.as_ref() else {
            bail!(fcn.span().error("only named providers can be called"));
        };
        let Some(callable) = self.globals.get(name.text()) else {
            bail!(name.error(&format!("name '{}' is not defined", name.text())));
        };

        let mut call_args = CallArgs::new();
        for arg in args {
            match arg {
                Argument::Positional(v) => call_args.positional.push(self.eval_expr(v)?),
                Argument::Keyword { name, value } => call_args
                    .named
                    .push((name.text().into(), self.eval_expr(value)?)),
            }
        }

        tracing::trace!(callee = name.text(), args = args.len(), "call");
        callable
            .call(call_args)
            .map_err(|e| span.error(e.message()))
    }
}

impl LiteralEvaluator for Interpreter {
    fn eval_literal(&self, source: &str) -> Result<Value> {
        let expr = Self::parse_str("<default>", source)?;
        if !expr.is_literal() {
            bail!(expr.span().error("default value must be a literal"));
        }
        self.eval_expr(&expr)
    }
}
