// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::*;
use crate::lexer::*;
use crate::value::*;

use anyhow::{bail, Result};

#[derive(Clone)]
pub struct Parser<'source> {
    source: Source,
    lexer: Lexer<'source>,
    tok: Token,
    end: u32,
}

impl<'source> Parser<'source> {
    pub fn new(source: &'source Source) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let tok = lexer.next_token()?;
        Ok(Self {
            source: source.clone(),
            lexer,
            tok,
            end: 0,
        })
    }

    pub fn token_text(&self) -> &str {
        match self.tok.0 {
            TokenKind::Symbol | TokenKind::Number | TokenKind::Ident | TokenKind::Eof => {
                self.tok.1.text()
            }
            TokenKind::String => "",
        }
    }

    pub fn next_token(&mut self) -> Result<()> {
        self.end = self.tok.1.end;
        self.tok = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, text: &str, context: &str) -> Result<()> {
        if self.tok.0 != TokenKind::String && self.token_text() == text {
            self.next_token()
        } else {
            let msg = format!("expecting `{text}` {context}");
            Err(self.source.error(self.tok.1.line, self.tok.1.col, &msg))
        }
    }

    fn at_symbol(&self, text: &str) -> bool {
        self.tok.0 == TokenKind::Symbol && self.tok.1.text() == text
    }

    /// Parse a complete source: one expression followed by end of input.
    pub fn parse(&mut self) -> Result<Ref<Expr>> {
        let expr = self.parse_expr()?;
        if self.tok.0 != TokenKind::Eof {
            bail!(self
                .tok
                .1
                .error("unexpected token after end of expression"));
        }
        Ok(Ref::new(expr))
    }

    pub fn parse_expr(&mut self) -> Result<Expr> {
        let first = self.tok.1.clone();
        let mut term = self.parse_primary()?;

        loop {
            let mut span = first.clone();
            match self.token_text() {
                "." if self.tok.0 == TokenKind::Symbol => {
                    self.next_token()?;
                    if self.tok.0 != TokenKind::Ident {
                        bail!(self.tok.1.error("expecting attribute name after `.`"));
                    }
                    let field = self.tok.1.clone();
                    self.next_token()?;
                    span.end = self.end;
                    term = Expr::Dot {
                        span,
                        refr: Ref::new(term),
                        field,
                    };
                }
                "(" if self.tok.0 == TokenKind::Symbol => {
                    self.next_token()?;
                    let args = self.parse_call_args()?;
                    span.end = self.end;
                    term = Expr::Call {
                        span,
                        fcn: Ref::new(term),
                        args,
                    };
                }
                _ => break,
            }
        }

        Ok(term)
    }

    fn parse_call_args(&mut self) -> Result<Vec<Argument>> {
        let mut args = vec![];
        let mut seen_keyword = false;
        while !self.at_symbol(")") {
            if self.tok.0 == TokenKind::Eof {
                break;
            }
            let arg_span = self.tok.1.clone();
            let arg = self.parse_argument()?;
            match arg {
                Argument::Keyword { .. } => seen_keyword = true,
                Argument::Positional(_) if seen_keyword => {
                    bail!(arg_span.error("positional argument follows keyword argument"))
                }
                _ => (),
            }
            args.push(arg);
            if !self.at_symbol(",") {
                break;
            }
            self.next_token()?;
        }
        self.expect(")", "while parsing call arguments")?;
        Ok(args)
    }

    fn parse_argument(&mut self) -> Result<Argument> {
        if self.tok.0 == TokenKind::Ident {
            // Look ahead for `name =` without consuming on failure.
            let mut state = self.clone();
            let name = state.tok.1.clone();
            state.next_token()?;
            if state.at_symbol("=") {
                state.next_token()?;
                *self = state;
                let value = self.parse_expr()?;
                return Ok(Argument::Keyword {
                    name,
                    value: Ref::new(value),
                });
            }
        }
        Ok(Argument::Positional(Ref::new(self.parse_expr()?)))
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let span = self.tok.1.clone();
        match self.tok.0 {
            TokenKind::Number => {
                let value = match span.text().parse::<i64>() {
                    Ok(v) => Value::from(v),
                    Err(_) => bail!(span.error("invalid integer literal")),
                };
                self.next_token()?;
                Ok(Expr::Int { span, value })
            }
            TokenKind::String => {
                let value = Value::from(unescape(&span)?);
                self.next_token()?;
                Ok(Expr::String { span, value })
            }
            TokenKind::Ident => {
                self.next_token()?;
                Ok(match span.text() {
                    "None" => Expr::None(span),
                    "True" => Expr::Bool { span, value: true },
                    "False" => Expr::Bool { span, value: false },
                    _ => Expr::Var(span),
                })
            }
            TokenKind::Symbol => match span.text() {
                "[" => self.parse_list(),
                "{" => self.parse_dict(),
                "(" => self.parse_parens_expr(),
                _ => bail!(span.error("unexpected symbol")),
            },
            TokenKind::Eof => bail!(span.error("unexpected end of input")),
        }
    }

    fn parse_list(&mut self) -> Result<Expr> {
        let mut span = self.tok.1.clone();
        self.expect("[", "while parsing list")?;
        let mut items = vec![];
        while !self.at_symbol("]") && self.tok.0 != TokenKind::Eof {
            items.push(Ref::new(self.parse_expr()?));
            if !self.at_symbol(",") {
                break;
            }
            self.next_token()?;
        }
        self.expect("]", "while parsing list")?;
        span.end = self.end;
        Ok(Expr::List { span, items })
    }

    fn parse_dict(&mut self) -> Result<Expr> {
        let mut span = self.tok.1.clone();
        self.expect("{", "while parsing dict")?;
        let mut fields = vec![];
        while !self.at_symbol("}") && self.tok.0 != TokenKind::Eof {
            let key = self.parse_expr()?;
            self.expect(":", "while parsing dict item")?;
            let value = self.parse_expr()?;
            fields.push((Ref::new(key), Ref::new(value)));
            if !self.at_symbol(",") {
                break;
            }
            self.next_token()?;
        }
        self.expect("}", "while parsing dict")?;
        span.end = self.end;
        Ok(Expr::Dict { span, fields })
    }

    fn parse_parens_expr(&mut self) -> Result<Expr> {
        self.next_token()?;
        let expr = self.parse_expr()?;
        self.expect(")", "while parsing parenthesized expression")?;
        Ok(expr)
    }
}

/// Resolve escape sequences in the text of a string token.
pub fn unescape(span: &Span) -> Result<String> {
    let text = span.text();
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(c @ ('"' | '\'' | '\\')) => out.push(c),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let c = u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32);
                match c {
                    Some(c) => out.push(c),
                    None => bail!(span.error(&format!("invalid unicode escape \\u{hex}"))),
                }
            }
            _ => bail!(span.error("invalid escape sequence")),
        }
    }
    Ok(out)
}
