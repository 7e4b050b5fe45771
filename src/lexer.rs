// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::cmp;
use core::fmt::{self, Debug, Formatter};
use core::iter::Peekable;
use core::str::CharIndices;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};

struct SourceInternal {
    file: String,
    contents: String,
    lines: Vec<(u32, u32)>,
}

/// Source text of a build file or of a single default literal.
#[derive(Clone)]
pub struct Source {
    src: Arc<SourceInternal>,
}

impl cmp::PartialEq for Source {
    fn eq(&self, other: &Source) -> bool {
        Arc::ptr_eq(&self.src, &other.src)
    }
}

impl cmp::Eq for Source {}

impl Debug for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        self.src.file.fmt(f)
    }
}

impl Source {
    pub fn from_contents(file: impl Into<String>, contents: impl Into<String>) -> Result<Source> {
        let (file, contents) = (file.into(), contents.into());
        let max_size = u32::MAX as usize - 2;
        if contents.len() > max_size {
            bail!("{file} exceeds maximum allowed file size {max_size}");
        }
        // (start, end) byte offsets of each line, without the terminator.
        let mut lines = vec![];
        let mut start = 0usize;
        for line in contents.split_inclusive('\n') {
            let text = line.trim_end_matches('\n');
            let text = text.strip_suffix('\r').unwrap_or(text);
            lines.push((start as u32, (start + text.len()) as u32));
            start += line.len();
        }
        if lines.is_empty() || contents.ends_with('\n') {
            lines.push((start as u32, start as u32));
        }
        Ok(Self {
            src: Arc::new(SourceInternal {
                file,
                contents,
                lines,
            }),
        })
    }

    pub fn file(&self) -> &str {
        &self.src.file
    }

    pub fn contents(&self) -> &str {
        &self.src.contents
    }

    pub fn line(&self, idx: u32) -> &str {
        match self.src.lines.get(idx as usize) {
            Some((start, end)) => &self.src.contents[*start as usize..*end as usize],
            None => "",
        }
    }

    /// Render `msg` with the offending line and a caret under `col`.
    pub fn message(&self, line: u32, col: u32, kind: &str, msg: &str) -> String {
        if line == 0 || line as usize > self.src.lines.len() {
            return format!("{}: invalid line {line} specified", self.src.file);
        }

        let number = line.to_string();
        let gutter = " ".repeat(number.len() + 1);
        let caret = " ".repeat(col.saturating_sub(1) as usize);
        format!(
            "\n--> {file}:{line}:{col}\n{gutter}|\n{number} | {text}\n{gutter}| {caret}^\n{kind}: {msg}",
            file = self.src.file,
            text = self.line(line - 1),
        )
    }

    pub fn error(&self, line: u32, col: u32, msg: &str) -> anyhow::Error {
        anyhow!(self.message(line, col, "error", msg))
    }
}

#[derive(Clone)]
pub struct Span {
    pub source: Source,
    pub line: u32,
    pub col: u32,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn text(&self) -> &str {
        &self.source.contents()[self.start as usize..self.end as usize]
    }

    pub fn message(&self, kind: &str, msg: &str) -> String {
        self.source.message(self.line, self.col, kind, msg)
    }

    pub fn error(&self, msg: &str) -> anyhow::Error {
        self.source.error(self.line, self.col, msg)
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let t = self.text().escape_debug().to_string();
        let max = 32;
        let (txt, trailer) = match t.char_indices().nth(max) {
            Some((idx, _)) => (&t[..idx], "..."),
            None => (t.as_str(), ""),
        };

        f.write_fmt(format_args!(
            "{}:{}:{}:{}, \"{}{}\"",
            self.line, self.col, self.start, self.end, txt, trailer
        ))
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    Symbol,
    /// Span excludes the quotes; escapes are still present.
    String,
    Number,
    Ident,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token(pub TokenKind, pub Span);

#[derive(Clone)]
pub struct Lexer<'source> {
    source: Source,
    iter: Peekable<CharIndices<'source>>,
    line: u32,
    col: u32,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source Source) -> Self {
        Self {
            source: source.clone(),
            iter: source.contents().char_indices().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn peek(&mut self) -> (usize, char) {
        match self.iter.peek() {
            Some((index, chr)) => (*index, *chr),
            _ => (self.source.contents().len(), '\x00'),
        }
    }

    // The NUL returned by `peek` past the end is only a placeholder; a NUL in
    // the source itself is not end of input.
    fn at_end(&self, offset: usize) -> bool {
        offset >= self.source.contents().len()
    }

    fn peekahead(&mut self, n: usize) -> (usize, char) {
        match self.iter.clone().nth(n) {
            Some((index, chr)) => (index, chr),
            _ => (self.source.contents().len(), '\x00'),
        }
    }

    fn span(&self, line: u32, col: u32, start: usize, end: usize) -> Span {
        Span {
            source: self.source.clone(),
            line,
            col,
            start: start as u32,
            end: end as u32,
        }
    }

    fn read_ident(&mut self) -> Result<Token> {
        let start = self.peek().0;
        let col = self.col;
        loop {
            let ch = self.peek().1;
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.iter.next();
            } else {
                break;
            }
        }
        let end = self.peek().0;
        self.col += (end - start) as u32;
        Ok(Token(TokenKind::Ident, self.span(self.line, col, start, end)))
    }

    fn read_digits(&mut self) {
        while self.peek().1.is_ascii_digit() {
            self.iter.next();
        }
    }

    // Decimal integers only. A leading '-' is part of the literal.
    fn read_number(&mut self) -> Result<Token> {
        let (start, chr) = self.peek();
        let col = self.col;
        self.iter.next();

        let first = match chr {
            '-' => {
                let (_, d) = self.peek();
                self.iter.next();
                d
            }
            _ => chr,
        };
        if first != '0' {
            self.read_digits();
        }

        let end = self.peek().0;
        self.col += (end - start) as u32;

        let ch = self.peek().1;
        if ch == '_' || ch == '.' || ch.is_ascii_alphanumeric() {
            return Err(self.source.error(self.line, self.col, "invalid number"));
        }

        if self.source.contents()[start..end].parse::<i64>().is_err() {
            return Err(self
                .source
                .error(self.line, col, "integer literal out of range"));
        }

        Ok(Token(TokenKind::Number, self.span(self.line, col, start, end)))
    }

    fn read_string(&mut self) -> Result<Token> {
        let (line, col) = (self.line, self.col);
        let (_, quote) = self.peek();
        self.iter.next();
        self.col += 1;
        let (start, _) = self.peek();
        loop {
            let (offset, ch) = self.peek();
            let ch_col = self.col + (offset - start) as u32;
            match ch {
                _ if ch == '\n' || self.at_end(offset) => {
                    return Err(self.source.error(line, col, &format!("unmatched {quote}")));
                }
                '\x00' => return Err(self.source.error(line, ch_col, "invalid character")),
                c if c == quote => break,
                '\\' => {
                    self.iter.next();
                    let (_, esc) = self.peek();
                    self.iter.next();
                    match esc {
                        '"' | '\'' | '\\' | 'n' | 'r' | 't' | '0' => (),
                        'u' => {
                            for _i in 0..4 {
                                let (offset, ch) = self.peek();
                                if !ch.is_ascii_hexdigit() {
                                    let col = self.col + (offset - start) as u32;
                                    return Err(self.source.error(
                                        line,
                                        col,
                                        "invalid hex escape sequence",
                                    ));
                                }
                                self.iter.next();
                            }
                        }
                        _ => {
                            return Err(self.source.error(line, ch_col, "invalid escape sequence"))
                        }
                    }
                }
                _ => {
                    self.iter.next();
                }
            }
        }

        let end = self.peek().0;
        self.iter.next();
        self.col += self.source.contents()[start..end].chars().count() as u32 + 1;

        Ok(Token(TokenKind::String, self.span(line, col + 1, start, end)))
    }

    fn skip_ws(&mut self) -> Result<()> {
        // A tab is considered 4 space characters. Comments run to end of line.
        'outer: loop {
            match self.peek().1 {
                ' ' => self.col += 1,
                '\t' => self.col += 4,
                '\r' => {
                    if self.peekahead(1).1 != '\n' {
                        return Err(self.source.error(
                            self.line,
                            self.col,
                            "\\r must be followed by \\n",
                        ));
                    }
                }
                '\n' => {
                    self.col = 1;
                    self.line += 1;
                }
                '#' => {
                    self.iter.next();
                    loop {
                        match self.peek().1 {
                            '\n' | '\x00' => continue 'outer,
                            _ => self.iter.next(),
                        };
                    }
                }
                _ => break,
            }
            self.iter.next();
        }
        Ok(())
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_ws()?;

        let (start, chr) = self.peek();
        let col = self.col;

        match chr {
            '-' if self.peekahead(1).1.is_ascii_digit() => self.read_number(),
            '{' | '}' | '[' | ']' | '(' | ')' | ',' | ':' | '=' | '.' => {
                self.col += 1;
                self.iter.next();
                Ok(Token(
                    TokenKind::Symbol,
                    self.span(self.line, col, start, start + 1),
                ))
            }
            '"' | '\'' => self.read_string(),
            _ if self.at_end(start) => Ok(Token(
                TokenKind::Eof,
                self.span(self.line, col, start, start),
            )),
            _ if chr.is_ascii_digit() => self.read_number(),
            _ if chr.is_ascii_alphabetic() || chr == '_' => self.read_ident(),
            _ => Err(self.source.error(self.line, self.col, "invalid character")),
        }
    }
}
