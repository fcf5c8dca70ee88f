//! Structural check and whitespace normalization for generated Go source.
//!
//! [`GoFormatter`] does not reformat code: the template is responsible for
//! layout. It rejects text a Go compiler would refuse to tokenize (unbalanced
//! brackets, unterminated literals and comments, a missing package clause)
//! and normalizes whitespace the way `gofmt` would leave it.

use std::collections::HashSet;

use crate::language::{FormatError, SourceFormatter};

/// Default [`SourceFormatter`] for gateway files.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoFormatter;

impl GoFormatter {
    /// Create a formatter.
    pub fn new() -> Self {
        Self
    }
}

impl SourceFormatter for GoFormatter {
    fn format(&self, src: &str) -> Result<String, FormatError> {
        let scan = Scanner::new(src).run()?;
        Ok(normalize(src, &scan.raw_lines))
    }
}

/// Result of a successful scan.
#[derive(Debug, Default)]
struct Scan {
    /// 0-based lines touched by multi-line raw strings; left verbatim.
    raw_lines: HashSet<usize>,
}

struct Open {
    delim: u8,
    offset: usize,
    line: usize,
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    stack: Vec<Open>,
    saw_package: bool,
    scan: Scan,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            stack: Vec::new(),
            saw_package: false,
            scan: Scan::default(),
        }
    }

    fn run(mut self) -> Result<Scan, FormatError> {
        while let Some(&b) = self.bytes.get(self.pos) {
            match b {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b'/' if self.peek(1) == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment()?,
                b'"' => self.skip_quoted(b'"', "string literal not terminated")?,
                b'\'' => self.skip_quoted(b'\'', "rune literal not terminated")?,
                b'`' => self.skip_raw_string()?,
                b'(' | b'[' | b'{' => {
                    self.stack.push(Open {
                        delim: b,
                        offset: self.pos,
                        line: self.line,
                    });
                    self.pos += 1;
                }
                b')' | b']' | b'}' => self.close(b)?,
                b if b.is_ascii_alphabetic() || b == b'_' => self.word()?,
                _ => self.pos += 1,
            }
        }

        if let Some(open) = self.stack.pop() {
            return Err(self.error_at(
                format!("unclosed '{}'", open.delim as char),
                open.line,
                open.offset,
            ));
        }
        if !self.saw_package {
            return Err(self.error_at("expected 'package' clause", 1, 0));
        }
        Ok(self.scan)
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn error_at(&self, message: impl Into<String>, line: usize, offset: usize) -> FormatError {
        FormatError {
            message: message.into(),
            line,
            offset,
            text: self.src.to_string(),
        }
    }

    fn word(&mut self) -> Result<(), FormatError> {
        let start = self.pos;
        while self
            .peek(0)
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || !b.is_ascii())
        {
            self.pos += 1;
        }
        if self.saw_package {
            return Ok(());
        }
        if &self.src[start..self.pos] != "package" {
            return Err(self.error_at("expected 'package' clause", self.line, start));
        }
        self.saw_package = true;
        Ok(())
    }

    fn close(&mut self, b: u8) -> Result<(), FormatError> {
        let want = match b {
            b')' => b'(',
            b']' => b'[',
            _ => b'{',
        };
        match self.stack.pop() {
            Some(open) if open.delim == want => {
                self.pos += 1;
                Ok(())
            }
            Some(open) => Err(self.error_at(
                format!(
                    "unexpected '{}', expected close of '{}' from line {}",
                    b as char, open.delim as char, open.line
                ),
                self.line,
                self.pos,
            )),
            None => Err(self.error_at(
                format!("unexpected '{}'", b as char),
                self.line,
                self.pos,
            )),
        }
    }

    fn skip_line_comment(&mut self) {
        while self.peek(0).is_some_and(|b| b != b'\n') {
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), FormatError> {
        let (start, line) = (self.pos, self.line);
        self.pos += 2;
        loop {
            match self.peek(0) {
                None => return Err(self.error_at("comment not terminated", line, start)),
                Some(b'*') if self.peek(1) == Some(b'/') => {
                    self.pos += 2;
                    return Ok(());
                }
                Some(b'\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn skip_quoted(&mut self, quote: u8, message: &str) -> Result<(), FormatError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek(0) {
                None | Some(b'\n') => return Err(self.error_at(message, self.line, start)),
                Some(b'\\') => self.pos += 2,
                Some(b) if b == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn skip_raw_string(&mut self) -> Result<(), FormatError> {
        let (start, line) = (self.pos, self.line);
        self.pos += 1;
        loop {
            match self.peek(0) {
                None => return Err(self.error_at("raw string literal not terminated", line, start)),
                Some(b'`') => {
                    self.pos += 1;
                    if self.line > line {
                        self.scan.raw_lines.extend(line - 1..self.line);
                    }
                    return Ok(());
                }
                Some(b'\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
    }
}

/// Trim trailing whitespace, drop leading blank lines, collapse runs of blank
/// lines and end the text with exactly one newline.
fn normalize(src: &str, raw_lines: &HashSet<usize>) -> String {
    let mut out = String::with_capacity(src.len());
    let mut pending_blank = false;

    for (i, line) in src.lines().enumerate() {
        if raw_lines.contains(&i) {
            if pending_blank {
                out.push('\n');
                pending_blank = false;
            }
            out.push_str(line);
            out.push('\n');
            continue;
        }

        let line = line.trim_end();
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push('\n');
            pending_blank = false;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
