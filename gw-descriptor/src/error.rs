use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for descriptor operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Encapsulates the request document and its filename so resolution errors
/// can point back at the offending JSON.
#[derive(Debug, Clone)]
pub(crate) struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// A context for requests that were built in memory rather than parsed.
    pub fn detached() -> Self {
        Self::new("", "<memory>")
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Locate the first occurrence of `value` as a JSON string literal.
    fn span_of(&self, value: &str) -> Option<SourceSpan> {
        let quoted = format!("\"{}\"", value);
        self.src
            .find(&quoted)
            .map(|pos| SourceSpan::from((pos + 1, value.len())))
    }

    pub fn parse_error(&self, source: serde_json::Error) -> Box<Error> {
        let span = byte_offset(&self.src, source.line(), source.column())
            .map(|offset| SourceSpan::from((offset, 0)));
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    pub fn duplicate_file(&self, name: &str) -> Box<Error> {
        Box::new(Error::DuplicateFile {
            src: self.named_source(),
            span: self.span_of(name),
            name: name.to_string(),
        })
    }

    pub fn unknown_type(&self, method: &str, type_name: &str) -> Box<Error> {
        Box::new(Error::UnknownType {
            src: self.named_source(),
            span: self.span_of(type_name),
            method: method.to_string(),
            type_name: type_name.to_string(),
        })
    }

    pub fn unknown_target(&self, name: &str) -> Box<Error> {
        Box::new(Error::UnknownTarget {
            src: self.named_source(),
            span: self.span_of(name),
            name: name.to_string(),
        })
    }
}

/// Convert a 1-based line/column pair into a byte offset.
fn byte_offset(src: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    Some((line_start + column.saturating_sub(1)).min(src.len()))
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(code(gwgen::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse descriptor request")]
    #[diagnostic(code(gwgen::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: serde_json::Error,
    },

    #[error("file '{name}' is declared more than once")]
    #[diagnostic(code(gwgen::duplicate_file))]
    DuplicateFile {
        #[source_code]
        src: NamedSource<String>,
        #[label("declared again here")]
        span: Option<SourceSpan>,
        name: String,
    },

    #[error("method '{method}' references unknown message type '{type_name}'")]
    #[diagnostic(
        code(gwgen::unknown_type),
        help("declare the message in one of the request's files, or fully qualify it as '.package.Message'")
    )]
    UnknownType {
        #[source_code]
        src: NamedSource<String>,
        #[label("not declared in any file")]
        span: Option<SourceSpan>,
        method: String,
        type_name: String,
    },

    #[error("file to generate '{name}' is not part of the request")]
    #[diagnostic(
        code(gwgen::unknown_target),
        help("every entry of 'files_to_generate' must match the name of an entry in 'files'")
    )]
    UnknownTarget {
        #[source_code]
        src: NamedSource<String>,
        #[label("no such file")]
        span: Option<SourceSpan>,
        name: String,
    },
}
