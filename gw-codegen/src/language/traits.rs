//! Rendering and formatting traits.

use gwgen_descriptor::{File, GoPackage};
use thiserror::Error;

/// Everything a template needs to render one gateway file.
#[derive(Debug, Clone, Copy)]
pub struct TemplateParams<'a> {
    /// The file being rendered.
    pub file: &'a File,
    /// Packages to import, in import-block order.
    pub imports: &'a [GoPackage],
    /// Derive the RPC context from the HTTP request.
    pub use_request_context: bool,
    /// Suffix of the generated `Register*` function names.
    pub register_func_suffix: &'a str,
    /// Populate field masks for PATCH requests with a body.
    pub allow_patch_feature: bool,
    /// Qualify the file's own message types with its package.
    pub standalone: bool,
    /// Leave out the package documentation comment.
    pub omit_package_doc: bool,
}

/// Renders gateway source text.
pub trait TemplateRenderer {
    /// Render the file described by `params`.
    fn render(&self, params: &TemplateParams<'_>) -> Result<String, RenderError>;
}

/// Validates and normalizes generated source text.
pub trait SourceFormatter {
    /// Return the normalized form of `src`, or describe why it is not valid source.
    fn format(&self, src: &str) -> Result<String, FormatError>;
}

/// A template failed to render.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    /// Create a render error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Generated text is not valid source.
#[derive(Debug, Clone, Error)]
#[error("{message} (line {line})")]
pub struct FormatError {
    /// What is wrong.
    pub message: String,
    /// 1-based line of the problem.
    pub line: usize,
    /// Byte offset of the problem in `text`.
    pub offset: usize,
    /// The offending text, verbatim.
    pub text: String,
}
