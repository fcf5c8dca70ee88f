//! Collaborator abstractions for turning a file into Go source.
//!
//! - [`TemplateRenderer`] - Renders a [`TemplateParams`] bundle into source text
//! - [`SourceFormatter`] - Validates and normalizes rendered source text

mod traits;

pub use traits::{FormatError, RenderError, SourceFormatter, TemplateParams, TemplateRenderer};
