//! Code generation building blocks.
//!
//! - [`CodeBuilder`] - Tab-indented line buffer for Go source

mod code_builder;

pub use code_builder::CodeBuilder;
