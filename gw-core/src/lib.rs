//! Core utilities and types for the gwgen gateway generator.
//!
//! This crate provides the output-file plumbing and the identifier helpers
//! shared by the descriptor loader, the code generator and the binary.

mod file;
mod utils;

// File operations
pub use file::{File, WriteResult};
// String utilities
pub use utils::{go_identifier, to_pascal_case};
