//! Resolved service descriptor graph for the gwgen gateway generator.
//!
//! This crate turns a JSON descriptor request into an immutable object graph
//! of files, services, methods and HTTP bindings, with every type reference
//! already linked to the Go package of the file that declares it.
//!
//! # Architecture
//!
//! ```text
//! request.json → raw (serde) → Registry (resolution) → gwgen-codegen
//! ```

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod model;
mod package;
mod parse;
pub mod raw;
mod registry;

pub use error::{Error, Result};
pub use model::{
    Binding, Enum, FieldTarget, File, MessageRef, Method, PathParam, ResponseFile, Service,
};
pub use package::GoPackage;
pub use registry::{EnumLookup, Registry};
