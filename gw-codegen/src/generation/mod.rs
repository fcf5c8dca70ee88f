//! Per-file generation inputs.
//!
//! - [`ImportSet`] - Ordered, deduplicated Go imports
//! - [`ImportCollector`] - Import computation for a gateway file

mod imports;

pub use imports::{ImportCollector, ImportSet};
