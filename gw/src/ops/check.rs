//! Check operation - per-target generation status.

use std::path::Path;

use gwgen_descriptor::{File, ResponseFile};

use crate::reports::{CheckReport, TargetStatus};

/// Pair each target with the file generated for it.
///
/// `files` must come from generating exactly `targets`; files without HTTP
/// bindings produce no output and are reported as skipped.
pub fn check(input: &Path, targets: &[&File], files: &[ResponseFile]) -> CheckReport {
    let mut emitted = files.iter();
    let targets = targets
        .iter()
        .map(|target| TargetStatus {
            name: target.name.clone(),
            output: target
                .has_bindings()
                .then(|| emitted.next().map(|f| f.name.clone()))
                .flatten(),
        })
        .collect();

    CheckReport {
        input: input.to_path_buf(),
        targets,
    }
}
