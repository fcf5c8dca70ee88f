//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from descriptor and option validation.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the descriptor request.
    pub input: PathBuf,
    /// Status of every target, in request order.
    pub targets: Vec<TargetStatus>,
}

/// What generation does with one target file.
#[derive(Debug)]
pub struct TargetStatus {
    /// Declared file name.
    pub name: String,
    /// Output file name; `None` when the file is skipped.
    pub output: Option<String>,
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        out.preformatted(&format!("✓ {} is valid", self.input.display()));
        out.newline();

        let count = self.targets.len();
        out.section(&format!(
            "{} target{}",
            count,
            if count == 1 { "" } else { "s" }
        ));
        for target in &self.targets {
            match &target.output {
                Some(output) => out.list_item(&format!("{} → {}", target.name, output)),
                None => out.list_item(&format!("{} (skipped: no HTTP bindings)", target.name)),
            }
        }
    }
}
