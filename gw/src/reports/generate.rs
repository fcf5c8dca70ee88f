//! Generate command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from gateway generation.
#[derive(Debug)]
pub struct GenerateReport {
    /// Files written or previewed.
    pub result: GenerationResult,
}

/// Result of code generation.
#[derive(Debug)]
pub enum GenerationResult {
    /// Files were written to disk.
    Written(WrittenResult),
    /// Dry-run preview.
    Preview(Vec<PreviewFile>),
}

/// Result when files were written to disk.
#[derive(Debug)]
pub struct WrittenResult {
    /// Output directory.
    pub output_dir: PathBuf,
    /// Files created or updated, relative to the output directory.
    pub written: Vec<String>,
    /// Files that were already up to date.
    pub unchanged: Vec<String>,
}

/// A file in preview mode.
#[derive(Debug)]
pub struct PreviewFile {
    /// File path.
    pub path: String,
    /// File content.
    pub content: String,
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        match &self.result {
            GenerationResult::Written(written) => render_written(out, written),
            GenerationResult::Preview(files) => render_preview(out, files),
        }
    }
}

fn render_written(out: &mut dyn Output, written: &WrittenResult) {
    if written.written.is_empty() && written.unchanged.is_empty() {
        out.preformatted("No target declares an HTTP binding; nothing to generate");
        return;
    }

    out.key_value("Output", &written.output_dir.display().to_string());

    if !written.written.is_empty() {
        out.newline();
        out.section(&format!("Generated ({})", written.written.len()));
        for name in &written.written {
            out.added_item(name);
        }
    }

    if !written.unchanged.is_empty() {
        out.newline();
        out.section(&format!("Unchanged ({})", written.unchanged.len()));
        for name in &written.unchanged {
            out.list_item(name);
        }
    }
}

fn render_preview(out: &mut dyn Output, files: &[PreviewFile]) {
    for file in files {
        out.divider(&file.path);
        out.preformatted(&file.content);
    }

    out.divider("Summary");
    out.preformatted(&format!("{} files would be generated", files.len()));
}
