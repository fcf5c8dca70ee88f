//! Generate operation - writing or previewing gateway files.

use std::path::Path;

use eyre::Result;
use gwgen_core::{File, WriteResult};
use gwgen_descriptor::ResponseFile;

use crate::reports::{GenerateReport, GenerationResult, PreviewFile, WrittenResult};

/// Write generated files below `output`, skipping files that are up to date.
pub fn write(files: Vec<ResponseFile>, output: &Path) -> Result<GenerateReport> {
    let mut written = Vec::new();
    let mut unchanged = Vec::new();

    for file in files {
        let out = File::new(&file.name, file.content);
        match out.write(output)? {
            WriteResult::Written => written.push(file.name),
            WriteResult::Unchanged => unchanged.push(file.name),
        }
    }
    tracing::info!(
        written = written.len(),
        unchanged = unchanged.len(),
        "wrote gateway files"
    );

    Ok(GenerateReport {
        result: GenerationResult::Written(WrittenResult {
            output_dir: output.to_path_buf(),
            written,
            unchanged,
        }),
    })
}

/// Describe generated files without touching the disk.
pub fn preview(files: Vec<ResponseFile>) -> GenerateReport {
    let files = files
        .into_iter()
        .map(|f| PreviewFile {
            path: f.name,
            content: f.content,
        })
        .collect();

    GenerateReport {
        result: GenerationResult::Preview(files),
    }
}
