use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File already existed with identical content
    Unchanged,
}

/// A generated file, addressed relative to an output directory.
#[derive(Debug, Clone)]
pub struct File {
    path: PathBuf,
    content: String,
}

impl File {
    /// Create a new file with the given relative path and content (always overwritten)
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Get the relative file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Write the file below `base`.
    ///
    /// Files whose content is already up to date are left alone so reruns do
    /// not touch modification times.
    pub fn write(&self, base: &Path) -> Result<WriteResult> {
        let target = base.join(&self.path);

        if std::fs::read_to_string(&target).is_ok_and(|existing| existing == self.content) {
            return Ok(WriteResult::Unchanged);
        }

        write_file(&target, &self.content)
            .wrap_err_with(|| format!("failed to write '{}'", target.display()))?;
        Ok(WriteResult::Written)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
