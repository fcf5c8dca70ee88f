//! Output path resolution for generated gateway files.
//!
//! The addressing mode and the module prefix are validated together once, in
//! [`PathConfig::new`], so resolution itself is a plain three-way dispatch.

use gwgen_descriptor::File;

use crate::{Error, PathType, Result};

/// Suffix replacing the source extension of every generated gateway file.
pub const GATEWAY_SUFFIX: &str = ".pb.gw.go";

/// Validated output addressing mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathConfig {
    /// `<go import path>/<base name>`; the declared name when the import path is empty.
    Import,
    /// The declared file name, unchanged.
    SourceRelative,
    /// The Go import path with the module prefix stripped, joined with the base name.
    Module(String),
}

impl PathConfig {
    /// Combine an addressing mode with an optional module prefix.
    ///
    /// A module prefix is only meaningful for import addressing; pairing it
    /// with any other mode is rejected here, before any file is processed.
    pub fn new(paths: PathType, module: &str) -> Result<Self> {
        match (paths, module) {
            (PathType::Import, "") => Ok(Self::Import),
            (PathType::SourceRelative, "") => Ok(Self::SourceRelative),
            (PathType::Import, prefix) => Ok(Self::Module(prefix.to_string())),
            (paths, module) => Err(Error::ModuleWithPaths {
                module: module.to_string(),
                paths,
            }),
        }
    }

    /// Compute the output location of `file`'s companion, before suffixing.
    pub fn resolve(&self, file: &File) -> Result<String> {
        let name = file.name.as_str();
        let package_path = file.go_package.path.as_str();

        match self {
            Self::Module(prefix) => {
                let trim = format!("{}/", prefix);
                let pkg = format!("{}/", package_path);
                match pkg.strip_prefix(&trim) {
                    Some(rest) => Ok(join(rest, base_name(name))),
                    None => Err(Error::ModulePrefixMismatch {
                        package_path: package_path.to_string(),
                        prefix: prefix.clone(),
                    }),
                }
            }
            Self::Import if !package_path.is_empty() => {
                Ok(format!("{}/{}", package_path, base_name(name)))
            }
            Self::Import | Self::SourceRelative => Ok(name.to_string()),
        }
    }
}

/// Swap the extension of a resolved path for [`GATEWAY_SUFFIX`].
pub fn gateway_file_name(resolved: &str) -> String {
    format!("{}{}", strip_extension(resolved), GATEWAY_SUFFIX)
}

/// Last element of a slash-separated path, ignoring trailing slashes.
fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.is_empty() { "." } else { "/" };
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Remove the extension (from the last `.` of the final element) of a path.
fn strip_extension(path: &str) -> &str {
    let element_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[element_start..].rfind('.') {
        Some(dot) => &path[..element_start + dot],
        None => path,
    }
}

/// Join two slash-separated paths, dropping empty and `.` elements.
fn join(dir: &str, name: &str) -> String {
    dir.split('/')
        .chain(name.split('/'))
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}
