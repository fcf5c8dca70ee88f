//! Generator configuration.
//!
//! Options come from an optional `gwgen.toml` file and are then overridden by
//! the protoc-style parameter string (`key=value,key=value`).

use std::{fmt, path::Path, str::FromStr};

use gwgen_descriptor::GoPackage;
use miette::{NamedSource, SourceSpan};
use serde::Deserialize;

use crate::{Error, Result, paths::PathConfig};

/// Go packages every gateway file imports, in import-block order.
pub const DEFAULT_BASE_IMPORTS: &[&str] = &[
    "context",
    "errors",
    "io",
    "net/http",
    "github.com/grpc-ecosystem/grpc-gateway/v2/runtime",
    "github.com/grpc-ecosystem/grpc-gateway/v2/utilities",
    "google.golang.org/grpc",
    "google.golang.org/grpc/codes",
    "google.golang.org/grpc/grpclog",
    "google.golang.org/grpc/metadata",
    "google.golang.org/grpc/status",
    "google.golang.org/protobuf/proto",
];

/// How output paths are derived from a file's location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathType {
    /// Place output under the Go import path of the file's package.
    #[default]
    Import,
    /// Place output next to the source file.
    SourceRelative,
}

impl FromStr for PathType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "import" => Ok(Self::Import),
            "source_relative" => Ok(Self::SourceRelative),
            other => Err(Error::UnknownPathType {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::SourceRelative => write!(f, "source_relative"),
        }
    }
}

/// Configuration for one generation run. Immutable once the generator is built.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorOptions {
    /// Import paths every generated file imports.
    pub base_imports: Vec<String>,
    /// Derive the RPC context from the HTTP request instead of `context.Background()`.
    pub request_context: bool,
    /// Suffix of the generated `Register*` function names; may be empty.
    pub register_func_suffix: String,
    /// Output path addressing mode.
    pub paths: PathType,
    /// Module prefix stripped from output paths; only valid with `paths=import`.
    pub module: String,
    /// Populate field masks for PATCH requests that carry a body.
    pub allow_patch_feature: bool,
    /// Generate code that lives outside the messages' package.
    pub standalone: bool,
    /// Leave out the package documentation comment.
    pub omit_package_doc: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            base_imports: DEFAULT_BASE_IMPORTS.iter().map(|s| s.to_string()).collect(),
            request_context: true,
            register_func_suffix: "Handler".to_string(),
            paths: PathType::Import,
            module: String::new(),
            allow_patch_feature: true,
            standalone: false,
            omit_package_doc: false,
        }
    }
}

impl GeneratorOptions {
    /// Load options from a `gwgen.toml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, &path.display().to_string())
    }

    /// Parse options from TOML with a filename for error reporting.
    pub fn from_toml(content: &str, filename: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source: toml::de::Error| Error::Config {
            src: NamedSource::new(filename, content.to_string()),
            span: source.span().map(SourceSpan::from),
            source,
        })
    }

    /// Apply a protoc-style parameter string (`paths=source_relative,standalone=true`).
    ///
    /// A key without a value sets a boolean option to `true`.
    pub fn apply_parameter(&mut self, parameter: &str) -> Result<()> {
        for entry in parameter.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = match entry.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (entry, None),
            };

            match key {
                "paths" => self.paths = value.unwrap_or_default().parse()?,
                "module" => self.module = value.unwrap_or_default().to_string(),
                "register_func_suffix" => {
                    self.register_func_suffix = value.unwrap_or_default().to_string()
                }
                "request_context" => self.request_context = parse_bool(key, value)?,
                "allow_patch_feature" => self.allow_patch_feature = parse_bool(key, value)?,
                "standalone" => self.standalone = parse_bool(key, value)?,
                "omit_package_doc" => self.omit_package_doc = parse_bool(key, value)?,
                _ => {
                    return Err(Error::UnknownParameter {
                        key: key.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Validated output path configuration.
    pub fn path_config(&self) -> Result<PathConfig> {
        PathConfig::new(self.paths, &self.module)
    }

    /// Base imports as packages, in configured order.
    pub fn base_packages(&self) -> Vec<GoPackage> {
        self.base_imports
            .iter()
            .map(|path| GoPackage::from_path(path.as_str()))
            .collect()
    }
}

fn parse_bool(key: &str, value: Option<&str>) -> Result<bool> {
    match value {
        None | Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => Err(Error::InvalidParameter {
            key: key.to_string(),
            value: other.to_string(),
        }),
    }
}
