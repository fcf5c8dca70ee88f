//! Go package identity.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use gwgen_core::go_identifier;

/// A Go package that generated code lives in or imports.
///
/// Two packages are the same package when their import paths are equal; the
/// package name and alias only affect how the package is referenced.
#[derive(Debug, Clone, Eq)]
pub struct GoPackage {
    /// Import path (e.g. `github.com/grpc-ecosystem/grpc-gateway/v2/runtime`).
    pub path: String,
    /// Package name declared in the package clause.
    pub name: String,
    /// Import alias, when the package name collides with another import.
    pub alias: Option<String>,
}

impl GoPackage {
    /// Create a package with an explicit name.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            alias: None,
        }
    }

    /// Create a package named after the last element of its import path.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = go_identifier(&path);
        Self::new(path, name)
    }

    /// Parse a `go_package` option value (`"path;name"` or `"path"`).
    pub fn from_option(value: &str) -> Self {
        match value.split_once(';') {
            Some((path, name)) => Self::new(path, name),
            None => Self::from_path(value),
        }
    }

    /// Set the import alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Identifier used to qualify names from this package in Go source.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl PartialEq for GoPackage {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Hash for GoPackage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// Formats the package as a Go import spec (`alias "path"` or `"path"`).
impl fmt::Display for GoPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} {:?}", alias, self.path),
            None => write!(f, "{:?}", self.path),
        }
    }
}
