//! Registry loading from files and strings.

use std::{path::Path, str::FromStr};

use crate::{Error, Registry, Result, error::SourceContext, raw::DescriptorRequest};

impl FromStr for Registry {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_request(s, "request.json")
    }
}

impl Registry {
    /// Load a descriptor request from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        parse_request(&content, &path.display().to_string())
    }

    /// Load a descriptor request from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_request(content, filename)
    }
}

/// Parse and resolve a request with the given filename for error reporting.
fn parse_request(content: &str, filename: &str) -> Result<Registry> {
    let ctx = SourceContext::new(content, filename);
    let request: DescriptorRequest =
        serde_json::from_str(content).map_err(|e| ctx.parse_error(e))?;
    Registry::resolve(request, &ctx)
}
