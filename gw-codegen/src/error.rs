use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::{
    PathType,
    language::{FormatError, RenderError},
};

/// Result type for code generation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a generation run.
///
/// Every variant is fatal for the whole batch; files without services are
/// skipped without producing an error.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("unknown path type '{value}': want \"import\" or \"source_relative\"")]
    #[diagnostic(code(gwgen::unknown_path_type))]
    UnknownPathType { value: String },

    #[error("cannot use module={module} with paths={paths}")]
    #[diagnostic(
        code(gwgen::module_with_paths),
        help("module= only applies to paths=import; drop one of the two settings")
    )]
    ModuleWithPaths { module: String, paths: PathType },

    #[error("{package_path}: file go path does not match module prefix: {prefix}/")]
    #[diagnostic(
        code(gwgen::module_prefix_mismatch),
        help("the go_package of every target must live below the module= prefix")
    )]
    ModulePrefixMismatch {
        package_path: String,
        prefix: String,
    },

    #[error("unknown generator parameter '{key}'")]
    #[diagnostic(
        code(gwgen::unknown_parameter),
        help(
            "known parameters: paths, module, request_context, register_func_suffix, allow_patch_feature, standalone, omit_package_doc"
        )
    )]
    UnknownParameter { key: String },

    #[error("invalid value '{value}' for generator parameter '{key}'")]
    #[diagnostic(code(gwgen::invalid_parameter))]
    InvalidParameter { key: String, value: String },

    #[error("failed to read '{path}'")]
    #[diagnostic(code(gwgen::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse generator config")]
    #[diagnostic(code(gwgen::config_parse))]
    Config {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to render gateway code for '{file}'")]
    #[diagnostic(code(gwgen::render))]
    Render {
        file: String,
        #[source]
        source: RenderError,
    },

    #[error("generated code for '{file}' is not valid Go source")]
    #[diagnostic(
        code(gwgen::format),
        help("this is a bug in the gateway template; the full generated text is attached")
    )]
    Format {
        file: String,
        /// The raw generated text, verbatim.
        #[source_code]
        code: NamedSource<String>,
        #[label("{source}")]
        span: Option<SourceSpan>,
        #[source]
        source: FormatError,
    },

    #[error("failed to compute output path for '{file}'")]
    #[diagnostic(
        code(gwgen::resolve_path),
        help("the generated text is attached; check `module` against the file's go_package")
    )]
    ResolvePath {
        file: String,
        /// The formatted generated text that could not be placed.
        #[source_code]
        code: NamedSource<String>,
        #[label("package clause")]
        span: Option<SourceSpan>,
        #[source]
        source: Box<Error>,
    },
}
