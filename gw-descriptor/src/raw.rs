//! Serialized descriptor request as produced by the IDL front end.
//!
//! Type references in this form are plain strings; [`Registry`](crate::Registry)
//! links them to their declaring files.

use serde::Deserialize;

/// Root of a descriptor request document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescriptorRequest {
    /// Generator parameter string (e.g. `"paths=source_relative"`).
    #[serde(default)]
    pub parameter: Option<String>,

    /// Names of the files code should be generated for, in order.
    pub files_to_generate: Vec<String>,

    /// Suppress the package documentation comment in generated files.
    #[serde(default)]
    pub omit_package_doc: bool,

    /// Every file in the compilation, targets and their dependencies.
    pub files: Vec<RawFile>,
}

/// A source file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFile {
    pub name: String,

    #[serde(default)]
    pub package: String,

    /// `go_package` option: `"path"` or `"path;name"`.
    #[serde(default)]
    pub go_package: Option<String>,

    /// Message names relative to the package (nested messages use `Outer.Inner`).
    #[serde(default)]
    pub messages: Vec<String>,

    /// Enum names relative to the package.
    #[serde(default)]
    pub enums: Vec<String>,

    #[serde(default)]
    pub services: Vec<RawService>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawService {
    pub name: String,

    #[serde(default)]
    pub methods: Vec<RawMethod>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMethod {
    pub name: String,

    /// Request type, fully qualified (`.pkg.Msg`) or relative to the file's package.
    pub request_type: String,

    /// Response type, fully qualified (`.pkg.Msg`) or relative to the file's package.
    pub response_type: String,

    #[serde(default)]
    pub client_streaming: bool,

    #[serde(default)]
    pub server_streaming: bool,

    #[serde(default)]
    pub bindings: Vec<RawBinding>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawBinding {
    /// HTTP verb (case-insensitive).
    pub method: String,

    /// Path template.
    pub pattern: String,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub path_params: Vec<RawPathParam>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPathParam {
    /// Dotted field path into the request message.
    pub field_path: String,

    /// Fully-qualified type of the target field, for message and enum fields.
    #[serde(default)]
    pub type_name: Option<String>,
}
