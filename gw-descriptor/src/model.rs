//! Resolved descriptor graph.
//!
//! Everything here is produced by [`Registry`](crate::Registry) and is never
//! mutated afterwards; code generators only borrow it.

use crate::GoPackage;

/// A parsed `.proto` source file.
#[derive(Debug, Clone)]
pub struct File {
    /// Declared file name (e.g. `"bar/svc.proto"`).
    pub name: String,
    /// Protobuf package (e.g. `"example.bar.v1"`), possibly empty.
    pub proto_package: String,
    /// Go package the file's generated code belongs to.
    pub go_package: GoPackage,
    /// Services in declaration order.
    pub services: Vec<Service>,
}

impl File {
    /// Returns true if any method of any service carries at least one HTTP binding.
    pub fn has_bindings(&self) -> bool {
        self.services.iter().any(Service::has_bindings)
    }
}

/// A service declared in a [`File`].
#[derive(Debug, Clone)]
pub struct Service {
    /// Service name (e.g. `"EchoService"`).
    pub name: String,
    /// Methods in declaration order.
    pub methods: Vec<Method>,
}

impl Service {
    /// Returns true if at least one method has an HTTP binding.
    pub fn has_bindings(&self) -> bool {
        self.methods.iter().any(|m| !m.bindings.is_empty())
    }
}

/// An RPC method.
#[derive(Debug, Clone)]
pub struct Method {
    /// Method name (e.g. `"Echo"`).
    pub name: String,
    /// Request message, linked to its declaring file's package.
    pub request_type: MessageRef,
    /// Response message, linked to its declaring file's package.
    pub response_type: MessageRef,
    /// Whether the client streams requests.
    pub client_streaming: bool,
    /// Whether the server streams responses.
    pub server_streaming: bool,
    /// HTTP bindings in declaration order; empty when the method is not exposed.
    pub bindings: Vec<Binding>,
}

/// Reference to a message type and the package of the file that declares it.
#[derive(Debug, Clone)]
pub struct MessageRef {
    /// Fully-qualified protobuf name with leading dot (e.g. `".example.v1.EchoRequest"`).
    pub fqn: String,
    /// Go type name (nested messages joined with `_`).
    pub go_name: String,
    /// Go package of the declaring file.
    pub go_package: GoPackage,
}

/// An HTTP route bound to a method.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Position of this binding within its method.
    pub index: usize,
    /// HTTP verb in upper case (e.g. `"GET"`).
    pub http_method: String,
    /// Path template (e.g. `"/v1/{name}"`).
    pub path_template: String,
    /// Request body field path: `None` for no body, `"*"` for the whole request.
    pub body: Option<String>,
    /// Parameters captured from the path, in template order.
    pub path_params: Vec<PathParam>,
}

/// A path parameter captured by a [`Binding`].
#[derive(Debug, Clone)]
pub struct PathParam {
    /// Dotted field path into the request message (e.g. `"book.name"`).
    pub field_path: String,
    /// Field the path ends at.
    pub target: FieldTarget,
}

/// The field a path parameter resolves to.
#[derive(Debug, Clone)]
pub struct FieldTarget {
    /// Field name.
    pub name: String,
    /// Fully-qualified type name for message and enum fields; `None` for scalars.
    pub type_name: Option<String>,
}

impl FieldTarget {
    /// Type name used for lookups; scalars yield an empty string.
    pub fn type_name(&self) -> &str {
        self.type_name.as_deref().unwrap_or_default()
    }
}

/// An enum type.
#[derive(Debug, Clone)]
pub struct Enum {
    /// Fully-qualified protobuf name with leading dot.
    pub fqn: String,
    /// Go type name (nested enums joined with `_`).
    pub go_name: String,
    /// Name of the file declaring the enum.
    pub file_name: String,
    /// Go package of the declaring file.
    pub go_package: GoPackage,
}

/// A generated output file handed back to the plugin caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFile {
    /// Go package of the source file.
    pub go_package: GoPackage,
    /// Output file name (e.g. `"example.com/foo/bar/svc.pb.gw.go"`).
    pub name: String,
    /// Generated, formatted source text.
    pub content: String,
}
