//! Descriptor registry: resolves a raw request into the linked object graph.

use std::collections::HashMap;

use gwgen_core::go_identifier;
use indexmap::IndexMap;

use crate::{
    Binding, Enum, FieldTarget, File, GoPackage, MessageRef, Method, PathParam, Result, Service,
    error::SourceContext,
    raw::{DescriptorRequest, RawBinding, RawFile, RawMethod},
};

/// Resolves type names to enum declarations.
///
/// A miss is not an error: callers treat `None` as "not an enum".
pub trait EnumLookup {
    /// Look up an enum by fully-qualified name (the leading dot is optional).
    fn lookup_enum(&self, type_name: &str) -> Option<&Enum>;
}

/// The resolved descriptor graph for one generation run.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    files: IndexMap<String, File>,
    enums: HashMap<String, Enum>,
    targets: Vec<String>,
    parameter: Option<String>,
    omit_package_doc: bool,
}

impl Registry {
    /// Resolve a request that was built in memory.
    pub fn from_request(request: DescriptorRequest) -> Result<Self> {
        Self::resolve(request, &SourceContext::detached())
    }

    pub(crate) fn resolve(request: DescriptorRequest, ctx: &SourceContext) -> Result<Self> {
        let packages = assign_packages(&request.files);

        let mut messages: HashMap<String, MessageRef> = HashMap::new();
        let mut enums: HashMap<String, Enum> = HashMap::new();
        for (raw, go_package) in request.files.iter().zip(&packages) {
            for name in &raw.messages {
                let fqn = qualify(&raw.package, name);
                messages.insert(
                    fqn.clone(),
                    MessageRef {
                        fqn,
                        go_name: name.replace('.', "_"),
                        go_package: go_package.clone(),
                    },
                );
            }
            for name in &raw.enums {
                let fqn = qualify(&raw.package, name);
                enums.insert(
                    fqn.clone(),
                    Enum {
                        fqn,
                        go_name: name.replace('.', "_"),
                        file_name: raw.name.clone(),
                        go_package: go_package.clone(),
                    },
                );
            }
        }

        let mut files = IndexMap::with_capacity(request.files.len());
        for (raw, go_package) in request.files.iter().zip(packages) {
            if files.contains_key(&raw.name) {
                return Err(ctx.duplicate_file(&raw.name));
            }
            let file = resolve_file(raw, go_package, &messages, ctx)?;
            files.insert(raw.name.clone(), file);
        }

        for name in &request.files_to_generate {
            if !files.contains_key(name) {
                return Err(ctx.unknown_target(name));
            }
        }

        Ok(Self {
            files,
            enums,
            targets: request.files_to_generate,
            parameter: request.parameter,
            omit_package_doc: request.omit_package_doc,
        })
    }

    /// Look up a file by its declared name.
    pub fn file(&self, name: &str) -> Option<&File> {
        self.files.get(name)
    }

    /// Iterate over all files in declaration order.
    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.files.values()
    }

    /// Files code should be generated for, in request order.
    pub fn targets(&self) -> Vec<&File> {
        self.targets
            .iter()
            .filter_map(|name| self.files.get(name))
            .collect()
    }

    /// The generator parameter string carried by the request, if any.
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    /// Whether generated files should omit the package documentation comment.
    pub fn omit_package_doc(&self) -> bool {
        self.omit_package_doc
    }
}

impl EnumLookup for Registry {
    fn lookup_enum(&self, type_name: &str) -> Option<&Enum> {
        if type_name.is_empty() {
            return None;
        }
        if type_name.starts_with('.') {
            self.enums.get(type_name)
        } else {
            self.enums.get(&format!(".{}", type_name))
        }
    }
}

/// Compute the Go package of every file, aliasing packages whose name is
/// already taken by a different import path.
fn assign_packages(files: &[RawFile]) -> Vec<GoPackage> {
    let mut by_path: HashMap<String, GoPackage> = HashMap::new();
    let mut claimed: HashMap<String, String> = HashMap::new();

    files
        .iter()
        .map(|raw| {
            let pkg = match &raw.go_package {
                Some(option) => GoPackage::from_option(option),
                None => GoPackage::new("", fallback_package_name(raw)),
            };
            if let Some(known) = by_path.get(&pkg.path).filter(|_| !pkg.path.is_empty()) {
                return known.clone();
            }

            let pkg = match claimed.get(&pkg.name) {
                Some(owner) if *owner != pkg.path => {
                    let alias = (1..)
                        .map(|n| format!("{}_{}", pkg.name, n))
                        .find(|candidate| !claimed.contains_key(candidate))
                        .unwrap_or_else(|| pkg.name.clone());
                    claimed.insert(alias.clone(), pkg.path.clone());
                    pkg.with_alias(alias)
                }
                _ => {
                    claimed.insert(pkg.name.clone(), pkg.path.clone());
                    pkg
                }
            };
            by_path.insert(pkg.path.clone(), pkg.clone());
            pkg
        })
        .collect()
}

/// Package name for files without a `go_package` option.
fn fallback_package_name(raw: &RawFile) -> String {
    if raw.package.is_empty() {
        let stem = raw.name.rsplit('/').next().unwrap_or_default();
        go_identifier(stem.split('.').next().unwrap_or_default())
    } else {
        go_identifier(&raw.package.replace('.', "_"))
    }
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        format!(".{}", name)
    } else {
        format!(".{}.{}", package, name)
    }
}

fn resolve_file(
    raw: &RawFile,
    go_package: GoPackage,
    messages: &HashMap<String, MessageRef>,
    ctx: &SourceContext,
) -> Result<File> {
    let services = raw
        .services
        .iter()
        .map(|svc| {
            let methods = svc
                .methods
                .iter()
                .map(|m| resolve_method(raw, &svc.name, m, messages, ctx))
                .collect::<Result<Vec<_>>>()?;
            Ok(Service {
                name: svc.name.clone(),
                methods,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(File {
        name: raw.name.clone(),
        proto_package: raw.package.clone(),
        go_package,
        services,
    })
}

fn resolve_method(
    file: &RawFile,
    service: &str,
    raw: &RawMethod,
    messages: &HashMap<String, MessageRef>,
    ctx: &SourceContext,
) -> Result<Method> {
    let method_name = format!("{}.{}", service, raw.name);
    let lookup = |type_name: &str| {
        resolve_message(&file.package, type_name, messages)
            .cloned()
            .ok_or_else(|| ctx.unknown_type(&method_name, type_name))
    };

    Ok(Method {
        name: raw.name.clone(),
        request_type: lookup(&raw.request_type)?,
        response_type: lookup(&raw.response_type)?,
        client_streaming: raw.client_streaming,
        server_streaming: raw.server_streaming,
        bindings: raw
            .bindings
            .iter()
            .enumerate()
            .map(|(index, b)| resolve_binding(index, b))
            .collect(),
    })
}

/// Resolve a message name: absolute names directly, relative names against
/// the file's package first and the root scope second.
fn resolve_message<'a>(
    package: &str,
    type_name: &str,
    messages: &'a HashMap<String, MessageRef>,
) -> Option<&'a MessageRef> {
    if type_name.starts_with('.') {
        return messages.get(type_name);
    }
    messages
        .get(&qualify(package, type_name))
        .or_else(|| messages.get(&qualify("", type_name)))
}

fn resolve_binding(index: usize, raw: &RawBinding) -> Binding {
    Binding {
        index,
        http_method: raw.method.to_ascii_uppercase(),
        path_template: raw.pattern.clone(),
        body: raw.body.clone().filter(|body| !body.is_empty()),
        path_params: raw
            .path_params
            .iter()
            .map(|p| PathParam {
                field_path: p.field_path.clone(),
                target: FieldTarget {
                    name: p
                        .field_path
                        .rsplit('.')
                        .next()
                        .unwrap_or_default()
                        .to_string(),
                    type_name: p.type_name.clone(),
                },
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(json: &str) -> Registry {
        json.parse().expect("Failed to parse test request")
    }

    const TWO_FILES: &str = r#"{
        "files_to_generate": ["bar/svc.proto"],
        "files": [
            {
                "name": "common/types.proto",
                "package": "example.common",
                "go_package": "example.com/foo/common;commonpb",
                "messages": ["Page", "Page.Cursor"],
                "enums": ["Kind"]
            },
            {
                "name": "bar/svc.proto",
                "package": "example.bar",
                "go_package": "example.com/foo/bar",
                "messages": ["GetRequest", "GetResponse"],
                "services": [{
                    "name": "BarService",
                    "methods": [{
                        "name": "Get",
                        "request_type": "GetRequest",
                        "response_type": ".example.common.Page.Cursor",
                        "bindings": [{
                            "method": "get",
                            "pattern": "/v1/{kind}",
                            "path_params": [{"field_path": "kind", "type_name": ".example.common.Kind"}]
                        }]
                    }]
                }]
            }
        ]
    }"#;

    #[test]
    fn test_resolves_types_to_declaring_package() {
        let reg = registry(TWO_FILES);
        let file = reg.file("bar/svc.proto").unwrap();
        let method = &file.services[0].methods[0];

        assert_eq!(method.request_type.fqn, ".example.bar.GetRequest");
        assert_eq!(method.request_type.go_package.path, "example.com/foo/bar");
        assert_eq!(method.response_type.go_name, "Page_Cursor");
        assert_eq!(method.response_type.go_package.name, "commonpb");
        assert_eq!(method.bindings[0].http_method, "GET");
        assert_eq!(method.bindings[0].path_params[0].target.name, "kind");
    }

    #[test]
    fn test_lookup_enum_with_and_without_leading_dot() {
        let reg = registry(TWO_FILES);

        let kind = reg.lookup_enum(".example.common.Kind").unwrap();
        assert_eq!(kind.go_package.path, "example.com/foo/common");
        assert_eq!(kind.file_name, "common/types.proto");
        assert!(reg.lookup_enum("example.common.Kind").is_some());
        assert!(reg.lookup_enum(".example.common.Page").is_none());
        assert!(reg.lookup_enum("").is_none());
    }

    #[test]
    fn test_targets_in_request_order() {
        let reg = registry(TWO_FILES);
        let names: Vec<_> = reg.targets().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["bar/svc.proto"]);
        assert_eq!(reg.files().count(), 2);
    }

    #[test]
    fn test_unknown_request_type_is_an_error() {
        let err = r#"{
            "files_to_generate": ["a.proto"],
            "files": [{
                "name": "a.proto",
                "services": [{"name": "S", "methods": [
                    {"name": "M", "request_type": "Nope", "response_type": "Nope"}
                ]}]
            }]
        }"#
        .parse::<Registry>()
        .unwrap_err();

        assert!(matches!(*err, crate::Error::UnknownType { ref method, .. } if method == "S.M"));
    }

    #[test]
    fn test_unknown_target_is_an_error() {
        let err = r#"{"files_to_generate": ["missing.proto"], "files": []}"#
            .parse::<Registry>()
            .unwrap_err();

        assert!(matches!(*err, crate::Error::UnknownTarget { ref name, .. } if name == "missing.proto"));
    }

    #[test]
    fn test_colliding_package_names_get_aliases() {
        let reg = registry(
            r#"{
                "files_to_generate": [],
                "files": [
                    {"name": "a/v1/a.proto", "go_package": "example.com/a/v1"},
                    {"name": "b/v1/b.proto", "go_package": "example.com/b/v1"},
                    {"name": "a/v1/more.proto", "go_package": "example.com/a/v1"}
                ]
            }"#,
        );

        let a = &reg.file("a/v1/a.proto").unwrap().go_package;
        let b = &reg.file("b/v1/b.proto").unwrap().go_package;
        let more = &reg.file("a/v1/more.proto").unwrap().go_package;
        assert_eq!(a.alias, None);
        assert_eq!(b.alias.as_deref(), Some("v1_1"));
        assert_eq!(more.alias, None);
    }

    #[test]
    fn test_missing_go_package_falls_back_to_proto_package() {
        let reg = registry(
            r#"{
                "files_to_generate": [],
                "files": [
                    {"name": "svc.proto", "package": "example.v1"},
                    {"name": "dir/plain.proto"}
                ]
            }"#,
        );

        let svc = &reg.file("svc.proto").unwrap().go_package;
        assert_eq!(svc.path, "");
        assert_eq!(svc.name, "example_v1");
        assert_eq!(reg.file("dir/plain.proto").unwrap().go_package.name, "plain");
    }
}
