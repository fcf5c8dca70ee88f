//! Default gateway template.
//!
//! [`GatewayTemplate`] renders a reverse-proxy skeleton for every service
//! with HTTP bindings: request adapters for both the client and in-process
//! server transports, the `Register*` entry points, and the route tables.

mod handlers;
mod pattern;

use gwgen_core::to_pascal_case;
use gwgen_descriptor::{Enum, EnumLookup, GoPackage};

pub use pattern::{OP_CODE_VERSION, Pattern};

use crate::{
    builder::CodeBuilder,
    language::{RenderError, TemplateParams, TemplateRenderer},
};

/// Tool name written into the generated-code header.
pub const GENERATOR_NAME: &str = "gwgen";

/// Statements keeping base imports referenced even when no handler uses them.
const IMPORT_GUARDS: &[(&str, &str)] = &[
    ("google.golang.org/grpc/codes", "_ codes.Code"),
    ("io", "_ io.Reader"),
    ("google.golang.org/grpc/status", "_ status.Status"),
    ("errors", "_ = errors.New"),
    (
        "github.com/grpc-ecosystem/grpc-gateway/v2/runtime",
        "_ = runtime.String",
    ),
    (
        "github.com/grpc-ecosystem/grpc-gateway/v2/utilities",
        "_ = utilities.NewDoubleArray",
    ),
    ("google.golang.org/grpc/metadata", "_ = metadata.Join"),
];

/// Renders `.pb.gw.go` source with a [`CodeBuilder`].
///
/// Enum-typed path parameters are converted with the enum's value map, so
/// the template needs the same enum lookup the import collector used.
pub struct GatewayTemplate<'a> {
    lookup: &'a dyn EnumLookup,
}

impl<'a> GatewayTemplate<'a> {
    /// Create a template that resolves enum path parameters through `lookup`.
    pub fn new(lookup: &'a dyn EnumLookup) -> Self {
        Self { lookup }
    }
}

impl TemplateRenderer for GatewayTemplate<'_> {
    fn render(&self, params: &TemplateParams<'_>) -> Result<String, RenderError> {
        let scope = Scope {
            params,
            lookup: self.lookup,
        };

        let mut b = CodeBuilder::new();
        scope.write_header(&mut b);
        scope.write_imports(&mut b);
        scope.write_guards(&mut b);

        for svc in params.file.services.iter().filter(|s| s.has_bindings()) {
            handlers::write_service(&scope, svc, &mut b)?;
        }
        Ok(b.build())
    }
}

/// Naming context shared by every part of one rendered file.
pub(crate) struct Scope<'p> {
    params: &'p TemplateParams<'p>,
    lookup: &'p dyn EnumLookup,
}

impl<'p> Scope<'p> {
    fn own_package(&self) -> &GoPackage {
        &self.params.file.go_package
    }

    /// Alias the file's own package is imported under in standalone mode.
    fn standalone_alias(&self) -> String {
        format!("ext{}", to_pascal_case(&self.own_package().name))
    }

    /// Prefix for names declared in `pkg`, including the trailing dot.
    ///
    /// Imported packages are referenced by the name they were imported under.
    fn prefix_for(&self, pkg: &GoPackage) -> String {
        if pkg == self.own_package() {
            if self.params.standalone {
                return format!("{}.", self.standalone_alias());
            }
            return String::new();
        }
        let imported = self.params.imports.iter().find(|p| *p == pkg).unwrap_or(pkg);
        format!("{}.", imported.qualifier())
    }

    /// Reference a name declared in `pkg` from the generated file.
    fn qualify(&self, pkg: &GoPackage, name: &str) -> String {
        format!("{}{}", self.prefix_for(pkg), name)
    }

    /// Reference a name generated into the file's own package (clients, servers).
    fn qualify_own(&self, name: &str) -> String {
        self.qualify(self.own_package(), name)
    }

    fn lookup_enum(&self, type_name: &str) -> Option<&Enum> {
        self.lookup.lookup_enum(type_name)
    }

    fn write_header(&self, b: &mut CodeBuilder) {
        let file = self.params.file;
        b.push_comment(&format!(
            "Code generated by {GENERATOR_NAME}. DO NOT EDIT."
        ))
        .push_comment(&format!("source: {}", file.name))
        .push_blank();

        if !self.params.omit_package_doc {
            b.push_line("/*")
                .push_line(&format!(
                    "Package {} is a reverse proxy.",
                    file.go_package.name
                ))
                .push_blank()
                .push_line("It translates gRPC into RESTful JSON APIs.")
                .push_line("*/");
        }
        b.push_line(&format!("package {}", file.go_package.name));
    }

    fn write_imports(&self, b: &mut CodeBuilder) {
        b.push_blank().push_block("import (", ")", |b| {
            for pkg in self.params.imports {
                if self.params.standalone && pkg == self.own_package() {
                    b.push_line(&format!("{} {:?}", self.standalone_alias(), pkg.path));
                } else {
                    b.push_line(&pkg.to_string());
                }
            }
        });
    }

    fn write_guards(&self, b: &mut CodeBuilder) {
        let guards: Vec<&str> = IMPORT_GUARDS
            .iter()
            .filter(|(path, _)| self.params.imports.iter().any(|p| p.path == *path))
            .map(|(_, guard)| *guard)
            .collect();
        if guards.is_empty() {
            return;
        }

        b.push_blank()
            .push_comment("Suppress \"imported and not used\" errors")
            .push_block("var (", ")", |b| {
                for guard in guards {
                    b.push_line(guard);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use gwgen_descriptor::{Binding, FieldTarget, File, MessageRef, Method, PathParam, Service};

    use super::*;
    use crate::{
        DEFAULT_BASE_IMPORTS, format::GoFormatter, generation::ImportCollector,
        language::SourceFormatter,
    };

    #[derive(Default)]
    struct Enums(HashMap<String, Enum>);

    impl EnumLookup for Enums {
        fn lookup_enum(&self, type_name: &str) -> Option<&Enum> {
            self.0.get(type_name)
        }
    }

    const OWN: &str = "example.com/foo/bar";

    fn message(name: &str, package_path: &str) -> MessageRef {
        MessageRef {
            fqn: format!(".example.bar.{name}"),
            go_name: name.to_string(),
            go_package: GoPackage::from_path(package_path),
        }
    }

    fn param(field_path: &str, type_name: Option<&str>) -> PathParam {
        PathParam {
            field_path: field_path.to_string(),
            target: FieldTarget {
                name: field_path.rsplit('.').next().unwrap_or_default().to_string(),
                type_name: type_name.map(str::to_string),
            },
        }
    }

    fn binding(http_method: &str, path: &str, body: Option<&str>, params: Vec<PathParam>) -> Binding {
        Binding {
            index: 0,
            http_method: http_method.to_string(),
            path_template: path.to_string(),
            body: body.map(str::to_string),
            path_params: params,
        }
    }

    fn method(name: &str, request: MessageRef, bindings: Vec<Binding>) -> Method {
        Method {
            name: name.to_string(),
            request_type: request,
            response_type: message("Reply", OWN),
            client_streaming: false,
            server_streaming: false,
            bindings: bindings
                .into_iter()
                .enumerate()
                .map(|(index, b)| Binding { index, ..b })
                .collect(),
        }
    }

    fn file(methods: Vec<Method>) -> File {
        File {
            name: "bar/svc.proto".to_string(),
            proto_package: "example.bar".to_string(),
            go_package: GoPackage::from_path(OWN),
            services: vec![Service {
                name: "BarService".to_string(),
                methods,
            }],
        }
    }

    fn params<'a>(file: &'a File, imports: &'a [GoPackage]) -> TemplateParams<'a> {
        TemplateParams {
            file,
            imports,
            use_request_context: true,
            register_func_suffix: "Handler",
            allow_patch_feature: true,
            standalone: false,
            omit_package_doc: false,
        }
    }

    fn render_with(file: &File, enums: &Enums, f: impl FnOnce(&mut TemplateParams<'_>)) -> String {
        let base: Vec<GoPackage> = DEFAULT_BASE_IMPORTS
            .iter()
            .map(|p| GoPackage::from_path(*p))
            .collect();
        let mut p = params(file, &[]);
        f(&mut p);
        let imports = ImportCollector::new(&base, enums)
            .standalone(p.standalone)
            .collect(file);
        p.imports = imports.as_slice();
        GatewayTemplate::new(enums).render(&p).unwrap()
    }

    fn echo_file() -> File {
        file(vec![method(
            "Echo",
            message("EchoRequest", OWN),
            vec![binding("GET", "/v1/echo/{id}", None, vec![param("id", None)])],
        )])
    }

    #[test]
    fn test_header_and_package_doc() {
        let out = render_with(&echo_file(), &Enums::default(), |_| {});
        assert!(out.starts_with(
            "// Code generated by gwgen. DO NOT EDIT.\n// source: bar/svc.proto\n\n/*\nPackage bar is a reverse proxy.\n"
        ));
        assert!(out.contains("*/\npackage bar\n"));
    }

    #[test]
    fn test_omit_package_doc() {
        let out = render_with(&echo_file(), &Enums::default(), |p| p.omit_package_doc = true);
        assert!(!out.contains("is a reverse proxy"));
        assert!(out.contains("// source: bar/svc.proto\n\npackage bar\n"));
    }

    #[test]
    fn test_import_block_and_guards() {
        let out = render_with(&echo_file(), &Enums::default(), |_| {});
        assert!(out.contains("import (\n\t\"context\"\n\t\"errors\"\n"));
        assert!(out.contains("var (\n\t_ codes.Code\n\t_ io.Reader\n"));
        assert!(out.contains("\t_ = metadata.Join\n)\n"));
    }

    #[test]
    fn test_register_functions_use_suffix() {
        let out = render_with(&echo_file(), &Enums::default(), |p| {
            p.register_func_suffix = "Gateway"
        });
        assert!(out.contains("func RegisterBarServiceGatewayServer(ctx context.Context, mux *runtime.ServeMux, server BarServiceServer) error {"));
        assert!(out.contains("func RegisterBarServiceGatewayFromEndpoint("));
        assert!(out.contains("func RegisterBarServiceGateway(ctx context.Context, mux *runtime.ServeMux, conn *grpc.ClientConn) error {"));
        assert!(out.contains("return RegisterBarServiceGatewayClient(ctx, mux, NewBarServiceClient(conn))"));
    }

    #[test]
    fn test_request_context_flag() {
        let out = render_with(&echo_file(), &Enums::default(), |_| {});
        assert!(out.contains("context.WithCancel(req.Context())"));

        let out = render_with(&echo_file(), &Enums::default(), |p| p.use_request_context = false);
        assert!(out.contains("context.WithCancel(context.Background())"));
        assert!(!out.contains("req.Context()"));
    }

    #[test]
    fn test_route_tables() {
        let out = render_with(&echo_file(), &Enums::default(), |_| {});
        assert!(out.contains(
            "\tpattern_BarService_Echo_0 = runtime.MustPattern(runtime.NewPattern(1, []int{2, 0, 2, 1, 1, 0, 4, 1, 5, 2}, []string{\"v1\", \"echo\", \"id\"}, \"\"))\n"
        ));
        assert!(out.contains("\tforward_BarService_Echo_0 = runtime.ForwardResponseMessage\n"));
        assert!(out.contains("mux.Handle(\"GET\", pattern_BarService_Echo_0,"));
        assert!(out.contains("\"/example.bar.BarService/Echo\", runtime.WithHTTPPathPattern(\"/v1/echo/{id}\")"));
    }

    #[test]
    fn test_scalar_path_param() {
        let out = render_with(&echo_file(), &Enums::default(), |_| {});
        assert!(out.contains("\tval, ok = pathParams[\"id\"]\n"));
        assert!(out.contains("\terr = runtime.PopulateFieldFromPath(&protoReq, \"id\", val)\n"));
        assert!(out.contains("var filter_BarService_Echo_0 = utilities.NewDoubleArray([][]string{{\"id\"}})"));
    }

    #[test]
    fn test_enum_path_param_from_other_package() {
        let mut enums = Enums::default();
        enums.0.insert(
            ".example.types.Kind".to_string(),
            Enum {
                fqn: ".example.types.Kind".to_string(),
                go_name: "Kind".to_string(),
                file_name: "types/kind.proto".to_string(),
                go_package: GoPackage::from_path("example.com/foo/types"),
            },
        );
        let f = file(vec![method(
            "List",
            message("ListRequest", OWN),
            vec![binding(
                "GET",
                "/v1/{kind}",
                None,
                vec![param("kind", Some(".example.types.Kind"))],
            )],
        )]);

        let out = render_with(&f, &enums, |_| {});
        assert!(out.contains("\t\"example.com/foo/types\"\n"));
        assert!(out.contains("\te, err = runtime.Enum(val, types.Kind_value)\n"));
        assert!(out.contains("\tprotoReq.Kind = types.Kind(e)\n"));
    }

    #[test]
    fn test_request_type_from_other_package() {
        let f = file(vec![method(
            "Create",
            message("Book", "example.com/foo/common"),
            vec![binding("POST", "/v1/books", Some("*"), vec![])],
        )]);

        let out = render_with(&f, &Enums::default(), |_| {});
        assert!(out.contains("\t\tprotoReq common.Book\n"));
        assert!(out.contains("Decode(&protoReq); err != nil && !errors.Is(err, io.EOF)"));
        assert!(!out.contains("filter_BarService_Create_0"));
    }

    #[test]
    fn test_patch_field_mask() {
        let f = file(vec![method(
            "Update",
            message("UpdateRequest", OWN),
            vec![binding(
                "PATCH",
                "/v1/{book.name}",
                Some("book"),
                vec![param("book.name", None)],
            )],
        )]);

        let out = render_with(&f, &Enums::default(), |_| {});
        assert!(out.contains("runtime.FieldMaskFromRequestBody(newReader(), protoReq.Book)"));
        assert!(out.contains("utilities.NewDoubleArray([][]string{{\"book\"}, {\"book\", \"name\"}})"));

        let out = render_with(&f, &Enums::default(), |p| p.allow_patch_feature = false);
        assert!(!out.contains("FieldMaskFromRequestBody"));
        assert!(out.contains("Decode(&protoReq.Book)"));
    }

    #[test]
    fn test_standalone_qualifies_own_package() {
        let out = render_with(&echo_file(), &Enums::default(), |p| p.standalone = true);
        assert!(out.contains("\textBar \"example.com/foo/bar\"\n"));
        assert!(out.contains("\t\tprotoReq extBar.EchoRequest\n"));
        assert!(out.contains("server extBar.BarServiceServer"));
        assert!(out.contains("extBar.NewBarServiceClient(conn)"));
    }

    #[test]
    fn test_server_streaming() {
        let mut m = method(
            "Watch",
            message("WatchRequest", OWN),
            vec![binding("GET", "/v1/watch", None, vec![])],
        );
        m.server_streaming = true;

        let out = render_with(&file(vec![m]), &Enums::default(), |_| {});
        assert!(out.contains("(BarService_WatchClient, runtime.ServerMetadata, error) {"));
        assert!(out.contains("forward_BarService_Watch_0 = runtime.ForwardResponseStream"));
        assert!(!out.contains("func local_request_BarService_Watch_0"));
        assert!(out.contains("streaming calls are not yet supported in the in-process transport"));
    }

    #[test]
    fn test_services_without_bindings_are_left_out() {
        let mut f = echo_file();
        f.services.push(Service {
            name: "Internal".to_string(),
            methods: vec![method("Ping", message("Ping", OWN), vec![])],
        });

        let out = render_with(&f, &Enums::default(), |_| {});
        assert!(!out.contains("RegisterInternal"));
    }

    #[test]
    fn test_output_passes_source_check() {
        let f = file(vec![
            method(
                "Echo",
                message("EchoRequest", OWN),
                vec![
                    binding("GET", "/v1/echo/{id}", None, vec![param("id", None)]),
                    binding("POST", "/v1/echo", Some("*"), vec![]),
                ],
            ),
            method(
                "Update",
                message("UpdateRequest", OWN),
                vec![binding(
                    "PATCH",
                    "/v1/{book.name=shelves/*/books/*}",
                    Some("book"),
                    vec![param("book.name", None)],
                )],
            ),
        ]);

        let out = render_with(&f, &Enums::default(), |_| {});
        let formatted = GoFormatter::new().format(&out).unwrap();
        assert_eq!(formatted, out);
    }

    #[test]
    fn test_invalid_path_template_is_a_render_error() {
        let f = file(vec![method(
            "Echo",
            message("EchoRequest", OWN),
            vec![binding("GET", "v1/echo", None, vec![])],
        )]);
        let enums = Enums::default();
        let p = params(&f, &[]);

        let err = GatewayTemplate::new(&enums).render(&p).unwrap_err();
        assert_eq!(err.message, "path template 'v1/echo' must start with '/'");
    }
}
