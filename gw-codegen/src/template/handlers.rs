//! Request adapters, registration functions and route tables of one service.

use gwgen_core::to_pascal_case;
use gwgen_descriptor::{Binding, Method, PathParam, Service};

use super::{Pattern, Scope};
use crate::{builder::CodeBuilder, language::RenderError};

const INVALID_ARGUMENT: &str = "return nil, metadata, status.Errorf(codes.InvalidArgument, \"%v\", err)";

/// Transport a request adapter forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transport {
    /// A gRPC client connection.
    Client,
    /// An in-process server implementation.
    Server,
}

/// One HTTP binding together with its compiled path pattern.
struct Route<'s> {
    svc: &'s Service,
    method: &'s Method,
    binding: &'s Binding,
    pattern: Pattern,
}

impl Route<'_> {
    /// Suffix shared by every identifier generated for this route.
    fn id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.svc.name, self.method.name, self.binding.index
        )
    }

    fn full_method(&self, scope: &Scope<'_>) -> String {
        match scope.params.file.proto_package.as_str() {
            "" => format!("/{}/{}", self.svc.name, self.method.name),
            pkg => format!("/{}.{}/{}", pkg, self.svc.name, self.method.name),
        }
    }

    fn body_field(&self) -> Option<&str> {
        self.binding.body.as_deref().filter(|body| *body != "*")
    }

    /// Fields not bound by the path or body are read from the query string.
    fn reads_query(&self) -> bool {
        self.binding.body.as_deref() != Some("*")
    }
}

pub(super) fn write_service(
    scope: &Scope<'_>,
    svc: &Service,
    b: &mut CodeBuilder,
) -> Result<(), RenderError> {
    let mut routes = Vec::new();
    for method in &svc.methods {
        for binding in &method.bindings {
            routes.push(Route {
                svc,
                method,
                binding,
                pattern: Pattern::compile(&binding.path_template)?,
            });
        }
    }

    for route in &routes {
        if route.method.client_streaming {
            continue;
        }
        if route.reads_query() {
            write_filter(route, b);
        }
        write_request_func(scope, route, Transport::Client, b);
        if !route.method.server_streaming {
            write_request_func(scope, route, Transport::Server, b);
        }
    }

    write_register_server(scope, svc, &routes, b);
    write_register_client(scope, svc, &routes, b);
    write_route_tables(&routes, b);
    Ok(())
}

fn register_name(scope: &Scope<'_>, svc: &Service) -> String {
    format!("Register{}{}", svc.name, scope.params.register_func_suffix)
}

fn go_field_path(field_path: &str) -> String {
    field_path
        .split('.')
        .map(to_pascal_case)
        .collect::<Vec<_>>()
        .join(".")
}

fn go_string_seq(field_path: &str) -> String {
    let parts: Vec<String> = field_path.split('.').map(|p| format!("{p:?}")).collect();
    format!("{{{}}}", parts.join(", "))
}

/// Query parameters must not overwrite fields bound by the path or the body.
fn write_filter(route: &Route<'_>, b: &mut CodeBuilder) {
    let seqs: Vec<String> = route
        .body_field()
        .into_iter()
        .chain(route.binding.path_params.iter().map(|p| p.field_path.as_str()))
        .map(go_string_seq)
        .collect();

    b.push_blank().push_line(&format!(
        "var filter_{} = utilities.NewDoubleArray([][]string{{{}}})",
        route.id(),
        seqs.join(", ")
    ));
}

fn write_request_func(scope: &Scope<'_>, route: &Route<'_>, transport: Transport, b: &mut CodeBuilder) {
    let svc = &route.svc.name;
    let method = route.method;
    let (name, arg) = match transport {
        Transport::Client => (
            "request",
            format!("client {}", scope.qualify_own(&format!("{svc}Client"))),
        ),
        Transport::Server => (
            "local_request",
            format!("server {}", scope.qualify_own(&format!("{svc}Server"))),
        ),
    };
    let ret = if method.server_streaming {
        scope.qualify_own(&format!("{}_{}Client", svc, method.name))
    } else {
        "proto.Message".to_string()
    };

    let header = format!(
        "func {}_{}(ctx context.Context, marshaler runtime.Marshaler, {}, req *http.Request, pathParams map[string]string) ({}, runtime.ServerMetadata, error) {{",
        name,
        route.id(),
        arg,
        ret
    );

    b.push_blank().push_block(&header, "}", |b| {
        write_locals(scope, route, b);
        write_body_decode(scope, route, b);
        for param in &route.binding.path_params {
            write_path_param(scope, param, b);
        }
        if route.reads_query() {
            write_query_decode(route, b);
        }
        write_call(route, transport, b);
    });
}

fn write_locals(scope: &Scope<'_>, route: &Route<'_>, b: &mut CodeBuilder) {
    let request = &route.method.request_type;
    let params = &route.binding.path_params;
    let has_enum = params
        .iter()
        .any(|p| scope.lookup_enum(p.target.type_name()).is_some());

    b.push_block("var (", ")", |b| {
        b.push_line(&format!(
            "protoReq {}",
            scope.qualify(&request.go_package, &request.go_name)
        ))
        .push_line("metadata runtime.ServerMetadata");
        if !params.is_empty() {
            b.push_line("err error").push_line("val string").push_line("ok bool");
        }
        if has_enum {
            b.push_line("e int32");
        }
    });
}

fn write_body_decode(scope: &Scope<'_>, route: &Route<'_>, b: &mut CodeBuilder) {
    let Some(body) = route.binding.body.as_deref() else {
        return;
    };

    if body == "*" {
        b.push_block(
            "if err := marshaler.NewDecoder(req.Body).Decode(&protoReq); err != nil && !errors.Is(err, io.EOF) {",
            "}",
            |b| {
                b.push_line(INVALID_ARGUMENT);
            },
        );
        return;
    }

    let field = go_field_path(body);
    let patch = scope.params.allow_patch_feature && route.binding.http_method == "PATCH";
    if !patch {
        b.push_block(
            &format!(
                "if err := marshaler.NewDecoder(req.Body).Decode(&protoReq.{field}); err != nil && !errors.Is(err, io.EOF) {{"
            ),
            "}",
            |b| {
                b.push_line(INVALID_ARGUMENT);
            },
        );
        return;
    }

    b.push_line("newReader, berr := utilities.IOReaderFactory(req.Body)")
        .push_block("if berr != nil {", "}", |b| {
            b.push_line(
                "return nil, metadata, status.Errorf(codes.InvalidArgument, \"%v\", berr)",
            );
        })
        .push_block(
            &format!(
                "if err := marshaler.NewDecoder(newReader()).Decode(&protoReq.{field}); err != nil && !errors.Is(err, io.EOF) {{"
            ),
            "}",
            |b| {
                b.push_line(INVALID_ARGUMENT);
            },
        )
        .push_block(
            "if protoReq.UpdateMask == nil || len(protoReq.UpdateMask.GetPaths()) == 0 {",
            "}",
            |b| {
                b.push_line(&format!(
                    "if fieldMask, err := runtime.FieldMaskFromRequestBody(newReader(), protoReq.{field}); err != nil {{"
                ))
                .push_indent()
                .push_line(INVALID_ARGUMENT)
                .push_dedent()
                .push_block("} else {", "}", |b| {
                    b.push_line("protoReq.UpdateMask = fieldMask");
                });
            },
        );
}

fn write_path_param(scope: &Scope<'_>, param: &PathParam, b: &mut CodeBuilder) {
    let key = format!("{:?}", param.field_path);
    let mismatch = format!(
        "return nil, metadata, status.Errorf(codes.InvalidArgument, \"type mismatch, parameter: %s, error: %v\", {key}, err)"
    );

    b.push_line(&format!("val, ok = pathParams[{key}]"))
        .push_block("if !ok {", "}", |b| {
            b.push_line(&format!(
                "return nil, metadata, status.Errorf(codes.InvalidArgument, \"missing parameter %s\", {key})"
            ));
        });

    match scope.lookup_enum(param.target.type_name()) {
        Some(e) => {
            b.push_line(&format!(
                "e, err = runtime.Enum(val, {})",
                scope.qualify(&e.go_package, &format!("{}_value", e.go_name))
            ))
            .push_block("if err != nil {", "}", |b| {
                b.push_line(&mismatch);
            })
            .push_line(&format!(
                "protoReq.{} = {}(e)",
                go_field_path(&param.field_path),
                scope.qualify(&e.go_package, &e.go_name)
            ));
        }
        None => {
            b.push_line(&format!(
                "err = runtime.PopulateFieldFromPath(&protoReq, {key}, val)"
            ))
            .push_block("if err != nil {", "}", |b| {
                b.push_line(&mismatch);
            });
        }
    }
}

fn write_query_decode(route: &Route<'_>, b: &mut CodeBuilder) {
    b.push_block("if err := req.ParseForm(); err != nil {", "}", |b| {
        b.push_line(INVALID_ARGUMENT);
    })
    .push_block(
        &format!(
            "if err := runtime.PopulateQueryParameters(&protoReq, req.Form, filter_{}); err != nil {{",
            route.id()
        ),
        "}",
        |b| {
            b.push_line(INVALID_ARGUMENT);
        },
    );
}

fn write_call(route: &Route<'_>, transport: Transport, b: &mut CodeBuilder) {
    let name = &route.method.name;
    match transport {
        Transport::Server => {
            b.push_line(&format!("msg, err := server.{name}(ctx, &protoReq)"));
        }
        Transport::Client if route.method.server_streaming => {
            b.push_line(&format!("stream, err := client.{name}(ctx, &protoReq)"))
                .push_block("if err != nil {", "}", |b| {
                    b.push_line("return nil, metadata, err");
                })
                .push_line("header, err := stream.Header()")
                .push_block("if err != nil {", "}", |b| {
                    b.push_line("return nil, metadata, err");
                })
                .push_line("metadata.HeaderMD = header")
                .push_line("return stream, metadata, nil");
            return;
        }
        Transport::Client => {
            b.push_line(&format!(
                "msg, err := client.{name}(ctx, &protoReq, grpc.Header(&metadata.HeaderMD), grpc.Trailer(&metadata.TrailerMD))"
            ));
        }
    }
    b.push_line("return msg, metadata, err");
}

fn handle_header(route: &Route<'_>) -> String {
    format!(
        "mux.Handle({:?}, pattern_{}, func(w http.ResponseWriter, req *http.Request, pathParams map[string]string) {{",
        route.binding.http_method,
        route.id()
    )
}

fn root_context(scope: &Scope<'_>) -> &'static str {
    if scope.params.use_request_context {
        "req.Context()"
    } else {
        "context.Background()"
    }
}

fn write_unimplemented(message: &str, b: &mut CodeBuilder) {
    b.push_line(&format!(
        "err := status.Error(codes.Unimplemented, {message:?})"
    ))
    .push_line("_, outboundMarshaler := runtime.MarshalerForRequest(mux, req)")
    .push_line("runtime.HTTPError(ctx, mux, outboundMarshaler, w, req, err)")
    .push_line("return");
}

fn write_register_server(scope: &Scope<'_>, svc: &Service, routes: &[Route<'_>], b: &mut CodeBuilder) {
    let register = register_name(scope, svc);
    let header = format!(
        "func {}Server(ctx context.Context, mux *runtime.ServeMux, server {}) error {{",
        register,
        scope.qualify_own(&format!("{}Server", svc.name))
    );

    b.push_blank()
        .push_comment(&format!(
            "{register}Server registers the http handlers for service {} to \"mux\".",
            svc.name
        ))
        .push_comment(&format!("UnaryRPC     :call {}Server directly.", svc.name))
        .push_comment("StreamingRPC :currently unsupported pending https://github.com/grpc/grpc-go/issues/906.")
        .push_comment(&format!(
            "Note that using this registration option will cause many gRPC library features to stop working. Consider using {register}FromEndpoint instead."
        ))
        .push_block(&header, "}", |b| {
            for route in routes {
                b.push_block(&handle_header(route), "})", |b| {
                    if route.method.client_streaming || route.method.server_streaming {
                        write_unimplemented(
                            "streaming calls are not yet supported in the in-process transport",
                            b,
                        );
                        return;
                    }
                    write_server_handler(scope, route, b);
                });
            }
            b.push_line("return nil");
        });
}

fn write_server_handler(scope: &Scope<'_>, route: &Route<'_>, b: &mut CodeBuilder) {
    let id = route.id();
    b.push_line(&format!(
        "ctx, cancel := context.WithCancel({})",
        root_context(scope)
    ))
    .push_line("defer cancel()")
    .push_line("var stream runtime.ServerTransportStream")
    .push_line("ctx = grpc.NewContextWithServerTransportStream(ctx, &stream)")
    .push_line("inboundMarshaler, outboundMarshaler := runtime.MarshalerForRequest(mux, req)")
    .push_line(&format!(
        "annotatedContext, err := runtime.AnnotateIncomingContext(ctx, mux, req, {:?}, runtime.WithHTTPPathPattern({:?}))",
        route.full_method(scope),
        route.binding.path_template
    ))
    .push_block("if err != nil {", "}", |b| {
        b.push_line("runtime.HTTPError(ctx, mux, outboundMarshaler, w, req, err)")
            .push_line("return");
    })
    .push_line(&format!(
        "resp, md, err := local_request_{id}(annotatedContext, inboundMarshaler, server, req, pathParams)"
    ))
    .push_line("md.HeaderMD, md.TrailerMD = metadata.Join(md.HeaderMD, stream.Header()), metadata.Join(md.TrailerMD, stream.Trailer())")
    .push_line("annotatedContext = runtime.NewServerMetadataContext(annotatedContext, md)")
    .push_block("if err != nil {", "}", |b| {
        b.push_line("runtime.HTTPError(annotatedContext, mux, outboundMarshaler, w, req, err)")
            .push_line("return");
    })
    .push_line(&format!(
        "forward_{id}(annotatedContext, mux, outboundMarshaler, w, req, resp, mux.GetForwardResponseOptions()...)"
    ));
}

fn write_register_client(scope: &Scope<'_>, svc: &Service, routes: &[Route<'_>], b: &mut CodeBuilder) {
    let register = register_name(scope, svc);
    let client = format!("{}Client", svc.name);

    b.push_blank()
        .push_comment(&format!("{register}FromEndpoint is same as {register} but"))
        .push_comment("automatically dials to \"endpoint\" and closes the connection when \"ctx\" gets done.")
        .push_block(
            &format!(
                "func {register}FromEndpoint(ctx context.Context, mux *runtime.ServeMux, endpoint string, opts []grpc.DialOption) (err error) {{"
            ),
            "}",
            |b| {
                b.push_line("conn, err := grpc.NewClient(endpoint, opts...)")
                    .push_block("if err != nil {", "}", |b| {
                        b.push_line("return err");
                    })
                    .push_block("defer func() {", "}()", |b| {
                        b.push_block("if err != nil {", "}", |b| {
                            write_close_conn(b);
                            b.push_line("return");
                        })
                        .push_block("go func() {", "}()", |b| {
                            b.push_line("<-ctx.Done()");
                            write_close_conn(b);
                        });
                    })
                    .push_line(&format!("return {register}(ctx, mux, conn)"));
            },
        );

    b.push_blank()
        .push_comment(&format!(
            "{register} registers the http handlers for service {} to \"mux\".",
            svc.name
        ))
        .push_comment("The handlers forward requests to the grpc endpoint over \"conn\".")
        .push_block(
            &format!(
                "func {register}(ctx context.Context, mux *runtime.ServeMux, conn *grpc.ClientConn) error {{"
            ),
            "}",
            |b| {
                b.push_line(&format!(
                    "return {register}Client(ctx, mux, {}(conn))",
                    scope.qualify_own(&format!("New{client}"))
                ));
            },
        );

    b.push_blank()
        .push_comment(&format!(
            "{register}Client registers the http handlers for service {}",
            svc.name
        ))
        .push_comment(&format!(
            "to \"mux\". The handlers forward requests to the grpc endpoint over the given implementation of \"{client}\"."
        ))
        .push_block(
            &format!(
                "func {register}Client(ctx context.Context, mux *runtime.ServeMux, client {}) error {{",
                scope.qualify_own(&client)
            ),
            "}",
            |b| {
                for route in routes {
                    b.push_block(&handle_header(route), "})", |b| {
                        if route.method.client_streaming {
                            write_unimplemented(
                                "client streaming calls are not supported by this gateway",
                                b,
                            );
                            return;
                        }
                        write_client_handler(scope, route, b);
                    });
                }
                b.push_line("return nil");
            },
        );
}

fn write_close_conn(b: &mut CodeBuilder) {
    b.push_block("if cerr := conn.Close(); cerr != nil {", "}", |b| {
        b.push_line("grpclog.Errorf(\"Failed to close conn to %s: %v\", endpoint, cerr)");
    });
}

fn write_client_handler(scope: &Scope<'_>, route: &Route<'_>, b: &mut CodeBuilder) {
    let id = route.id();
    let resp = if route.method.server_streaming {
        "func() (proto.Message, error) { return resp.Recv() }"
    } else {
        "resp"
    };

    b.push_line(&format!(
        "ctx, cancel := context.WithCancel({})",
        root_context(scope)
    ))
    .push_line("defer cancel()")
    .push_line("inboundMarshaler, outboundMarshaler := runtime.MarshalerForRequest(mux, req)")
    .push_line(&format!(
        "annotatedContext, err := runtime.AnnotateContext(ctx, mux, req, {:?}, runtime.WithHTTPPathPattern({:?}))",
        route.full_method(scope),
        route.binding.path_template
    ))
    .push_block("if err != nil {", "}", |b| {
        b.push_line("runtime.HTTPError(ctx, mux, outboundMarshaler, w, req, err)")
            .push_line("return");
    })
    .push_line(&format!(
        "resp, md, err := request_{id}(annotatedContext, inboundMarshaler, client, req, pathParams)"
    ))
    .push_line("annotatedContext = runtime.NewServerMetadataContext(annotatedContext, md)")
    .push_block("if err != nil {", "}", |b| {
        b.push_line("runtime.HTTPError(annotatedContext, mux, outboundMarshaler, w, req, err)")
            .push_line("return");
    })
    .push_line(&format!(
        "forward_{id}(annotatedContext, mux, outboundMarshaler, w, req, {resp}, mux.GetForwardResponseOptions()...)"
    ));
}

fn write_route_tables(routes: &[Route<'_>], b: &mut CodeBuilder) {
    b.push_blank().push_block("var (", ")", |b| {
        for route in routes {
            b.push_line(&format!("pattern_{} = {}", route.id(), route.pattern.to_go()));
        }
    });

    b.push_blank().push_block("var (", ")", |b| {
        for route in routes.iter().filter(|r| !r.method.client_streaming) {
            let forward = if route.method.server_streaming {
                "runtime.ForwardResponseStream"
            } else {
                "runtime.ForwardResponseMessage"
            };
            b.push_line(&format!("forward_{} = {}", route.id(), forward));
        }
    });
}
