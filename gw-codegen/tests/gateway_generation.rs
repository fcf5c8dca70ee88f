//! End-to-end generation from a descriptor request with the default template.

use gwgen_codegen::{
    Error, Generator, GeneratorOptions, format::GoFormatter, language::SourceFormatter,
};
use gwgen_descriptor::{Registry, ResponseFile};

const REQUEST: &str = r#"{
    "files_to_generate": ["bar/svc.proto", "bar/types.proto"],
    "files": [
        {
            "name": "common/kind.proto",
            "package": "example.common",
            "go_package": "example.com/foo/common;commonpb",
            "messages": ["Page"],
            "enums": ["Kind"]
        },
        {
            "name": "bar/types.proto",
            "package": "example.bar",
            "go_package": "example.com/foo/bar",
            "messages": ["ListRequest", "ListResponse", "Book", "UpdateBookRequest"]
        },
        {
            "name": "bar/svc.proto",
            "package": "example.bar",
            "go_package": "example.com/foo/bar",
            "services": [{
                "name": "LibraryService",
                "methods": [
                    {
                        "name": "ListBooks",
                        "request_type": "ListRequest",
                        "response_type": "ListResponse",
                        "bindings": [
                            {
                                "method": "get",
                                "pattern": "/v1/books/{kind}",
                                "path_params": [{"field_path": "kind", "type_name": ".example.common.Kind"}]
                            },
                            {
                                "method": "get",
                                "pattern": "/v1/shelves/{kind}/books",
                                "path_params": [{"field_path": "kind", "type_name": ".example.common.Kind"}]
                            }
                        ]
                    },
                    {
                        "name": "UpdateBook",
                        "request_type": "UpdateBookRequest",
                        "response_type": "Book",
                        "bindings": [{
                            "method": "patch",
                            "pattern": "/v1/{book.name=books/*}",
                            "body": "book",
                            "path_params": [{"field_path": "book.name"}]
                        }]
                    },
                    {
                        "name": "Page",
                        "request_type": ".example.common.Page",
                        "response_type": "Book"
                    }
                ]
            }]
        }
    ]
}"#;

fn generate(parameter: &str) -> gwgen_codegen::Result<Vec<ResponseFile>> {
    let registry: Registry = REQUEST.parse().expect("request should parse");
    let mut options = GeneratorOptions::default();
    options.apply_parameter(parameter)?;
    let generator = Generator::from_registry(&registry, options)?;
    generator.generate(registry.targets())
}

fn import_block(content: &str) -> &str {
    let start = content.find("import (").expect("import block");
    let end = content[start..].find("\n)\n").expect("import block end");
    &content[start..start + end]
}

#[test]
fn test_only_files_with_bindings_are_generated() {
    let files = generate("").unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "example.com/foo/bar/svc.pb.gw.go");
    assert_eq!(files[0].go_package.path, "example.com/foo/bar");
}

#[test]
fn test_module_prefix() {
    let files = generate("module=example.com/foo").unwrap();
    assert_eq!(files[0].name, "bar/svc.pb.gw.go");
}

#[test]
fn test_source_relative() {
    let files = generate("paths=source_relative").unwrap();
    assert_eq!(files[0].name, "bar/svc.pb.gw.go");
}

#[test]
fn test_module_mismatch_fails_the_batch() {
    let err = generate("module=example.com/other").unwrap_err();
    match err {
        Error::ResolvePath { file, code, .. } => {
            assert_eq!(file, "bar/svc.proto");
            assert!(code.inner().starts_with("// Code generated by gwgen. DO NOT EDIT.\n"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_module_with_source_relative_is_rejected() {
    let err = generate("paths=source_relative,module=example.com/foo").unwrap_err();
    assert!(matches!(err, Error::ModuleWithPaths { .. }));
}

#[test]
fn test_unknown_path_type_is_rejected() {
    let err = generate("paths=nested").unwrap_err();
    assert!(matches!(err, Error::UnknownPathType { ref value } if value == "nested"));
}

#[test]
fn test_imports() {
    let files = generate("").unwrap();
    let imports = import_block(&files[0].content);

    assert_eq!(imports.matches("\"example.com/foo/common\"").count(), 1);
    assert!(!imports.contains("\"example.com/foo/bar\""));
    assert!(imports.starts_with("import (\n\t\"context\"\n\t\"errors\"\n\t\"io\"\n\t\"net/http\"\n"));
}

#[test]
fn test_standalone_imports_own_package() {
    let files = generate("standalone=true").unwrap();
    let imports = import_block(&files[0].content);

    assert!(imports.contains("\textBar \"example.com/foo/bar\""));
    assert!(files[0].content.contains("protoReq extBar.ListRequest"));
}

#[test]
fn test_enum_path_params_use_enum_package() {
    let files = generate("").unwrap();
    let content = &files[0].content;

    assert!(content.contains("e, err = runtime.Enum(val, commonpb.Kind_value)"));
    assert!(content.contains("protoReq.Kind = commonpb.Kind(e)"));
}

#[test]
fn test_output_is_normalized() {
    for parameter in ["", "standalone", "request_context=false,allow_patch_feature=false"] {
        let files = generate(parameter).unwrap();
        let content = &files[0].content;
        assert_eq!(&GoFormatter::new().format(content).unwrap(), content);
    }
}

#[test]
fn test_generation_is_deterministic() {
    let first = generate("").unwrap();
    for _ in 0..5 {
        assert_eq!(generate("").unwrap(), first);
    }
}

const SHADOWING_REQUEST: &str = r#"{
    "files_to_generate": ["svc/svc.proto"],
    "files": [
        {
            "name": "api/http/types.proto",
            "package": "example.http",
            "go_package": "example.com/api/http",
            "messages": ["Req", "Reply"]
        },
        {
            "name": "svc/svc.proto",
            "package": "example.svc",
            "go_package": "example.com/api/svc",
            "services": [{
                "name": "CallService",
                "methods": [{
                    "name": "Call",
                    "request_type": ".example.http.Req",
                    "response_type": ".example.http.Reply",
                    "bindings": [{"method": "get", "pattern": "/v1/call"}]
                }]
            }]
        }
    ]
}"#;

#[test]
fn test_package_named_like_base_import_is_aliased() {
    let registry: Registry = SHADOWING_REQUEST.parse().expect("request should parse");
    let generator = Generator::from_registry(&registry, GeneratorOptions::default()).unwrap();
    let files = generator.generate(registry.targets()).unwrap();
    let content = &files[0].content;
    let imports = import_block(content);

    assert!(imports.contains("\t\"net/http\"\n"));
    assert!(imports.contains("\thttp_1 \"example.com/api/http\""));
    assert!(!imports.contains("\t\"example.com/api/http\""));
    assert!(content.contains("protoReq http_1.Req"));
    assert!(content.contains("req *http.Request"));
}
