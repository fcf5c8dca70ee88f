//! Shared utility functions for code generation.

/// Convert a string to PascalCase (e.g., "hello_world" -> "HelloWorld")
///
/// Matches the Go field naming protoc-gen-go applies to protobuf field
/// names, so `display_name` becomes `DisplayName`.
pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Derive a valid Go package identifier from the last element of an import path
/// (e.g., "example.com/foo/echo-api" -> "echo_api").
pub fn go_identifier(import_path: &str) -> String {
    let last = import_path.rsplit('/').next().unwrap_or_default();
    let mut ident: String = last
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if ident.chars().next().is_none_or(|c| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("name"), "Name");
        assert_eq!(to_pascal_case("display_name"), "DisplayName");
        assert_eq!(to_pascal_case("foo_bar_baz"), "FooBarBaz");
        assert_eq!(to_pascal_case("hElLo"), "HElLo");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_go_identifier() {
        assert_eq!(go_identifier("example.com/foo/bar"), "bar");
        assert_eq!(go_identifier("example.com/foo/echo-api"), "echo_api");
        assert_eq!(go_identifier("example.com/v2.1"), "v2_1");
        assert_eq!(go_identifier("example.com/3d"), "_3d");
        assert_eq!(go_identifier(""), "_");
    }
}
