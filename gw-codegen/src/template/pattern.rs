//! Compilation of HTTP path templates into gateway runtime op codes.
//!
//! The generated code builds its route patterns with
//! `runtime.NewPattern(version, ops, pool, verb)`. Literals and variable
//! names share one string pool, deduplicated in order of first appearance.

use crate::language::RenderError;

/// Op code layout version understood by the runtime.
pub const OP_CODE_VERSION: u32 = 1;

const OP_PUSH: u32 = 1;
const OP_LIT_PUSH: u32 = 2;
const OP_PUSH_M: u32 = 3;
const OP_CONCAT_N: u32 = 4;
const OP_CAPTURE: u32 = 5;

/// A compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// Op code and operand pairs.
    pub ops: Vec<u32>,
    /// Literal and variable name pool.
    pub pool: Vec<String>,
    /// Custom verb after the final `:`, or empty.
    pub verb: String,
}

impl Pattern {
    /// Compile a template such as `/v1/{name=shelves/*}/books:search`.
    pub fn compile(template: &str) -> Result<Self, RenderError> {
        let Some(path) = template.strip_prefix('/') else {
            return Err(RenderError::new(format!(
                "path template '{template}' must start with '/'"
            )));
        };

        let (path, verb) = split_verb(path);
        let mut pattern = Self {
            ops: Vec::new(),
            pool: Vec::new(),
            verb: verb.to_string(),
        };

        for segment in split_segments(path, template)? {
            match segment.strip_prefix('{') {
                Some(var) => {
                    let var = var.strip_suffix('}').unwrap_or(var);
                    let (name, sub) = var.split_once('=').unwrap_or((var, "*"));
                    if sub.contains('{') {
                        return Err(RenderError::new(format!(
                            "nested variable in path template '{template}'"
                        )));
                    }
                    let parts: Vec<&str> = sub.split('/').collect();
                    for part in &parts {
                        pattern.push_segment(part, template)?;
                    }
                    let name = pattern.intern(name);
                    pattern.ops.extend([OP_CONCAT_N, parts.len() as u32]);
                    pattern.ops.extend([OP_CAPTURE, name]);
                }
                None => pattern.push_segment(segment, template)?,
            }
        }
        Ok(pattern)
    }

    fn push_segment(&mut self, segment: &str, template: &str) -> Result<(), RenderError> {
        match segment {
            "" => {
                return Err(RenderError::new(format!(
                    "empty segment in path template '{template}'"
                )));
            }
            "*" => self.ops.extend([OP_PUSH, 0]),
            "**" => self.ops.extend([OP_PUSH_M, 0]),
            lit => {
                let idx = self.intern(lit);
                self.ops.extend([OP_LIT_PUSH, idx]);
            }
        }
        Ok(())
    }

    fn intern(&mut self, s: &str) -> u32 {
        let idx = match self.pool.iter().position(|p| p == s) {
            Some(idx) => idx,
            None => {
                self.pool.push(s.to_string());
                self.pool.len() - 1
            }
        };
        idx as u32
    }

    /// Go expression constructing this pattern.
    pub fn to_go(&self) -> String {
        let ops = self
            .ops
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let pool = self
            .pool
            .iter()
            .map(|s| format!("{s:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "runtime.MustPattern(runtime.NewPattern({}, []int{{{}}}, []string{{{}}}, {:?}))",
            OP_CODE_VERSION, ops, pool, self.verb
        )
    }
}

/// Split a trailing `:verb` off the last segment, outside of any variable.
fn split_verb(path: &str) -> (&str, &str) {
    let tail_start = path.rfind(['/', '}']).map_or(0, |i| i + 1);
    match path[tail_start..].rfind(':') {
        Some(i) => (&path[..tail_start + i], &path[tail_start + i + 1..]),
        None => (path, ""),
    }
}

/// Split on `/` outside of braces.
fn split_segments<'a>(path: &'a str, template: &str) -> Result<Vec<&'a str>, RenderError> {
    let mut segments = Vec::new();
    if path.is_empty() {
        return Ok(segments);
    }
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in path.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => {
                return Err(RenderError::new(format!(
                    "unbalanced '}}' in path template '{template}'"
                )));
            }
            '}' => depth -= 1,
            '/' if depth == 0 => {
                segments.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(RenderError::new(format!(
            "unclosed '{{' in path template '{template}'"
        )));
    }
    segments.push(&path[start..]);
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_and_variable() {
        let pattern = Pattern::compile("/v1/{name}").unwrap();
        assert_eq!(pattern.ops, vec![2, 0, 1, 0, 4, 1, 5, 1]);
        assert_eq!(pattern.pool, vec!["v1", "name"]);
        assert_eq!(pattern.verb, "");
    }

    #[test]
    fn test_variable_with_sub_pattern() {
        let pattern = Pattern::compile("/v1/{name=shelves/*/books/**}").unwrap();
        assert_eq!(
            pattern.ops,
            vec![2, 0, 2, 1, 1, 0, 2, 2, 3, 0, 4, 4, 5, 3]
        );
        assert_eq!(pattern.pool, vec!["v1", "shelves", "books", "name"]);
    }

    #[test]
    fn test_custom_verb() {
        let pattern = Pattern::compile("/v1/{name}:cancel").unwrap();
        assert_eq!(pattern.verb, "cancel");
        assert_eq!(pattern.pool, vec!["v1", "name"]);

        let pattern = Pattern::compile("/v1/operations:batchGet").unwrap();
        assert_eq!(pattern.verb, "batchGet");
        assert_eq!(pattern.pool, vec!["v1", "operations"]);
    }

    #[test]
    fn test_pool_is_deduplicated() {
        let pattern = Pattern::compile("/a/{a}/a").unwrap();
        assert_eq!(pattern.pool, vec!["a"]);
        assert_eq!(pattern.ops, vec![2, 0, 1, 0, 4, 1, 5, 0, 2, 0]);
    }

    #[test]
    fn test_to_go() {
        let pattern = Pattern::compile("/v1/echo/{id}").unwrap();
        insta::assert_snapshot!(pattern.to_go(), @r#"runtime.MustPattern(runtime.NewPattern(1, []int{2, 0, 2, 1, 1, 0, 4, 1, 5, 2}, []string{"v1", "echo", "id"}, ""))"#);
    }

    #[test]
    fn test_root() {
        let pattern = Pattern::compile("/").unwrap();
        assert!(pattern.ops.is_empty());
        assert!(pattern.pool.is_empty());
    }

    #[test]
    fn test_invalid_templates() {
        assert!(Pattern::compile("v1/echo").is_err());
        assert!(Pattern::compile("/v1//echo").is_err());
        assert!(Pattern::compile("/v1/{name").is_err());
        assert!(Pattern::compile("/v1/name}").is_err());
        assert!(Pattern::compile("/v1/{a={b}}").is_err());
    }
}
