//! Tab-indented line buffer for emitting Go source.

/// Accumulates Go source one line at a time at the current indent depth.
///
/// Methods take `&mut self` and return it so calls chain inside loops and
/// nested blocks alike.
///
/// ```
/// use gwgen_codegen::builder::CodeBuilder;
///
/// let mut builder = CodeBuilder::new();
/// builder.push_block("var (", ")", |b| {
///     b.push_line("_ = runtime.String");
/// });
/// assert_eq!(builder.build(), "var (\n\t_ = runtime.String\n)\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CodeBuilder {
    depth: usize,
    buffer: String,
}

impl CodeBuilder {
    /// Create an empty builder at depth zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `s` at the current depth.
    pub fn push_line(&mut self, s: &str) -> &mut Self {
        self.write_tabs();
        self.buffer.push_str(s);
        self.buffer.push('\n');
        self
    }

    /// Append an empty line. Never indented.
    pub fn push_blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    pub fn push_indent(&mut self) -> &mut Self {
        self.depth += 1;
        self
    }

    /// Step one level out; stays at zero.
    pub fn push_dedent(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self
    }

    /// Append `// text` at the current depth.
    pub fn push_comment(&mut self, text: &str) -> &mut Self {
        self.write_tabs();
        self.buffer.push_str("// ");
        self.buffer.push_str(text);
        self.buffer.push('\n');
        self
    }

    /// Append `open`, the lines written by `body` one level deeper, then `close`.
    pub fn push_block<F>(&mut self, open: &str, close: &str, body: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        self.push_line(open).push_indent();
        body(&mut *self);
        self.push_dedent().push_line(close)
    }

    /// Take the accumulated source.
    pub fn build(self) -> String {
        self.buffer
    }

    fn write_tabs(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push('\t');
        }
    }
}
