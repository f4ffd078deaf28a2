//! Line-level source maps (revision 3).
//!
//! Every generated line that comes from a module body gets exactly one
//! token at column 0 pointing at the start of the original line. Wrapper
//! and runtime lines carry no token.

use oxc_sourcemap::SourceMapBuilder;

/// Original position of one generated line: `(source index, line)`.
pub type Origin = Option<(u32, u32)>;

/// Accumulates one origin per generated line.
pub struct LineMap {
    builder: SourceMapBuilder,
    line: u32,
}

impl LineMap {
    /// Map for generated file `file` over `sources`, given as
    /// `(path, content)` in source-index order.
    pub fn new<'a>(file: &str, sources: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut builder = SourceMapBuilder::default();
        builder.set_file(file);
        for (path, content) in sources {
            builder.set_source_and_content(path, content);
        }
        Self { builder, line: 0 }
    }

    pub fn push_line(&mut self, origin: Origin) {
        if let Some((source, line)) = origin {
            self.builder
                .add_token(self.line, 0, line, 0, Some(source), None);
        }
        self.line += 1;
    }

    pub fn into_json(self) -> String {
        self.builder.into_sourcemap().to_json_string()
    }
}
