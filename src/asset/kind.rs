use std::path::Path;

/// Stylesheet source language, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylesheetKind {
    Css,
    Scss,
}

impl StylesheetKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "css" => Some(Self::Css),
            "scss" => Some(Self::Scss),
            _ => None,
        }
    }

    /// Whether the source needs the external compiler first.
    pub const fn needs_compile(self) -> bool {
        matches!(self, Self::Scss)
    }
}
