//! Output artifact tree layout.

use std::path::{Path, PathBuf};

/// Subdirectories of the output root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDir {
    /// Scoped per-character stylesheets and the library stylesheet.
    Css,
    /// Bundles, source maps and enriched metadata.
    Js,
    /// Optimized SVG sprites.
    Svg,
    /// Type declarations.
    Types,
}

impl OutputDir {
    pub const ALL: [Self; 4] = [Self::Css, Self::Js, Self::Svg, Self::Types];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
            Self::Svg => "svg",
            Self::Types => "types",
        }
    }

    /// This directory under `output_root`.
    pub fn path(self, output_root: &Path) -> PathBuf {
        output_root.join(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let root = Path::new("/lib/dist");
        let dirs: Vec<_> = OutputDir::ALL.iter().map(|d| d.path(root)).collect();
        assert_eq!(
            dirs,
            [
                PathBuf::from("/lib/dist/css"),
                PathBuf::from("/lib/dist/js"),
                PathBuf::from("/lib/dist/svg"),
                PathBuf::from("/lib/dist/types"),
            ]
        );
    }
}
