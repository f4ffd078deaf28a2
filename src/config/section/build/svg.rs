//! `[build.svg]` section configuration.
//!
//! Switches for the removals the SVG optimizer performs. `id`, `viewBox`
//! and the accessibility attributes on the root are not configurable.
//!
//! # Example
//!
//! ```toml
//! [build.svg]
//! strip_comments = true      # Drop <!-- --> comments
//! strip_metadata = true      # Drop <metadata> subtrees
//! strip_editor_data = true   # Drop inkscape:/sodipodi:/sketch: markup
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgConfig {
    /// Remove comments and processing instructions.
    pub strip_comments: bool,

    /// Remove `<metadata>` elements with their content.
    pub strip_metadata: bool,

    /// Remove editor-namespaced elements, attributes and namespace declarations.
    pub strip_editor_data: bool,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            strip_comments: true,
            strip_metadata: true,
            strip_editor_data: true,
        }
    }
}
