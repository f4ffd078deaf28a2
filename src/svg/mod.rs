//! SVG optimization for character sprites.
//!
//! One fixed profile, streamed through quick-xml:
//!
//! | Kept                         | Removed                                   |
//! |------------------------------|-------------------------------------------|
//! | elements, `id`, `viewBox`    | XML declaration, doctype                  |
//! | text inside `<text>` etc.    | comments, processing instructions         |
//! | CDATA, entity references     | `<metadata>` subtrees                     |
//! |                              | `inkscape:` / `sodipodi:` / `sketch:` data |
//! |                              | whitespace-only text between elements     |
//!
//! The root `<svg>` always ends up with `focusable="false"` and
//! `aria-hidden="true"`.

mod optimize;

pub use optimize::optimize_svg;

use thiserror::Error;

/// Reasons an SVG document is rejected.
#[derive(Debug, Error)]
pub enum SvgError {
    #[error("malformed XML at byte {position}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("malformed attribute")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("document has no root element")]
    NoRoot,

    #[error("root element is <{0}>, expected <svg>")]
    NotSvg(String),

    #[error("unexpected content after the root element")]
    TrailingContent,

    #[error("unclosed element <{0}>")]
    Unclosed(String),

    #[error("failed to write optimized SVG")]
    Io(#[from] std::io::Error),
}
