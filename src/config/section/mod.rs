//! Configuration section definitions.
//!
//! Each module corresponds to a section in `charlib.toml`:
//!
//! | Module    | TOML Section   | Purpose                               |
//! |-----------|----------------|---------------------------------------|
//! | `build`   | `[build]`      | Paths, svg, css, bundle, manifest     |
//! | `library` | `[library]`    | Library version and UMD global name   |

pub mod build;
mod library;

pub use build::{BuildSectionConfig, BundleConfig, CssConfig, ManifestConfig, ScopingMode, SvgConfig};
pub use library::LibraryInfoConfig;
