//! `[build]` section configuration.
//!
//! Contains build paths and the per-stage sub-configurations.
//!
//! # Example
//!
//! ```toml
//! [build]
//! characters = "characters"   # Character tree: <characters>/<type>/<name>/
//! entry = "src/index.js"      # Library entry script
//! output = "dist"             # Output root for every artifact
//!
//! [build.svg]
//! strip_comments = true
//!
//! [build.css]
//! scoping = "structured"      # structured | legacy
//!
//! [build.bundle]
//! command = []                # empty = builtin packager
//!
//! [build.manifest]
//! file = "manifest.json"
//! ```
//!
//! See submodules for detailed options: [`svg`], [`css`], [`bundle`], [`manifest`].

mod bundle;
mod css;
mod manifest;
mod svg;

pub use bundle::BundleConfig;
pub use css::{CssConfig, ScopingMode};
pub use manifest::ManifestConfig;
pub use svg::SvgConfig;

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Characters source directory.
    pub characters: PathBuf,

    /// Library entry script.
    pub entry: PathBuf,

    /// Build output directory.
    pub output: PathBuf,

    /// Clean output directory before building (CLI only).
    #[serde(skip)]
    pub clean: bool,

    /// SVG optimization settings.
    pub svg: SvgConfig,

    /// Stylesheet compilation and scoping settings.
    pub css: CssConfig,

    /// Bundle backend settings.
    pub bundle: BundleConfig,

    /// Manifest settings.
    pub manifest: ManifestConfig,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            characters: "characters".into(),
            entry: "src/index.js".into(),
            output: "dist".into(),
            clean: false,
            svg: SvgConfig::default(),
            css: CssConfig::default(),
            bundle: BundleConfig::default(),
            manifest: ManifestConfig::default(),
        }
    }
}

impl BuildSectionConfig {
    pub const CHARACTERS: FieldPath = FieldPath::new("build.characters");
    pub const ENTRY: FieldPath = FieldPath::new("build.entry");

    /// Validate build configuration.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.characters.is_dir() {
            diag.hint(
                Self::CHARACTERS,
                format!(
                    "directory '{}' not found, no characters will be processed",
                    self.characters.display()
                ),
            );
        }

        // The builtin packager only understands JavaScript modules
        if !self.bundle.is_external() {
            let is_js = self
                .entry
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| matches!(e, "js" | "mjs"));
            if !is_js {
                diag.error_with_hint(
                    Self::ENTRY,
                    format!("`{}` is not a .js or .mjs file", self.entry.display()),
                    format!(
                        "point the entry at a JavaScript module or configure {}",
                        BundleConfig::COMMAND
                    ),
                );
            }
        }

        self.css.validate(diag);
        self.bundle.validate(diag);
        self.manifest.validate(diag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.characters, PathBuf::from("characters"));
        assert_eq!(config.build.entry, PathBuf::from("src/index.js"));
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert!(!config.build.clean);
    }

    #[test]
    fn test_custom_paths() {
        let config = test_parse_config(
            r#"
[build]
characters = "assets/characters"
entry = "lib/main.mjs"
output = "public"
"#,
        );
        assert_eq!(config.build.characters, PathBuf::from("assets/characters"));
        assert_eq!(config.build.entry, PathBuf::from("lib/main.mjs"));
        assert_eq!(config.build.output, PathBuf::from("public"));
    }

    #[test]
    fn test_entry_must_be_js_for_builtin() {
        let build = BuildSectionConfig {
            entry: "src/index.ts".into(),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        build.validate(&mut diag);
        assert!(
            diag.errors()
                .iter()
                .any(|e| e.field == BuildSectionConfig::ENTRY)
        );

        // An external bundler may take any entry
        let build = BuildSectionConfig {
            entry: "src/index.ts".into(),
            bundle: BundleConfig {
                command: vec!["rollup".into()],
                ..Default::default()
            },
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        build.validate(&mut diag);
        assert!(
            !diag
                .errors()
                .iter()
                .any(|e| e.field == BuildSectionConfig::ENTRY)
        );
    }
}
