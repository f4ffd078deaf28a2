//! `[build.css]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build.css]
//! scoping = "structured"                          # structured | legacy
//! scss = ["sass", "--stdin", "--no-source-map"]   # SCSS on stdin, CSS on stdout
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

/// Selector scoping strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopingMode {
    /// Rule-aware prefixing that leaves `@keyframes` and friends intact.
    #[default]
    Structured,
    /// Textual `([^{}]+){` substitution, byte-compatible with older builds.
    Legacy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CssConfig {
    /// Selector scoping strategy.
    pub scoping: ScopingMode,

    /// SCSS compiler command. Reads SCSS on stdin, writes CSS to stdout.
    pub scss: Vec<String>,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            scoping: ScopingMode::Structured,
            scss: vec!["sass".into(), "--stdin".into(), "--no-source-map".into()],
        }
    }
}

impl CssConfig {
    pub const SCSS: FieldPath = FieldPath::new("build.css.scss");

    /// Validate CSS configuration.
    ///
    /// A missing compiler is only a hint: it matters only once a character
    /// actually ships an `.scss` file.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let Some(cmd) = self.scss.first() else {
            diag.error(Self::SCSS, "must name a compiler command");
            return;
        };

        let is_package_runner = ["npx", "bunx", "pnpx", "yarn", "dlx"].contains(&cmd.as_str());
        if which::which(cmd).is_err() && !is_package_runner {
            diag.hint(
                Self::SCSS,
                format!("`{cmd}` not found, .scss stylesheets will fail to compile"),
            );
        }
    }
}
