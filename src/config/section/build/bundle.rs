//! `[build.bundle]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build.bundle]
//! command = ["npx", "rollup", "-c", "--environment", "NODE_ENV:$CHARLIB_MODE"]
//! css_file = "character-library.css"
//! ```
//!
//! An empty `command` selects the builtin packager. A non-empty one runs in
//! the project root with `$CHARLIB_ROOT`, `$CHARLIB_ENTRY`,
//! `$CHARLIB_OUTPUT_DIR`, `$CHARLIB_MODE` and `$CHARLIB_GLOBAL` available.

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// External bundler command (empty = builtin).
    pub command: Vec<String>,

    /// File name of the extracted library stylesheet under `css/`.
    pub css_file: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            css_file: "character-library.css".into(),
        }
    }
}

impl BundleConfig {
    pub const COMMAND: FieldPath = FieldPath::new("build.bundle.command");
    pub const CSS_FILE: FieldPath = FieldPath::new("build.bundle.css_file");

    /// Whether an external bundler replaces the builtin packager.
    pub fn is_external(&self) -> bool {
        !self.command.is_empty()
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.css_file.trim().is_empty() {
            diag.error(Self::CSS_FILE, "must not be empty");
        } else if self.css_file.contains(['/', '\\']) {
            diag.error_with_hint(
                Self::CSS_FILE,
                format!("`{}` must be a file name, not a path", self.css_file),
                "the stylesheet is always written to <output>/css/",
            );
        }

        if let Some(cmd) = self.command.first()
            && which::which(cmd).is_err()
        {
            diag.error_with_hint(
                Self::COMMAND,
                format!("`{cmd}` not found"),
                format!("install the command or clear {}", Self::COMMAND),
            );
        }
    }
}
