//! `[library]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [library]
//! version = "1.0.0"            # Stamped into metadata and the manifest
//! global = "CharacterLibrary"  # Global name of the UMD bundle
//! ```

use crate::bundle::is_valid_identifier;
use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryInfoConfig {
    /// Library version (`processed.version` and manifest `version`).
    pub version: String,

    /// Global variable the UMD bundle assigns when no module system exists.
    pub global: String,
}

impl Default for LibraryInfoConfig {
    fn default() -> Self {
        Self {
            version: "1.0.0".into(),
            global: "CharacterLibrary".into(),
        }
    }
}

impl LibraryInfoConfig {
    pub const VERSION: FieldPath = FieldPath::new("library.version");
    pub const GLOBAL: FieldPath = FieldPath::new("library.global");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.version.trim().is_empty() {
            diag.error(Self::VERSION, "must not be empty");
        }

        if self.global.is_empty() {
            diag.error(Self::GLOBAL, "must not be empty");
        } else if !is_valid_identifier(&self.global) {
            diag.error_with_hint(
                Self::GLOBAL,
                format!("`{}` is not a valid JavaScript identifier", self.global),
                "use letters, digits, `_` or `$`, not starting with a digit",
            );
        }
    }
}
