//! `[build.manifest]` section configuration.
//!
//! ```toml
//! [build.manifest]
//! file = "manifest.json"   # Written to the output root
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Manifest file name relative to the output root.
    pub file: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            file: "manifest.json".into(),
        }
    }
}

impl ManifestConfig {
    pub const FILE: FieldPath = FieldPath::new("build.manifest.file");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.file.trim().is_empty() {
            diag.error(Self::FILE, "must not be empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.manifest.file, "manifest.json");
    }

    #[test]
    fn test_empty_file_rejected() {
        let mut diag = ConfigDiagnostics::new();
        ManifestConfig { file: " ".into() }.validate(&mut diag);
        assert!(diag.has_errors());
    }
}
