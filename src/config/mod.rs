//! Library configuration management for `charlib.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build/     # [build] and sub-sections
//! │   └── library    # [library]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # LibraryConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section            | Purpose                                      |
//! |--------------------|----------------------------------------------|
//! | `[library]`        | Version stamp and UMD global name            |
//! | `[build]`          | Characters, entry and output paths           |
//! | `[build.svg]`      | SVG optimizer switches                       |
//! | `[build.css]`      | Scoping strategy and SCSS compiler           |
//! | `[build.bundle]`   | Builtin or external bundler, library CSS     |
//! | `[build.manifest]` | Manifest file name                           |
//!
//! The file is optional: without it every default applies and the current
//! directory is the project root.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    BuildSectionConfig, BundleConfig, CssConfig, LibraryInfoConfig, ManifestConfig, ScopingMode,
    SvgConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands},
    log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing charlib.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Absolute path to the config file, `None` when running on defaults
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Library identity
    #[serde(default)]
    pub library: LibraryInfoConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildSectionConfig,
}

impl LibraryConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. The project root is
    /// the config file's parent directory, or cwd when there is no file.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, root) = match find_config_file(&cli.config) {
            Some(path) => {
                let config = Self::from_path(&path)?;
                let root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                (
                    Self {
                        config_path: Some(normalize_path(&path)),
                        ..config
                    },
                    root,
                )
            }
            None => (Self::default(), cwd),
        };

        config.apply_cli(cli);
        config.finalize(&root);
        config.validate()?;
        Ok(config)
    }

    /// Default configuration rooted at `root` (no file, no validation).
    pub fn with_root(root: &Path) -> Self {
        let mut config = Self::default();
        config.finalize(root);
        config
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Apply command-line overrides.
    fn apply_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.build.output, cli.output.as_ref());
        Self::update_option(&mut self.build.characters, cli.characters.as_ref());

        if let Commands::Build { build_args } = cli.command() {
            self.build.clean = build_args.clean;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize all paths relative to the root directory.
    fn finalize(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.build.characters = normalize_path(&root.join(&self.build.characters));
        self.build.entry = normalize_path(&root.join(&self.build.entry));
        self.build.output = normalize_path(&root.join(&self.build.output));
        self.root = root;
    }

    // ========================================================================
    // accessors
    // ========================================================================

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Get path relative to the project root, for display
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Join a path with the output directory.
    pub fn output_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.build.output.join(path)
    }

    /// Absolute path of the manifest file.
    pub fn manifest_path(&self) -> PathBuf {
        self.output_join(&self.build.manifest.file)
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.library.validate(&mut diag);
        self.build.validate(&mut diag);

        diag.print_hints();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> LibraryConfig {
    let (parsed, ignored) = LibraryConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = LibraryConfig::from_str("[library\nversion = \"1\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_with_root_normalizes_paths() {
        let dir = TempDir::new().unwrap();
        let config = LibraryConfig::with_root(dir.path());
        let root = normalize_path(dir.path());

        assert_eq!(config.get_root(), root);
        assert_eq!(config.build.characters, root.join("characters"));
        assert_eq!(config.build.entry, root.join("src/index.js"));
        assert_eq!(config.build.output, root.join("dist"));
        assert_eq!(config.manifest_path(), root.join("dist/manifest.json"));
        assert_eq!(
            config.root_relative(root.join("dist/js/index.js")),
            PathBuf::from("dist/js/index.js")
        );
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[library]\nversion = \"2.0.0\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = LibraryConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.library.version, "2.0.0");
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[library]\nglobal = \"Chars\"\n[build.css]\nscoping = \"legacy\"";
        let (_, ignored) = LibraryConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_validate_reports_all_errors() {
        let dir = TempDir::new().unwrap();
        let mut config = LibraryConfig::with_root(dir.path());
        config.library.global = "1bad".into();
        config.build.bundle.css_file = String::new();

        let err = config.validate().unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics, got {err:?}");
        };
        assert_eq!(diag.errors().len(), 2);
    }
}
