//! Library bundle builder.
//!
//! The builtin backend packages the entry script and its relative imports
//! into a module registry and wraps it as CommonJS, ES module and UMD
//! bundles (plus a minified UMD in production), each with a source map.
//! Stylesheets imported from scripts become the library stylesheet.
//!
//! A non-empty `[build.bundle] command` replaces the builtin backend.

mod emit;
mod external;
mod graph;
mod ident;
mod sourcemap;

pub use ident::is_valid_identifier;

use std::path::PathBuf;

use anyhow::Result;
use thiserror::Error;

use crate::config::LibraryConfig;
use crate::core::BuildMode;
use crate::debug;
use emit::{CJS_FILE, ESM_FILE, MIN_FILE, UMD_FILE};
use graph::ModuleGraph;

/// Bundling failures with a dedicated message.
///
/// Paths are relative to the project root.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("entry script not found: {0}")]
    MissingEntry(PathBuf),

    #[error("failed to parse {path}:\n{message}")]
    Parse { path: PathBuf, message: String },

    #[error("cannot resolve `{specifier}` imported from {importer}")]
    Unresolved { specifier: String, importer: PathBuf },

    #[error(
        "package import `{specifier}` in {importer} needs an external bundler (set [build.bundle] command)"
    )]
    BareImport { specifier: String, importer: PathBuf },

    #[error("stylesheet `{specifier}` in {importer} can only be imported for side effects")]
    StylesheetBinding { specifier: String, importer: PathBuf },

    #[error("bundler did not produce {0}")]
    MissingOutput(PathBuf),
}

/// What the bundle step wrote.
#[derive(Debug, Default)]
pub struct BundleOutput {
    /// Every file written, bundles and maps included.
    pub files: Vec<PathBuf>,
    /// Modules packaged (builtin backend only).
    pub modules: usize,
    /// Stylesheets merged into the library stylesheet (builtin backend only).
    pub stylesheets: usize,
}

/// Bundle file names produced for `mode`.
pub fn expected_bundles(mode: BuildMode) -> Vec<&'static str> {
    let mut files = vec![CJS_FILE, ESM_FILE, UMD_FILE];
    if mode.is_production() {
        files.push(MIN_FILE);
    }
    files
}

/// Build the library bundles into `{output}/js`.
///
/// With the builtin backend every input is parsed and every artifact is
/// rendered before the first file is written.
pub fn build_bundle(config: &LibraryConfig, mode: BuildMode) -> Result<BundleOutput> {
    let entry = &config.build.entry;
    if !entry.is_file() {
        return Err(BundleError::MissingEntry(config.root_relative(entry)).into());
    }

    if config.build.bundle.is_external() {
        return external::run_external(config, mode);
    }

    let graph = ModuleGraph::build(entry, config.get_root())?;
    debug!("bundle"; "{} modules from {}", graph.modules.len(), graph.entry_id());

    let mut artifacts = emit::render_bundles(&graph, config, mode)?;
    if let Some(css) = emit::render_library_css(&graph, config, mode)? {
        artifacts.push(css);
    }
    emit::write_artifacts(&artifacts)?;

    Ok(BundleOutput {
        files: artifacts.into_iter().map(|(path, _)| path).collect(),
        modules: graph.modules.len(),
        stylesheets: graph.stylesheets.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_expected_bundles() {
        assert_eq!(
            expected_bundles(BuildMode::DEVELOPMENT),
            ["index.js", "index.esm.js", "index.umd.js"]
        );
        assert_eq!(expected_bundles(BuildMode::PRODUCTION).len(), 4);
    }

    #[test]
    fn test_missing_entry_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = LibraryConfig::with_root(dir.path());

        let err = build_bundle(&config, BuildMode::DEVELOPMENT).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::MissingEntry(path)) if path.ends_with("src/index.js")
        ));
    }

    #[test]
    fn test_parse_error_writes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/index.js"), "export const = ;\n").unwrap();
        let config = LibraryConfig::with_root(dir.path());

        assert!(build_bundle(&config, BuildMode::DEVELOPMENT).is_err());
        assert!(!dir.path().join("dist/js").exists());
    }

    #[test]
    fn test_build_bundle_writes_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(
            dir.path().join("src/index.js"),
            "import './library.css';\nexport const ready = true;\n",
        )
        .unwrap();
        fs::write(dir.path().join("src/library.css"), ".lib { display: block; }\n").unwrap();
        let config = LibraryConfig::with_root(dir.path());

        let output = build_bundle(&config, BuildMode::DEVELOPMENT).unwrap();
        assert_eq!(output.modules, 1);
        assert_eq!(output.stylesheets, 1);
        for path in &output.files {
            assert!(path.is_file(), "{}", path.display());
        }
        assert!(dir.path().join("dist/css/character-library.css").is_file());
        assert!(dir.path().join("dist/types/index.d.ts").is_file());
    }
}
