//! External bundler backend.
//!
//! Runs the configured command in the project root. `$CHARLIB_*` variables
//! are substituted in its arguments and exported to its environment, then
//! the bundle files expected for the mode are checked.

use anyhow::Result;

use super::{BundleError, BundleOutput, expected_bundles};
use crate::config::LibraryConfig;
use crate::core::{BuildMode, OutputDir};
use crate::log;
use crate::utils::exec::Cmd;

/// Variables available to the external command.
fn bundle_vars(config: &LibraryConfig, mode: BuildMode) -> Vec<(&'static str, String)> {
    vec![
        ("CHARLIB_ROOT", config.get_root().display().to_string()),
        ("CHARLIB_ENTRY", config.build.entry.display().to_string()),
        ("CHARLIB_OUTPUT_DIR", config.build.output.display().to_string()),
        ("CHARLIB_MODE", mode.name().to_owned()),
        ("CHARLIB_GLOBAL", config.library.global.clone()),
    ]
}

/// Substitute `$NAME` occurrences of each variable in every argument.
fn resolve_args(args: &[String], vars: &[(&'static str, String)]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            vars.iter().fold(arg.clone(), |arg, (key, value)| {
                arg.replace(&format!("${key}"), value)
            })
        })
        .collect()
}

pub fn run_external(config: &LibraryConfig, mode: BuildMode) -> Result<BundleOutput> {
    let vars = bundle_vars(config, mode);
    let command = resolve_args(&config.build.bundle.command, &vars);
    log!("bundle"; "running `{}`", command.join(" "));

    Cmd::from_slice(&command)
        .cwd(config.get_root())
        .envs(vars.iter().map(|(k, v)| (*k, v.as_str())))
        .run()?;

    let js_dir = OutputDir::Js.path(&config.build.output);
    let mut files = Vec::new();
    for name in expected_bundles(mode) {
        let path = js_dir.join(name);
        if !path.is_file() {
            return Err(BundleError::MissingOutput(config.root_relative(&path)).into());
        }
        files.push(path);
    }

    Ok(BundleOutput {
        files,
        ..BundleOutput::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_with(command: &[&str]) -> (TempDir, LibraryConfig) {
        let dir = TempDir::new().unwrap();
        let mut config = LibraryConfig::with_root(dir.path());
        config.build.bundle.command = command.iter().map(|s| s.to_string()).collect();
        (dir, config)
    }

    #[test]
    fn test_resolve_args() {
        let vars = vec![
            ("CHARLIB_OUTPUT_DIR", "/lib/dist".to_owned()),
            ("CHARLIB_MODE", "production".to_owned()),
        ];
        let args = vec!["--out=$CHARLIB_OUTPUT_DIR/js".to_owned(), "$CHARLIB_MODE".to_owned()];
        assert_eq!(resolve_args(&args, &vars), ["--out=/lib/dist/js", "production"]);
    }

    #[test]
    fn test_external_bundler_outputs_checked() {
        let (_dir, config) = config_with(&[
            "sh",
            "-c",
            "mkdir -p \"$CHARLIB_OUTPUT_DIR/js\" && cd \"$CHARLIB_OUTPUT_DIR/js\" && touch index.js index.esm.js index.umd.js",
        ]);

        let output = run_external(&config, BuildMode::DEVELOPMENT).unwrap();
        assert_eq!(output.files.len(), 3);

        let err = run_external(&config, BuildMode::PRODUCTION).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::MissingOutput(path)) if path.ends_with("index.min.js")
        ));
    }

    #[test]
    fn test_external_bundler_sees_environment() {
        let (dir, config) = config_with(&["sh", "-c", "printf %s \"$CHARLIB_GLOBAL\" > global.txt"]);

        // Outputs are missing, but the command itself ran in the root.
        assert!(run_external(&config, BuildMode::DEVELOPMENT).is_err());
        let global = fs::read_to_string(dir.path().join("global.txt")).unwrap();
        assert_eq!(global, "CharacterLibrary");
    }

    #[test]
    fn test_external_bundler_failure_is_fatal() {
        let (_dir, config) = config_with(&["false"]);
        let err = run_external(&config, BuildMode::DEVELOPMENT).unwrap_err();
        assert!(err.to_string().contains("`false` failed"));
    }
}
