//! Library build orchestration.
//!
//! Build pipeline phases:
//! - **Prepare** - Optional clean, output tree, stale manifest removal
//! - **Characters** - Scan, then optimize SVGs, scope CSS, enrich metadata
//! - **Bundle** - Package the entry script and library stylesheet
//! - **Manifest** - Aggregate metadata into `manifest.json`
//!
//! The first error aborts the build. Files written before it stay on disk,
//! but a manifest is only ever written by a build that got that far.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crate::{
    asset::{
        CharacterAssetSet, CharacterDir, check_artifact_names, process_character, scan_characters,
    },
    bundle::{BundleOutput, build_bundle},
    config::LibraryConfig,
    core::{BuildMode, BuildStamp, OutputDir},
    log,
    logger::ProgressLine,
    manifest::{generate_manifest, write_manifest},
    utils::plural_count,
};

/// Summary of a finished build.
#[derive(Debug)]
pub struct BuildReport {
    pub characters: usize,
    pub svgs: usize,
    pub stylesheets: usize,
    /// Characters with enriched metadata.
    pub metadata: usize,
    pub bundle: BundleOutput,
    pub manifest: PathBuf,
    /// Character records in the manifest.
    pub manifest_characters: usize,
}

/// Build the whole library into the output directory.
///
/// Pipeline: prepare -> characters -> bundle -> manifest
pub fn build_library(config: &LibraryConfig, mode: BuildMode) -> Result<BuildReport> {
    let stamp = BuildStamp::now(&config.library.version);
    log!("build"; "{} build, version {}", mode.name(), stamp.version);

    prepare_output(config)?;

    let sets = collect_characters(config)?;
    check_artifact_names(&sets, config)?;
    let mut report = process_characters(&sets, config, &stamp)?;

    report.bundle = build_bundle(config, mode)?;
    log!("bundle"; "{}", describe_bundle(&report.bundle));

    let manifest = generate_manifest(config, &stamp)?;
    report.manifest = write_manifest(&manifest, config)?;
    report.manifest_characters = manifest.characters.len();
    log!(
        "manifest";
        "{} -> {}",
        plural_count(report.manifest_characters, "character"),
        config.root_relative(&report.manifest).display()
    );

    log!("build"; "done");
    Ok(report)
}

/// Clean (when requested), create the output tree and drop a stale manifest.
fn prepare_output(config: &LibraryConfig) -> Result<()> {
    let output = &config.build.output;

    if config.build.clean && output.exists() {
        if config.get_root().starts_with(output) {
            bail!(
                "refusing to clean {}: it contains the project root",
                output.display()
            );
        }
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
    }

    for dir in OutputDir::ALL {
        let path = dir.path(output);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
    }

    let manifest = config.manifest_path();
    if manifest.is_file() {
        fs::remove_file(&manifest)
            .with_context(|| format!("Failed to remove stale {}", manifest.display()))?;
    }
    Ok(())
}

/// Scan the characters tree and list every character's assets.
fn collect_characters(config: &LibraryConfig) -> Result<Vec<CharacterAssetSet>> {
    if !config.build.characters.is_dir() {
        log!(
            "warning";
            "characters directory {} not found",
            config.root_relative(&config.build.characters).display()
        );
    }

    scan_characters(&config.build.characters)?
        .iter()
        .map(CharacterDir::assets)
        .collect()
}

/// Process characters one at a time, in scan order.
fn process_characters(
    sets: &[CharacterAssetSet],
    config: &LibraryConfig,
    stamp: &BuildStamp,
) -> Result<BuildReport> {
    let progress = ProgressLine::new(&[
        ("characters", sets.len()),
        ("svg", sets.iter().map(|s| s.svgs.len()).sum()),
        ("css", sets.iter().map(|s| s.stylesheets.len()).sum()),
    ]);

    let mut report = BuildReport {
        characters: sets.len(),
        svgs: 0,
        stylesheets: 0,
        metadata: 0,
        bundle: BundleOutput::default(),
        manifest: PathBuf::new(),
        manifest_characters: 0,
    };

    for set in sets {
        let processed = process_character(set, config, stamp, Some(&progress))
            .with_context(|| format!("Failed to process character {}", set.id()))?;
        report.svgs += processed.svgs;
        report.stylesheets += processed.stylesheets;
        report.metadata += usize::from(processed.metadata);
        progress.inc("characters");
    }
    progress.finish();

    Ok(report)
}

fn describe_bundle(bundle: &BundleOutput) -> String {
    if bundle.modules == 0 {
        return plural_count(bundle.files.len(), "file");
    }
    format!(
        "{} from {}, {}",
        plural_count(bundle.files.len(), "file"),
        plural_count(bundle.modules, "module"),
        plural_count(bundle.stylesheets, "stylesheet")
    )
}
