//! Per-character processing with side effects (optimize, scope, enrich).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;

use crate::config::LibraryConfig;
use crate::core::{BuildStamp, CharacterId, OutputDir};
use crate::css::scope_stylesheet;
use crate::logger::ProgressLine;
use crate::metadata::enrich_metadata;
use crate::svg::optimize_svg;
use crate::debug;

use super::CharacterAssetSet;

/// What one character contributed to the output tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedCharacter {
    pub svgs: usize,
    pub stylesheets: usize,
    pub metadata: bool,
}

/// Write every derived artifact of one character.
///
/// Files are handled in name order; the first failure aborts with the
/// offending file named in the error context.
pub fn process_character(
    assets: &CharacterAssetSet,
    config: &LibraryConfig,
    stamp: &BuildStamp,
    progress: Option<&ProgressLine>,
) -> Result<ProcessedCharacter> {
    let id = assets.id();
    let output = &config.build.output;
    let mut processed = ProcessedCharacter::default();

    for path in &assets.svgs {
        let source = read(path)?;
        let optimized = optimize_svg(&source, &config.build.svg)
            .with_context(|| format!("Failed to optimize {}", config.root_relative(path).display()))?;

        let target = svg_target(id, path, output);
        write(&target, &optimized)?;
        debug!("svg"; "{}", config.root_relative(&target).display());

        processed.svgs += 1;
        inc(progress, "svg");
    }

    for path in &assets.stylesheets {
        let scoped = scope_stylesheet(path, id, &config.build.css)
            .with_context(|| format!("Failed to scope {}", config.root_relative(path).display()))?;

        let target = css_target(id, path, output);
        write(&target, &scoped)?;
        debug!("css"; "{}", config.root_relative(&target).display());

        processed.stylesheets += 1;
        inc(progress, "css");
    }

    if let Some(path) = &assets.metadata {
        let source = read(path)?;
        let enriched = enrich_metadata(&source, stamp)
            .with_context(|| format!("Failed to enrich {}", config.root_relative(path).display()))?;

        let target = meta_target(id, output);
        write(&target, &enriched)?;
        debug!("meta"; "{}", config.root_relative(&target).display());

        processed.metadata = true;
    }

    Ok(processed)
}

/// Fail when two source files of one build map onto the same artifact.
///
/// `theme.css` next to `theme.scss` collide, and so do `boy/a` with
/// `b-c.svg` and `boy/a-b` with `c.svg`. Checked before anything is written.
pub fn check_artifact_names(sets: &[CharacterAssetSet], config: &LibraryConfig) -> Result<()> {
    let output = &config.build.output;
    let mut claimed: FxHashMap<PathBuf, &Path> = FxHashMap::default();

    for set in sets {
        let id = set.id();
        let planned = set
            .svgs
            .iter()
            .map(|path| (svg_target(id, path, output), path))
            .chain(
                set.stylesheets
                    .iter()
                    .map(|path| (css_target(id, path, output), path)),
            )
            .chain(set.metadata.iter().map(|path| (meta_target(id, output), path)));

        for (target, source) in planned {
            if let Some(previous) = claimed.insert(target.clone(), source) {
                bail!(
                    "{} and {} would both be written to {}",
                    config.root_relative(previous).display(),
                    config.root_relative(source).display(),
                    config.root_relative(&target).display()
                );
            }
        }
    }
    Ok(())
}

fn svg_target(id: &CharacterId, path: &Path, output: &Path) -> PathBuf {
    OutputDir::Svg
        .path(output)
        .join(id.artifact_name(base_name(path), "svg"))
}

fn css_target(id: &CharacterId, path: &Path, output: &Path) -> PathBuf {
    OutputDir::Css
        .path(output)
        .join(id.artifact_name(base_name(path), "css"))
}

fn meta_target(id: &CharacterId, output: &Path) -> PathBuf {
    OutputDir::Js.path(output).join(id.artifact_name("meta", "json"))
}

fn inc(progress: Option<&ProgressLine>, counter: &str) {
    if let Some(progress) = progress {
        progress.inc(counter);
    }
}

/// File name without its final extension.
fn base_name(path: &Path) -> &str {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
