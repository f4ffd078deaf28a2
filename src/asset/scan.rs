//! Character tree scanning (pure, no side effects).
//!
//! ```text
//! characters/
//! ├── boy/
//! │   └── casual/             -> CharacterDir(boy, casual)
//! │       ├── svg/
//! │       │   └── body.svg    -> svgs
//! │       ├── animations.css  -> stylesheets
//! │       ├── theme.scss      -> stylesheets
//! │       └── meta.json       -> metadata
//! └── girl/                   (man/ and woman/ missing: skipped)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::{CharacterId, CharacterType};

use super::StylesheetKind;

/// Metadata document name inside a character directory.
pub const METADATA_FILE: &str = "meta.json";

/// SVG sprite directory inside a character directory.
pub const SVG_DIR: &str = "svg";

/// One discovered character directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDir {
    pub id: CharacterId,
    pub dir: PathBuf,
}

/// Assets owned by one character, discovered per build.
#[derive(Debug, Clone)]
pub struct CharacterAssetSet {
    pub character: CharacterDir,
    /// `svg/*.svg`, sorted by file name.
    pub svgs: Vec<PathBuf>,
    /// `*.css` and `*.scss` directly in the character directory, sorted.
    pub stylesheets: Vec<PathBuf>,
    /// `meta.json`, when present.
    pub metadata: Option<PathBuf>,
}

/// Scan `root` for character directories.
///
/// Types are visited in enum order and characters in name order. Missing
/// type directories and non-directory entries are skipped.
pub fn scan_characters(root: &Path) -> Result<Vec<CharacterDir>> {
    let mut results = Vec::new();

    for kind in CharacterType::ALL {
        let Some(type_dir) = kind.dir(root) else {
            continue;
        };

        for dir in sorted_entries(&type_dir)? {
            if !dir.is_dir() {
                continue;
            }
            let Some(name) = visible_name(&dir) else {
                continue;
            };
            results.push(CharacterDir {
                id: CharacterId::new(kind, name),
                dir,
            });
        }
    }

    Ok(results)
}

impl CharacterDir {
    /// Path of the metadata document, whether or not it exists.
    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// List the character's SVG, stylesheet and metadata files.
    ///
    /// A missing `svg/` directory or metadata file is not an error.
    pub fn assets(&self) -> Result<CharacterAssetSet> {
        let svg_dir = self.dir.join(SVG_DIR);
        let svgs = if svg_dir.is_dir() {
            files_matching(&svg_dir, |path| {
                path.extension().is_some_and(|ext| ext == "svg")
            })?
        } else {
            Vec::new()
        };

        let stylesheets = files_matching(&self.dir, |path| {
            StylesheetKind::from_path(path).is_some()
        })?;

        let metadata = Some(self.metadata_path()).filter(|p| p.is_file());

        Ok(CharacterAssetSet {
            character: self.clone(),
            svgs,
            stylesheets,
            metadata,
        })
    }
}

impl CharacterAssetSet {
    pub fn id(&self) -> &CharacterId {
        &self.character.id
    }
}

/// Directory entries sorted by file name.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to list directory {}", dir.display()))?;
    entries.sort();
    Ok(entries)
}

/// Regular, non-hidden files of `dir` accepted by `filter`, sorted.
fn files_matching(dir: &Path, filter: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|path| path.is_file() && visible_name(path).is_some() && filter(path))
        .collect())
}

/// File name as UTF-8, `None` for hidden or non-UTF-8 names.
fn visible_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    (!name.starts_with('.')).then(|| name.to_owned())
}
