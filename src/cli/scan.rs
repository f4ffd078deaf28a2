//! `charlib scan`: list discovered characters and their assets.

use anyhow::Result;

use crate::{
    asset::{CharacterAssetSet, CharacterDir, scan_characters},
    config::LibraryConfig,
    log,
    utils::plural_count,
};

/// Print one line per character and return the scanned sets.
pub fn scan_library(config: &LibraryConfig) -> Result<Vec<CharacterAssetSet>> {
    let sets = scan_characters(&config.build.characters)?
        .iter()
        .map(CharacterDir::assets)
        .collect::<Result<Vec<_>>>()?;

    for set in &sets {
        log!("scan"; "{}", describe(set));
    }
    log!(
        "scan";
        "{} in {}",
        plural_count(sets.len(), "character"),
        config.root_relative(&config.build.characters).display()
    );
    Ok(sets)
}

fn describe(set: &CharacterAssetSet) -> String {
    format!(
        "{}: {}, {}{}",
        set.id(),
        plural_count(set.svgs.len(), "svg"),
        plural_count(set.stylesheets.len(), "stylesheet"),
        if set.metadata.is_some() { "" } else { ", no metadata" }
    )
}
