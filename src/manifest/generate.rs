use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::LibraryManifest;
use crate::asset::scan_characters;
use crate::config::LibraryConfig;
use crate::core::BuildStamp;
use crate::metadata::CharacterMetadata;
use crate::debug;

/// Build the manifest from the characters tree.
///
/// Characters without `meta.json` are left out entirely; a malformed
/// `meta.json` fails the whole manifest.
pub fn generate_manifest(config: &LibraryConfig, stamp: &BuildStamp) -> Result<LibraryManifest> {
    let mut manifest = LibraryManifest::new(stamp);

    for character in scan_characters(&config.build.characters)? {
        let path = character.metadata_path();
        if !path.is_file() {
            debug!("manifest"; "skipping {}: no metadata", character.id);
            continue;
        }
        manifest.push(CharacterMetadata::read(&path)?);
    }

    for id in manifest.dangling_references() {
        debug!("manifest"; "record references unknown character `{}`", id);
    }

    Ok(manifest)
}

/// Write the manifest as pretty JSON, returning its path.
pub fn write_manifest(manifest: &LibraryManifest, config: &LibraryConfig) -> Result<PathBuf> {
    let path = config.manifest_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn meta(id: &str, kind: &str) -> String {
        format!(r#"{{"id": "{id}", "name": "{id}", "type": "{kind}", "style": "plain"}}"#)
    }

    #[test]
    fn test_missing_metadata_excluded() {
        let dir = TempDir::new().unwrap();
        let config = LibraryConfig::with_root(dir.path());
        let chars = &config.build.characters;
        write(&chars.join("boy/casual/meta.json"), &meta("boy-casual", "boy"));
        fs::create_dir_all(chars.join("boy/nometa/svg")).unwrap();
        write(&chars.join("woman/office/meta.json"), &meta("woman-office", "woman"));

        let manifest = generate_manifest(&config, &BuildStamp::now("1.0.0")).unwrap();
        let ids: Vec<_> = manifest.characters.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["boy-casual", "woman-office"]);
        assert!(manifest.animations.iter().all(|a| a.character != "boy-nometa"));
        assert!(manifest.styles.is_empty());
    }

    #[test]
    fn test_malformed_metadata_fails() {
        let dir = TempDir::new().unwrap();
        let config = LibraryConfig::with_root(dir.path());
        write(&config.build.characters.join("girl/broken/meta.json"), "{ nope");

        let err = generate_manifest(&config, &BuildStamp::now("1.0.0")).unwrap_err();
        assert!(format!("{err:#}").contains("meta.json"));
    }

    #[test]
    fn test_no_characters_dir() {
        let dir = TempDir::new().unwrap();
        let config = LibraryConfig::with_root(dir.path());
        let stamp = BuildStamp::now("3.1.0");
        let manifest = generate_manifest(&config, &stamp).unwrap();
        assert!(manifest.characters.is_empty());
        assert_eq!(manifest.version, "3.1.0");
        assert_eq!(manifest.build_date, stamp.date_string());
    }

    #[test]
    fn test_write_manifest() {
        let dir = TempDir::new().unwrap();
        let config = LibraryConfig::with_root(dir.path());
        let manifest = LibraryManifest::new(&BuildStamp::now("1.0.0"));

        let path = write_manifest(&manifest, &config).unwrap();
        assert_eq!(path, config.output_join("manifest.json"));
        let written: LibraryManifest =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, manifest);
    }
}
