//! `charlib manifest`: regenerate `manifest.json` without a full build.

use std::path::PathBuf;

use anyhow::Result;

use crate::{
    config::LibraryConfig,
    core::BuildStamp,
    log,
    manifest::{generate_manifest, write_manifest},
    utils::plural_count,
};

/// Write a fresh manifest from the characters tree, returning its path.
pub fn regenerate_manifest(config: &LibraryConfig) -> Result<PathBuf> {
    let stamp = BuildStamp::now(&config.library.version);
    let manifest = generate_manifest(config, &stamp)?;
    let path = write_manifest(&manifest, config)?;

    log!(
        "manifest";
        "{}, {}, {} -> {}",
        plural_count(manifest.characters.len(), "character"),
        plural_count(manifest.animations.len(), "animation"),
        plural_count(manifest.styles.len(), "style"),
        config.root_relative(&path).display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_regenerate_manifest() {
        let dir = TempDir::new().unwrap();
        let config = LibraryConfig::with_root(dir.path());
        let meta = config.build.characters.join("girl/casual/meta.json");
        fs::create_dir_all(meta.parent().unwrap()).unwrap();
        fs::write(
            &meta,
            r#"{"id": "girl-casual", "name": "Casual Girl", "type": "girl", "style": "casual"}"#,
        )
        .unwrap();

        let path = regenerate_manifest(&config).unwrap();
        assert_eq!(path, config.build.output.join("manifest.json"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["characters"][0]["id"], "girl-casual");
        assert_eq!(json["characters"][0]["tags"], serde_json::json!([]));
    }
}
