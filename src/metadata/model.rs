use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Typed view of a character's `meta.json`.
///
/// Unknown keys are accepted; the enricher keeps them in the output copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterMetadata {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub style: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub animations: Vec<AnimationSpec>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub variants: Vec<VariantSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSpec {
    pub name: String,
    /// Any JSON value, kept as written (`400` stays `400`, `"400ms"` stays a string).
    pub duration: serde_json::Value,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSpec {
    pub name: String,
}

/// A missing list and an explicit `null` both read as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CharacterMetadata {
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Read and parse a metadata file.
    pub fn read(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&source).with_context(|| format!("Invalid metadata in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_lists_default_empty() {
        let meta = CharacterMetadata::from_json(
            r#"{"id": "boy-casual", "name": "Casual Boy", "type": "boy", "style": "casual"}"#,
        )
        .unwrap();
        assert_eq!(meta.kind, "boy");
        assert!(meta.tags.is_empty());
        assert!(meta.animations.is_empty());
        assert!(meta.variants.is_empty());
    }

    #[test]
    fn test_full_document() {
        let meta = CharacterMetadata::from_json(
            r#"{
                "id": "girl-party", "name": "Party Girl", "type": "girl", "style": "party",
                "tags": ["festive"],
                "animations": [{"name": "dance", "duration": 1200, "type": "css"},
                               {"name": "spin", "duration": 0.5, "type": "js"}],
                "variants": [{"name": "night", "palette": "dark"}],
                "author": "someone"
            }"#,
        )
        .unwrap();
        assert_eq!(meta.tags, ["festive"]);
        assert_eq!(meta.animations[0].duration.to_string(), "1200");
        assert_eq!(meta.animations[1].duration.to_string(), "0.5");
        assert_eq!(meta.variants[0].name, "night");
    }

    #[test]
    fn test_null_lists_read_as_empty() {
        let meta = CharacterMetadata::from_json(
            r#"{"id": "boy-casual", "name": "Casual Boy", "type": "boy", "style": "casual",
                "tags": null, "animations": null, "variants": null}"#,
        )
        .unwrap();
        assert!(meta.tags.is_empty());
        assert!(meta.animations.is_empty());
        assert!(meta.variants.is_empty());
    }

    #[test]
    fn test_duration_accepts_any_json_value() {
        let meta = CharacterMetadata::from_json(
            r#"{"id": "boy-casual", "name": "Casual Boy", "type": "boy", "style": "casual",
                "animations": [{"name": "wave", "duration": "400ms", "type": "css"},
                               {"name": "blink", "duration": null, "type": "css"}]}"#,
        )
        .unwrap();
        assert_eq!(meta.animations[0].duration, "400ms");
        assert!(meta.animations[1].duration.is_null());
    }

    #[test]
    fn test_tags_of_wrong_type_rejected() {
        assert!(
            CharacterMetadata::from_json(
                r#"{"id": "x", "name": "X", "type": "boy", "style": "s", "tags": "one"}"#
            )
            .is_err()
        );
    }

    #[test]
    fn test_missing_required_field() {
        let err = CharacterMetadata::from_json(r#"{"id": "x", "name": "X", "type": "boy"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("style"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(CharacterMetadata::from_json("{ not json").is_err());
    }
}
