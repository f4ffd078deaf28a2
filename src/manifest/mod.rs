//! Library manifest: one JSON document describing every character,
//! animation and style variant of the build.
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "buildDate": "2024-05-01T12:00:00.000Z",
//!   "characters": [{"id": "boy-casual", "name": "Casual Boy", "type": "boy", "style": "casual", "tags": []}],
//!   "animations": [{"character": "boy-casual", "name": "wave", "duration": 400, "type": "css"}],
//!   "styles": [{"character": "boy-casual", "name": "night"}]
//! }
//! ```

mod generate;

pub use generate::{generate_manifest, write_manifest};

use serde::{Deserialize, Serialize};

use crate::core::BuildStamp;
use crate::metadata::CharacterMetadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryManifest {
    pub version: String,
    pub build_date: String,
    pub characters: Vec<CharacterRecord>,
    pub animations: Vec<AnimationRecord>,
    pub styles: Vec<StyleRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub style: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationRecord {
    /// Id of the owning character.
    pub character: String,
    pub name: String,
    pub duration: serde_json::Value,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRecord {
    /// Id of the owning character.
    pub character: String,
    pub name: String,
}

impl LibraryManifest {
    pub fn new(stamp: &BuildStamp) -> Self {
        Self {
            version: stamp.version.clone(),
            build_date: stamp.date_string(),
            characters: Vec::new(),
            animations: Vec::new(),
            styles: Vec::new(),
        }
    }

    /// Append one character with its animations and variants.
    pub fn push(&mut self, meta: CharacterMetadata) {
        let character = meta.id;

        self.animations
            .extend(meta.animations.into_iter().map(|anim| AnimationRecord {
                character: character.clone(),
                name: anim.name,
                duration: anim.duration,
                kind: anim.kind,
            }));
        self.styles
            .extend(meta.variants.into_iter().map(|variant| StyleRecord {
                character: character.clone(),
                name: variant.name,
            }));
        self.characters.push(CharacterRecord {
            id: character,
            name: meta.name,
            kind: meta.kind,
            style: meta.style,
            tags: meta.tags,
        });
    }

    /// Animation and style `character` references with no matching record.
    pub fn dangling_references(&self) -> Vec<&str> {
        let known = |id: &str| self.characters.iter().any(|c| c.id == id);
        self.animations
            .iter()
            .map(|a| a.character.as_str())
            .chain(self.styles.iter().map(|s| s.character.as_str()))
            .filter(|id| !known(id))
            .collect()
    }
}
