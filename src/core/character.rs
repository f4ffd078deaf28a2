//! Character identity: type discriminator and artifact naming.

use std::fmt;
use std::path::{Path, PathBuf};

/// Character type, one directory per variant under the characters root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CharacterType {
    Boy,
    Girl,
    Man,
    Woman,
}

impl CharacterType {
    /// All types in scan order.
    pub const ALL: [Self; 4] = [Self::Boy, Self::Girl, Self::Man, Self::Woman];

    /// Directory name (and artifact prefix) for this type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boy => "boy",
            Self::Girl => "girl",
            Self::Man => "man",
            Self::Woman => "woman",
        }
    }

    /// Type directory under `root`, `None` when it does not exist.
    ///
    /// A missing type directory is a normal state, not an error.
    pub fn dir(self, root: &Path) -> Option<PathBuf> {
        let dir = root.join(self.as_str());
        dir.is_dir().then_some(dir)
    }
}

impl fmt::Display for CharacterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(type, name)` pair identifying one character directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharacterId {
    pub kind: CharacterType,
    pub name: String,
}

impl CharacterId {
    pub fn new(kind: CharacterType, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// `{type}-{name}`, shared prefix of every derived artifact.
    pub fn stem(&self) -> String {
        format!("{}-{}", self.kind, self.name)
    }

    /// CSS class that scopes this character's styles (without the dot).
    pub fn scope_class(&self) -> String {
        format!("character-{}", self.stem())
    }

    /// Artifact file name: `{type}-{name}-{base}.{ext}`.
    pub fn artifact_name(&self, base: &str, ext: &str) -> String {
        format!("{}-{}.{}", self.stem(), base, ext)
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_type_order() {
        let names: Vec<_> = CharacterType::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, ["boy", "girl", "man", "woman"]);
    }

    #[test]
    fn test_type_dir_optional() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("man")).unwrap();
        std::fs::write(dir.path().join("boy"), "not a directory").unwrap();

        assert_eq!(
            CharacterType::Man.dir(dir.path()),
            Some(dir.path().join("man"))
        );
        assert_eq!(CharacterType::Woman.dir(dir.path()), None);
        assert_eq!(CharacterType::Boy.dir(dir.path()), None);
    }

    #[test]
    fn test_artifact_naming() {
        let id = CharacterId::new(CharacterType::Boy, "casual");
        assert_eq!(id.stem(), "boy-casual");
        assert_eq!(id.scope_class(), "character-boy-casual");
        assert_eq!(id.artifact_name("body", "svg"), "boy-casual-body.svg");
        assert_eq!(id.to_string(), "boy/casual");
    }

    #[test]
    fn test_artifact_names_distinct_across_characters() {
        let a = CharacterId::new(CharacterType::Boy, "casual");
        let b = CharacterId::new(CharacterType::Girl, "casual");
        let c = CharacterId::new(CharacterType::Boy, "sporty");
        let names = [
            a.artifact_name("meta", "json"),
            b.artifact_name("meta", "json"),
            c.artifact_name("meta", "json"),
        ];
        assert_ne!(names[0], names[1]);
        assert_ne!(names[0], names[2]);
        assert_ne!(names[1], names[2]);
    }
}
