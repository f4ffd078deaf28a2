//! Per-character stylesheet processing.
//!
//! SCSS is compiled by an external command, the result is parsed with
//! lightningcss, then every selector is prefixed with the character's scope
//! class (`.character-{type}-{name}`).

mod scope;
mod scss;

pub use scope::{scope_css, scope_css_legacy};
pub use scss::compile_scss;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use lightningcss::stylesheet::{ParserOptions, StyleSheet};

use crate::asset::StylesheetKind;
use crate::config::{CssConfig, ScopingMode};
use crate::core::CharacterId;

/// Read, compile, validate and scope one stylesheet.
///
/// Output depends only on the file content and `id`, so scoping the same
/// file twice yields byte-identical output.
pub fn scope_stylesheet(path: &Path, id: &CharacterId, config: &CssConfig) -> Result<String> {
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let css = compile_css(path, source, config)?;
    let class = id.scope_class();

    let scoped = match config.scoping {
        ScopingMode::Structured => scope_css(&css, &class),
        ScopingMode::Legacy => validate_css(&css).map(|()| scope_css_legacy(&css, &class)),
    };
    scoped.with_context(|| format!("Invalid CSS in {}", path.display()))
}

/// Compile (when needed) and validate a stylesheet, returning plain CSS.
pub fn load_css(path: &Path, source: String, config: &CssConfig) -> Result<String> {
    let css = compile_css(path, source, config)?;
    validate_css(&css).with_context(|| format!("Invalid CSS in {}", path.display()))?;
    Ok(css)
}

fn compile_css(path: &Path, source: String, config: &CssConfig) -> Result<String> {
    Ok(match StylesheetKind::from_path(path) {
        Some(kind) if kind.needs_compile() => compile_scss(&source, &config.scss)
            .with_context(|| format!("Failed to compile {}", path.display()))?,
        _ => source,
    })
}

/// Parse with lightningcss, discarding the result.
pub fn validate_css(css: &str) -> Result<()> {
    StyleSheet::parse(css, ParserOptions::default())
        .map(drop)
        .map_err(|e| anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CharacterType;
    use tempfile::TempDir;

    fn boy_casual() -> CharacterId {
        CharacterId::new(CharacterType::Boy, "casual")
    }

    #[test]
    fn test_scope_stylesheet_css() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("animations.css");
        fs::write(&path, ".arm { display: none; }\n").unwrap();

        let out = scope_stylesheet(&path, &boy_casual(), &CssConfig::default()).unwrap();
        assert_eq!(out, ".character-boy-casual .arm {\n  display: none;\n}\n");
    }

    #[test]
    fn test_scope_stylesheet_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("animations.css");
        fs::write(
            &path,
            ":root { --skin: #fc9; }\n.arm, .leg { animation: wave 400ms; }\n@keyframes wave { 0% { transform: none; } 100% { transform: rotate(20deg); } }\n",
        )
        .unwrap();

        let config = CssConfig::default();
        let first = scope_stylesheet(&path, &boy_casual(), &config).unwrap();
        let second = scope_stylesheet(&path, &boy_casual(), &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scope_stylesheet_legacy_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("animations.css");
        fs::write(&path, "@keyframes wave { 0% { opacity: 0; } }").unwrap();

        let config = CssConfig {
            scoping: ScopingMode::Legacy,
            ..Default::default()
        };
        let out = scope_stylesheet(&path, &boy_casual(), &config).unwrap();
        assert_eq!(
            out,
            ".character-boy-casual @keyframes wave {.character-boy-casual  0% { opacity: 0; } }"
        );
    }

    #[test]
    fn test_scope_stylesheet_invalid_css() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.css"), "..arm { color: red; }").unwrap();

        let err = scope_stylesheet(
            &dir.path().join("bad.css"),
            &boy_casual(),
            &CssConfig::default(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("bad.css"));
    }

    #[test]
    fn test_scope_stylesheet_scss_through_compiler() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("theme.scss");
        fs::write(&path, ".hat { display: none; }").unwrap();

        // `cat` stands in for a compiler: plain CSS is valid SCSS
        let config = CssConfig {
            scss: vec!["cat".into()],
            ..Default::default()
        };
        let out = scope_stylesheet(&path, &boy_casual(), &config).unwrap();
        assert_eq!(out, ".character-boy-casual .hat {\n  display: none;\n}\n");
    }

    #[test]
    fn test_scope_stylesheet_scss_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("theme.scss");
        fs::write(&path, ".hat { color: $missing; }").unwrap();

        let config = CssConfig {
            scss: vec!["false".into()],
            ..Default::default()
        };
        let err = scope_stylesheet(&path, &boy_casual(), &config).unwrap_err();
        assert!(format!("{err:#}").contains("theme.scss"));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = scope_stylesheet(
            &dir.path().join("nope.css"),
            &boy_casual(),
            &CssConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("nope.css"));
    }
}
