//! Build mode configuration for production/development builds.

/// Environment variable that selects the build mode.
pub const MODE_ENV: &str = "NODE_ENV";

/// Build mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    /// Emit the minified UMD bundle and minify the extracted stylesheet.
    pub minify: bool,
}

impl BuildMode {
    /// Production mode: adds `index.min.js` and minified library CSS.
    pub const PRODUCTION: Self = Self { minify: true };

    /// Development mode: readable bundles only.
    pub const DEVELOPMENT: Self = Self { minify: false };

    /// Resolve the mode from a `NODE_ENV`-style value.
    ///
    /// Only the exact (case-insensitive) value `production` selects production.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("production") => Self::PRODUCTION,
            _ => Self::DEVELOPMENT,
        }
    }

    /// Read the mode from the process environment.
    ///
    /// Called once in `main`; everything below receives the value explicitly.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(MODE_ENV).ok().as_deref())
    }

    #[inline]
    pub const fn is_production(&self) -> bool {
        self.minify
    }

    /// Name exported to external tools (`CHARLIB_MODE`).
    pub const fn name(&self) -> &'static str {
        if self.minify { "production" } else { "development" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_value() {
        assert_eq!(
            BuildMode::from_env_value(Some("production")),
            BuildMode::PRODUCTION
        );
        assert_eq!(
            BuildMode::from_env_value(Some(" Production ")),
            BuildMode::PRODUCTION
        );
        assert_eq!(
            BuildMode::from_env_value(Some("development")),
            BuildMode::DEVELOPMENT
        );
        assert_eq!(BuildMode::from_env_value(Some("prod")), BuildMode::DEVELOPMENT);
        assert_eq!(BuildMode::from_env_value(None), BuildMode::DEVELOPMENT);
    }

    #[test]
    fn test_mode_name() {
        assert_eq!(BuildMode::PRODUCTION.name(), "production");
        assert_eq!(BuildMode::DEVELOPMENT.name(), "development");
        assert!(BuildMode::PRODUCTION.is_production());
        assert!(!BuildMode::DEVELOPMENT.is_production());
    }
}
