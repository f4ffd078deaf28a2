//! Build stamp shared by every artifact of one build.

use chrono::{DateTime, SecondsFormat, Utc};

/// Time and version captured once when a build starts.
///
/// Every enriched metadata document and the manifest carry the same values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStamp {
    pub date: DateTime<Utc>,
    pub version: String,
}

impl BuildStamp {
    /// Stamp the current time.
    pub fn now(version: impl Into<String>) -> Self {
        Self::at(Utc::now(), version)
    }

    pub fn at(date: DateTime<Utc>, version: impl Into<String>) -> Self {
        Self {
            date,
            version: version.into(),
        }
    }

    /// RFC 3339 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
    pub fn date_string(&self) -> String {
        self.date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
