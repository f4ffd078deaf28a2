use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::{Value, json};

use super::CharacterMetadata;
use crate::core::BuildStamp;

/// Key added to every enriched document.
const PROCESSED_KEY: &str = "processed";

/// Return the source document with `processed: {date, version}` appended.
///
/// Every source key is kept in source order. The document must be a JSON
/// object that is also valid [`CharacterMetadata`].
pub fn enrich_metadata(source: &str, stamp: &BuildStamp) -> Result<String> {
    let value: Value = serde_json::from_str(source).context("metadata is not valid JSON")?;
    CharacterMetadata::deserialize(&value).context("metadata does not match the character schema")?;

    let Value::Object(mut doc) = value else {
        bail!("metadata must be a JSON object");
    };

    // Re-inserting moves a stale stamp to the end like a fresh one
    doc.shift_remove(PROCESSED_KEY);
    doc.insert(
        PROCESSED_KEY.to_owned(),
        json!({
            "date": stamp.date_string(),
            "version": stamp.version,
        }),
    );

    Ok(serde_json::to_string_pretty(&doc)?)
}
