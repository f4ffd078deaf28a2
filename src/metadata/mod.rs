//! Character metadata documents.
//!
//! - [`model`]: typed view of `meta.json` used for validation and the manifest
//! - [`enrich`]: the `processed` stamp added to each document copy

mod enrich;
mod model;

pub use enrich::enrich_metadata;
pub use model::{AnimationSpec, CharacterMetadata, VariantSpec};
