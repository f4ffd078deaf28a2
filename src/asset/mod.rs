//! Character asset discovery and per-character processing.

mod kind;
pub mod minify;
mod process;
mod scan;

// Types
pub use kind::StylesheetKind;

// Scanning (pure functions)
pub use scan::{CharacterAssetSet, CharacterDir, METADATA_FILE, scan_characters};

// Processing (side effects)
pub use process::{ProcessedCharacter, check_artifact_names, process_character};
