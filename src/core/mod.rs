//! Core types - pure abstractions shared across the codebase.

mod character;
mod mode;
mod output;
mod stamp;

pub use character::{CharacterId, CharacterType};
pub use mode::BuildMode;
pub use output::OutputDir;
pub use stamp::BuildStamp;
