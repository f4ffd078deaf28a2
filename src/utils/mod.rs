//! Shared helpers used across the build pipeline.
//!
//! | Module   | Purpose                                         |
//! |----------|-------------------------------------------------|
//! | `exec`   | External command builder (SCSS, bundler hook)   |
//! | `path`   | Path normalization and display helpers          |
//! | `plural` | Count formatting for log lines                  |

pub mod exec;
pub mod path;
pub mod plural;

pub use plural::plural_count;
