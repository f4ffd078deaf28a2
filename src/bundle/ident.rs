//! JavaScript identifier checks for export names and the UMD global.

use oxc::syntax::identifier::is_identifier_name;
use oxc::syntax::keyword::is_reserved_keyword;

/// Whether `name` can be used as a JavaScript binding (`const name = ...`).
pub fn is_valid_identifier(name: &str) -> bool {
    is_identifier_name(name) && !is_reserved_keyword(name)
}
