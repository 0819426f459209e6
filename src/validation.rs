//! Validation rules for node names.
//!
//! Pure functions with no side effects.

use crate::error::Rejection;

const MAX_NODE_NAME_LENGTH: usize = 255;
const RESERVED_NODE_NAMES: &[&str] = &[".", ".."];

/// Validates a name given to `rename`.
///
/// ## Rules
/// - 1-255 characters
/// - No `/` (the path separator)
/// - No control characters
/// - Not `.` or `..`
/// - No leading or trailing whitespace
pub fn validate_node_name(name: &str) -> Result<(), Rejection> {
    if name.is_empty() {
        return Err(Rejection::InvalidName("cannot be empty".to_string()));
    }

    if name.chars().count() > MAX_NODE_NAME_LENGTH {
        return Err(Rejection::InvalidName(format!(
            "exceeds {} chars",
            MAX_NODE_NAME_LENGTH
        )));
    }

    if RESERVED_NODE_NAMES.contains(&name) {
        return Err(Rejection::InvalidName(format!("'{}' is reserved", name)));
    }

    for (idx, ch) in name.chars().enumerate() {
        if ch == '/' {
            return Err(Rejection::InvalidName(format!(
                "'/' at position {} is the path separator",
                idx
            )));
        }
        if ch.is_control() {
            return Err(Rejection::InvalidName(format!(
                "control character at position {}",
                idx
            )));
        }
    }

    if name.trim() != name {
        return Err(Rejection::InvalidName(
            "cannot start or end with whitespace".to_string(),
        ));
    }

    Ok(())
}
