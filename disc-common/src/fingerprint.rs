//! Respondent name validation and fingerprinting
//!
//! Repeat visits under the same display name resolve to one respondent via
//! a fingerprint of the trimmed, case-folded name.

use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Maximum display-name length in characters
pub const MAX_NAME_CHARS: usize = 50;

/// Validate and normalize a display name for storage
///
/// Trims surrounding whitespace; rejects empty names, names longer than
/// [`MAX_NAME_CHARS`], and names containing anything but letters, digits
/// and whitespace.
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("Name must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(Error::InvalidInput(format!(
            "Name must be at most {} characters",
            MAX_NAME_CHARS
        )));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c.is_whitespace())
    {
        return Err(Error::InvalidInput(
            "Name may only contain letters, digits and spaces".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Lowercase hex SHA-256 of the trimmed, case-folded name
pub fn name_fingerprint(name: &str) -> String {
    let normalized = name.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}
