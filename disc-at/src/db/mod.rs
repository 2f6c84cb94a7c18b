//! Durable-storage access for respondents, test links, answers and scores
//!
//! Functions that must run inside the submission transaction take any
//! SQLite executor, so callers pass either `&pool` or `&mut *tx`.

pub mod answers;
pub mod respondents;
pub mod scores;
pub mod test_links;

use disc_common::{ids, Error, Result};
use uuid::Uuid;

/// Parse a stored guid column
pub(crate) fn parse_guid(value: &str, column: &str) -> Result<Uuid> {
    ids::parse(value)
        .map_err(|e| Error::Internal(format!("Invalid {} in storage {:?}: {}", column, value, e)))
}

/// Convert a stored integer into a count or score component
pub(crate) fn to_u32(value: i64, column: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::Internal(format!("Out-of-range {} in storage: {}", column, value)))
}
