//! Ownership checks for file records.
//!
//! Only the owner of a record may change or remove it. There are no roles
//! and no administrative override.

use super::FileRecord;
use crate::{FilehubError, Result};

/// Whether `requester` may modify `record`.
pub fn authorize(record: &FileRecord, requester: i64) -> bool {
    record.owner_id == requester
}

/// Fail with `Forbidden` unless `requester` owns `record`.
pub fn require_owner(record: &FileRecord, requester: i64) -> Result<()> {
    if authorize(record, requester) {
        Ok(())
    } else {
        Err(FilehubError::Forbidden(format!(
            "owner {requester} may not modify file {}",
            record.id
        )))
    }
}
