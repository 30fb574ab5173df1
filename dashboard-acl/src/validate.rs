// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

use crate::entry::AclItem;

/// Structural problems of a submitted permission item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Permission for user and team not allowed in the same item")]
    ConflictingSubject,

    #[error("Permission for user/team and role not allowed in the same item")]
    InvalidSubjectCombination,
}

/// Checks that every item targets at most one kind of subject.
///
/// Items are checked in order and the first violation is returned.
pub fn validate_items(items: &[AclItem]) -> Result<(), ValidationError> {
    for item in items {
        if item.user_id > 0 && item.team_id > 0 {
            return Err(ValidationError::ConflictingSubject);
        }

        if (item.user_id > 0 || item.team_id > 0) && item.role.is_some() {
            return Err(ValidationError::InvalidSubjectCombination);
        }
    }

    Ok(())
}
