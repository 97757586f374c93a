//! Store-only records. The shared domain types ([`Snapshot`],
//! [`RawSnapshot`], [`VersionEntry`]) live in `lightsheet-shared`; only
//! the credential-bearing user row is private to the store.
//!
//! [`Snapshot`]: lightsheet_shared::Snapshot
//! [`RawSnapshot`]: lightsheet_shared::RawSnapshot
//! [`VersionEntry`]: lightsheet_shared::VersionEntry

use lightsheet_shared::Identity;
use serde::{Deserialize, Serialize};

/// A user row as stored, including the credential field. Never sent over
/// the wire; handlers convert to [`Identity`] first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password: String,
    pub disabled: bool,
}

impl From<&UserRecord> for Identity {
    fn from(record: &UserRecord) -> Self {
        Identity {
            username: record.username.clone(),
            disabled: record.disabled,
        }
    }
}
