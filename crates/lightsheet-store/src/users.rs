//! User records (username, credential, disabled flag).

use rusqlite::params;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::UserRecord;

impl Database {
    /// Insert a user. Fails if the username is already taken.
    pub fn insert_user(&self, user: &UserRecord) -> Result<()> {
        self.conn().execute(
            "INSERT INTO users (username, password, disabled) VALUES (?1, ?2, ?3)",
            params![user.username, user.password, user.disabled as i32],
        )?;
        Ok(())
    }

    pub fn get_user(&self, username: &str) -> Result<UserRecord> {
        self.conn()
            .query_row(
                "SELECT username, password, disabled FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Insert a user unless the username already exists. Returns whether
    /// a row was created. Used by the startup bootstrap.
    pub fn ensure_user(&self, user: &UserRecord) -> Result<bool> {
        let affected = self.conn().execute(
            "INSERT OR IGNORE INTO users (username, password, disabled)
             VALUES (?1, ?2, ?3)",
            params![user.username, user.password, user.disabled as i32],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    let disabled: i32 = row.get(2)?;
    Ok(UserRecord {
        username: row.get(0)?,
        password: row.get(1)?,
        disabled: disabled != 0,
    })
}
