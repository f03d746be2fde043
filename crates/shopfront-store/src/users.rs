//! CRUD operations for [`User`] records.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use shopfront_shared::UserId;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::User;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new user.  Returns the assigned row id, or
    /// [`StoreError::Duplicate`] if the email is already registered.
    pub fn insert_user(&self, user: &User) -> Result<UserId> {
        let result = self.conn().execute(
            "INSERT INTO users (id, name, email, password_hash, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                (!user.id.is_unset()).then_some(user.id.0),
                user.name,
                user.email,
                user.password_hash,
                user.is_active,
                user.created_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(UserId(self.conn().last_insert_rowid())),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// List all users, ordered by name.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, email, password_hash, is_active, created_at
             FROM users
             ORDER BY name ASC",
        )?;

        let rows = stmt.query_map([], row_to_user)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Fetch a single user by id.
    pub fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT id, name, email, password_hash, is_active, created_at
                 FROM users
                 WHERE id = ?1",
                params![id.0],
                row_to_user,
            )
            .optional()?)
    }

    /// Fetch a single user by email.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT id, name, email, password_hash, is_active, created_at
                 FROM users
                 WHERE email = ?1
                 LIMIT 1",
                params![email],
                row_to_user,
            )
            .optional()?)
    }

    /// Whether any user is registered under `email`.
    pub fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 LIMIT 1)",
            params![email],
            |row| row.get(0),
        )?)
    }

    /// The user matching `email` whose stored digest equals `password_hash`
    /// exactly, if any.
    pub fn check_credentials(&self, email: &str, password_hash: &str) -> Result<Option<User>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT id, name, email, password_hash, is_active, created_at
                 FROM users
                 WHERE email = ?1 AND password_hash = ?2
                 LIMIT 1",
                params![email, password_hash],
                row_to_user,
            )
            .optional()?)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Update every field of an existing user.
    pub fn update_user(&self, user: &User) -> Result<()> {
        self.conn().execute(
            "UPDATE users
             SET name = ?2, email = ?3, password_hash = ?4, is_active = ?5,
                 created_at = ?6
             WHERE id = ?1",
            params![
                user.id.0,
                user.name,
                user.email,
                user.password_hash,
                user.is_active,
                user.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Flip the active flag without touching the rest of the record.
    pub fn set_user_active(&self, id: UserId, is_active: bool) -> Result<()> {
        self.conn().execute(
            "UPDATE users SET is_active = ?2 WHERE id = ?1",
            params![id.0, is_active],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    // ON DELETE CASCADE: the user's cart rows go with it
    /// Delete a user by id.  Returns `true` if a row was deleted.
    pub fn delete_user(&self, id: UserId) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id.0])?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`User`].
fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let created_str: String = row.get(5)?;
    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(User {
        id: UserId(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        is_active: row.get(4)?,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (_dir, db) = test_db();

        let id = db
            .insert_user(&User::new("Ana", "ana@example.com", "digest".into()))
            .unwrap();
        assert!(!id.is_unset());

        let err = db
            .insert_user(&User::new("Other Ana", "ana@example.com", "digest2".into()))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));

        // Exactly one row survives.
        assert_eq!(db.list_users().unwrap().len(), 1);
        assert!(db.email_exists("ana@example.com").unwrap());
    }

    #[test]
    fn credentials_require_exact_hash_match() {
        let (_dir, db) = test_db();

        db.insert_user(&User::new("Ana", "ana@example.com", "right-digest".into()))
            .unwrap();

        let found = db
            .check_credentials("ana@example.com", "right-digest")
            .unwrap();
        assert!(found.is_some());

        assert!(db
            .check_credentials("ana@example.com", "wrong-digest")
            .unwrap()
            .is_none());
        assert!(db
            .check_credentials("nobody@example.com", "right-digest")
            .unwrap()
            .is_none());
    }

    #[test]
    fn set_active_flag_and_lookup() {
        let (_dir, db) = test_db();

        let id = db
            .insert_user(&User::new("Ana", "ana@example.com", "digest".into()))
            .unwrap();

        db.set_user_active(id, false).unwrap();
        let user = db.get_user(id).unwrap().unwrap();
        assert!(!user.is_active);

        assert_eq!(db.get_user(UserId(404)).unwrap(), None);
        assert!(db
            .get_user_by_email("ana@example.com")
            .unwrap()
            .is_some());
    }

    #[test]
    fn delete_returns_whether_a_row_existed() {
        let (_dir, db) = test_db();

        let id = db
            .insert_user(&User::new("Ana", "ana@example.com", "digest".into()))
            .unwrap();

        assert!(db.delete_user(id).unwrap());
        assert!(!db.delete_user(id).unwrap());
        assert!(!db.email_exists("ana@example.com").unwrap());
    }
}
