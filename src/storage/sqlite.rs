use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::Result;
use crate::models::{ApiKey, ApiKeyUpdate, NewApiKey, NewUser, User};

const API_KEY_COLUMNS: &str =
    r#"id, user_id, name, key, usage, "limit", limit_enabled, created_at"#;

/// SQLite-backed store for users and their API keys.
///
/// The connection sits behind a mutex so one `Storage` can be shared by every
/// request handler. Each public method holds the lock for its whole body.
pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_db()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_db()?;
        Ok(storage)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn init_db(&self) -> Result<()> {
        self.conn().execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                name TEXT,
                image TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS api_keys (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                key TEXT UNIQUE NOT NULL,
                usage INTEGER NOT NULL DEFAULT 0,
                "limit" INTEGER,
                limit_enabled INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_api_keys_user_id ON api_keys(user_id);
            "#,
        )?;

        Ok(())
    }

    /// Create the user on first sight of the email; existing users are
    /// returned untouched.
    pub fn upsert_user(&self, user: &NewUser) -> Result<User> {
        let conn = self.conn();
        let email = user.email.trim();

        conn.execute(
            r#"
            INSERT INTO users (id, email, name, image, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(email) DO NOTHING
            "#,
            params![
                uuid::Uuid::new_v4().to_string(),
                email,
                user.name,
                user.image,
                timestamp(Utc::now()),
            ],
        )?;

        let user = conn.query_row(
            "SELECT id, email, name, image, created_at FROM users WHERE email = ?1",
            params![email],
            row_to_user,
        )?;
        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn()
            .query_row(
                "SELECT id, email, name, image, created_at FROM users WHERE email = ?1",
                params![email.trim()],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Keys owned by `user_id`, newest first.
    pub fn list_api_keys(&self, user_id: &str) -> Result<Vec<ApiKey>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM api_keys WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
            API_KEY_COLUMNS
        ))?;

        let keys = stmt.query_map(params![user_id], row_to_api_key)?;
        keys.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn create_api_key(&self, user_id: &str, new_key: &NewApiKey, key: &str) -> Result<ApiKey> {
        let api_key = ApiKey {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: new_key.name.trim().to_string(),
            key: key.to_string(),
            usage: 0,
            limit: new_key.limit,
            limit_enabled: new_key.limit_enabled,
            created_at: Utc::now(),
        };

        self.conn().execute(
            r#"
            INSERT INTO api_keys (id, user_id, name, key, usage, "limit", limit_enabled, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7)
            "#,
            params![
                api_key.id,
                api_key.user_id,
                api_key.name,
                api_key.key,
                api_key.limit,
                api_key.limit_enabled,
                timestamp(api_key.created_at),
            ],
        )?;

        Ok(api_key)
    }

    /// Fetch a key by id, scoped to its owner.
    pub fn get_api_key(&self, id: &str, user_id: &str) -> Result<Option<ApiKey>> {
        let key = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {} FROM api_keys WHERE id = ?1 AND user_id = ?2",
                    API_KEY_COLUMNS
                ),
                params![id, user_id],
                row_to_api_key,
            )
            .optional()?;
        Ok(key)
    }

    pub fn update_api_key(
        &self,
        id: &str,
        user_id: &str,
        update: &ApiKeyUpdate,
    ) -> Result<Option<ApiKey>> {
        let conn = self.conn();
        let existing = conn
            .query_row(
                &format!(
                    "SELECT {} FROM api_keys WHERE id = ?1 AND user_id = ?2",
                    API_KEY_COLUMNS
                ),
                params![id, user_id],
                row_to_api_key,
            )
            .optional()?;

        let Some(mut key) = existing else {
            return Ok(None);
        };
        update.apply(&mut key);

        // usage is read back rather than written so concurrent increments survive
        let usage: u64 = conn.query_row(
            r#"
            UPDATE api_keys SET name = ?1, "limit" = ?2, limit_enabled = ?3
            WHERE id = ?4 AND user_id = ?5
            RETURNING usage
            "#,
            params![key.name, key.limit, key.limit_enabled, id, user_id],
            |row| row.get(0),
        )?;
        key.usage = usage;

        Ok(Some(key))
    }

    /// Returns false when no key with that id belongs to the user.
    pub fn delete_api_key(&self, id: &str, user_id: &str) -> Result<bool> {
        let deleted = self.conn().execute(
            "DELETE FROM api_keys WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(deleted > 0)
    }

    /// Look a key up by its secret token.
    pub fn find_api_key(&self, key: &str) -> Result<Option<ApiKey>> {
        let key = self
            .conn()
            .query_row(
                &format!("SELECT {} FROM api_keys WHERE key = ?1", API_KEY_COLUMNS),
                params![key],
                row_to_api_key,
            )
            .optional()?;
        Ok(key)
    }

    /// Add one to the usage counter in a single statement. The limit guard is
    /// part of the `WHERE` clause, so `None` means the key is gone or already
    /// at its limit.
    pub fn increment_usage(&self, id: &str) -> Result<Option<u64>> {
        let usage = self
            .conn()
            .query_row(
                r#"
                UPDATE api_keys SET usage = usage + 1
                WHERE id = ?1
                  AND (limit_enabled = 0 OR "limit" IS NULL OR usage < "limit")
                RETURNING usage
                "#,
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(usage)
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        image: row.get(3)?,
        created_at: parse_timestamp(row, 4)?,
    })
}

fn row_to_api_key(row: &Row) -> rusqlite::Result<ApiKey> {
    Ok(ApiKey {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        key: row.get(3)?,
        usage: row.get(4)?,
        limit: row.get(5)?,
        limit_enabled: row.get(6)?,
        created_at: parse_timestamp(row, 7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_with_user() -> (Storage, User) {
        let storage = Storage::in_memory().unwrap();
        let user = storage
            .upsert_user(&NewUser {
                email: "dev@example.com".to_string(),
                name: Some("Dev".to_string()),
                image: None,
            })
            .unwrap();
        (storage, user)
    }

    fn new_key(name: &str, limit: Option<u64>, limit_enabled: bool) -> NewApiKey {
        NewApiKey {
            name: name.to_string(),
            limit,
            limit_enabled,
        }
    }

    #[test]
    fn test_upsert_user_keeps_existing_record() {
        let (storage, user) = storage_with_user();
        let again = storage
            .upsert_user(&NewUser {
                email: "dev@example.com".to_string(),
                name: Some("Renamed".to_string()),
                image: None,
            })
            .unwrap();

        assert_eq!(again.id, user.id);
        assert_eq!(again.name.as_deref(), Some("Dev"));
        assert!(storage.get_user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_api_key_crud_is_scoped_to_owner() {
        let (storage, user) = storage_with_user();
        let other = storage
            .upsert_user(&NewUser {
                email: "other@example.com".to_string(),
                name: None,
                image: None,
            })
            .unwrap();

        let first = storage
            .create_api_key(&user.id, &new_key("first", None, false), "git-insight-1")
            .unwrap();
        let second = storage
            .create_api_key(&user.id, &new_key("second", Some(10), true), "git-insight-2")
            .unwrap();

        let listed = storage.list_api_keys(&user.id).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);

        assert!(storage.get_api_key(&first.id, &other.id).unwrap().is_none());
        assert!(!storage.delete_api_key(&first.id, &other.id).unwrap());
        assert!(storage.list_api_keys(&other.id).unwrap().is_empty());

        let update = ApiKeyUpdate {
            name: Some("renamed".to_string()),
            limit: Some(Some(50)),
            limit_enabled: None,
        };
        assert!(storage.update_api_key(&first.id, &other.id, &update).unwrap().is_none());
        let updated = storage
            .update_api_key(&first.id, &user.id, &update)
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.limit, Some(50));
        assert!(!updated.limit_enabled);

        assert!(storage.delete_api_key(&first.id, &user.id).unwrap());
        assert!(storage.get_api_key(&first.id, &user.id).unwrap().is_none());
    }

    #[test]
    fn test_find_api_key_by_secret() {
        let (storage, user) = storage_with_user();
        let created = storage
            .create_api_key(&user.id, &new_key("ci", None, false), "git-insight-abc")
            .unwrap();

        let found = storage.find_api_key("git-insight-abc").unwrap().unwrap();
        assert_eq!(found, created);
        assert!(storage.find_api_key("git-insight-nope").unwrap().is_none());
    }

    #[test]
    fn test_increment_usage_stops_at_limit() {
        let (storage, user) = storage_with_user();
        let key = storage
            .create_api_key(&user.id, &new_key("limited", Some(2), true), "git-insight-l")
            .unwrap();

        assert_eq!(storage.increment_usage(&key.id).unwrap(), Some(1));
        assert_eq!(storage.increment_usage(&key.id).unwrap(), Some(2));
        assert_eq!(storage.increment_usage(&key.id).unwrap(), None);

        let stored = storage.find_api_key("git-insight-l").unwrap().unwrap();
        assert_eq!(stored.usage, 2);
    }

    #[test]
    fn test_increment_usage_unbounded_when_limit_disabled() {
        let (storage, user) = storage_with_user();
        let key = storage
            .create_api_key(&user.id, &new_key("open", Some(1), false), "git-insight-o")
            .unwrap();

        for expected in 1..=5 {
            assert_eq!(storage.increment_usage(&key.id).unwrap(), Some(expected));
        }
    }

    #[test]
    fn test_increment_usage_unbounded_when_limit_value_missing() {
        let (storage, user) = storage_with_user();
        let key = storage
            .create_api_key(&user.id, &new_key("uncapped", None, true), "git-insight-n")
            .unwrap();

        for expected in 1..=3 {
            assert_eq!(storage.increment_usage(&key.id).unwrap(), Some(expected));
        }
    }

    #[test]
    fn test_update_preserves_usage() {
        let (storage, user) = storage_with_user();
        let key = storage
            .create_api_key(&user.id, &new_key("k", None, false), "git-insight-u")
            .unwrap();
        storage.increment_usage(&key.id).unwrap();
        storage.increment_usage(&key.id).unwrap();

        let updated = storage
            .update_api_key(
                &key.id,
                &user.id,
                &ApiKeyUpdate {
                    limit_enabled: Some(true),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.usage, 2);
        assert!(updated.limit_enabled);
    }
}
