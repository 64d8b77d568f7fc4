//! SQLite persistence of the stub: datasets with a draft and a published
//! copy, uploaded images, accounts and sessions.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::config::StubConfig;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS datasets (
    key TEXT PRIMARY KEY,
    draft TEXT,
    draft_version INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT,
    published TEXT,
    published_version INTEGER
);
CREATE TABLE IF NOT EXISTS images (
    id TEXT PRIMARY KEY,
    filename TEXT NOT NULL,
    mime TEXT NOT NULL,
    bytes BLOB NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY,
    email TEXT NOT NULL DEFAULT '',
    salt TEXT NOT NULL,
    password_md5 TEXT NOT NULL,
    role TEXT NOT NULL,
    profile TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    created_at TEXT NOT NULL
);
";

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MEMBER: &str = "member";

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct StubState {
    pub db: Arc<Mutex<Connection>>,
    pub config: Arc<StubConfig>,
}

impl StubState {
    pub fn open(config: StubConfig) -> Result<Self, String> {
        let conn = if config.db_path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(&config.db_path)
        }
        .map_err(|e| e.to_string())?;
        init(&conn, &config)?;
        Ok(StubState {
            db: Arc::new(Mutex::new(conn)),
            config: Arc::new(config),
        })
    }

    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, String> {
        self.db.lock().map_err(|_| "Database lock poisoned".to_string())
    }
}

/// Creates the tables and the configured admin account.
fn init(conn: &Connection, config: &StubConfig) -> Result<(), String> {
    conn.execute_batch(SCHEMA).map_err(|e| e.to_string())?;
    if find_user(conn, &config.admin_user)?.is_none() {
        create_user(conn, &config.admin_user, "", &config.admin_password, ROLE_ADMIN)?;
        info!("Created admin account '{}'", config.admin_user);
    }
    Ok(())
}

pub fn now_millis() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
        .to_string()
}

// Local stub only: salted md5 is not a password hash to ship.
fn hash_password(salt: &str, password: &str) -> String {
    format!("{:x}", md5::compute(format!("{salt}:{password}")))
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
    salt: String,
    password_md5: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    pub fn check_password(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.password_md5
    }
}

pub fn find_user(conn: &Connection, username: &str) -> Result<Option<User>, String> {
    conn.query_row(
        "SELECT username, email, role, created_at, salt, password_md5 FROM users WHERE username = ?1",
        params![username],
        |row| {
            Ok(User {
                username: row.get(0)?,
                email: row.get(1)?,
                role: row.get(2)?,
                created_at: row.get(3)?,
                salt: row.get(4)?,
                password_md5: row.get(5)?,
            })
        },
    )
    .optional()
    .map_err(|e| e.to_string())
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>, String> {
    let mut stmt = conn
        .prepare("SELECT username, email, role, created_at, salt, password_md5 FROM users ORDER BY username")
        .map_err(|e| e.to_string())?;
    let users = stmt
        .query_map([], |row| {
            Ok(User {
                username: row.get(0)?,
                email: row.get(1)?,
                role: row.get(2)?,
                created_at: row.get(3)?,
                salt: row.get(4)?,
                password_md5: row.get(5)?,
            })
        })
        .map_err(|e| e.to_string())?
        .filter_map(Result::ok)
        .collect();
    Ok(users)
}

pub fn create_user(conn: &Connection, username: &str, email: &str, password: &str, role: &str) -> Result<(), String> {
    let salt = Uuid::new_v4().simple().to_string();
    conn.execute(
        "INSERT INTO users (username, email, salt, password_md5, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![username, email, &salt, hash_password(&salt, password), role, now_millis()],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

pub fn set_password(conn: &Connection, username: &str, password: &str) -> Result<(), String> {
    let salt = Uuid::new_v4().simple().to_string();
    conn.execute(
        "UPDATE users SET salt = ?1, password_md5 = ?2 WHERE username = ?3",
        params![&salt, hash_password(&salt, password), username],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

pub fn read_profile(conn: &Connection, username: &str) -> Result<Option<String>, String> {
    conn.query_row("SELECT profile FROM users WHERE username = ?1", params![username], |row| row.get(0))
        .optional()
        .map_err(|e| e.to_string())
}

pub fn write_profile(conn: &Connection, username: &str, profile: &str) -> Result<(), String> {
    conn.execute("UPDATE users SET profile = ?1 WHERE username = ?2", params![profile, username])
        .map_err(|e| e.to_string())?;
    Ok(())
}

pub fn open_session(conn: &Connection, username: &str) -> Result<String, String> {
    let token = Uuid::new_v4().simple().to_string();
    conn.execute(
        "INSERT INTO sessions (token, username, created_at) VALUES (?1, ?2, ?3)",
        params![&token, username, now_millis()],
    )
    .map_err(|e| e.to_string())?;
    Ok(token)
}

/// The account behind a session token, if the token is known.
pub fn session_user(conn: &Connection, token: &str) -> Result<Option<User>, String> {
    let username: Option<String> = conn
        .query_row("SELECT username FROM sessions WHERE token = ?1", params![token], |row| row.get(0))
        .optional()
        .map_err(|e| e.to_string())?;
    match username {
        Some(username) => find_user(conn, &username),
        None => Ok(None),
    }
}

/// Row of the `datasets` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetRow {
    pub draft: Option<String>,
    pub draft_version: i64,
    pub updated_at: Option<String>,
    pub published: Option<String>,
    pub published_version: Option<i64>,
}

pub fn load_dataset(conn: &Connection, key: &str) -> Result<DatasetRow, String> {
    let row = conn
        .query_row(
            "SELECT draft, draft_version, updated_at, published, published_version FROM datasets WHERE key = ?1",
            params![key],
            |row| {
                Ok(DatasetRow {
                    draft: row.get(0)?,
                    draft_version: row.get(1)?,
                    updated_at: row.get(2)?,
                    published: row.get(3)?,
                    published_version: row.get(4)?,
                })
            },
        )
        .optional()
        .map_err(|e| e.to_string())?;
    Ok(row.unwrap_or_default())
}

/// Replaces the draft and returns its new version.
pub fn save_draft(conn: &Connection, key: &str, draft: &str) -> Result<i64, String> {
    conn.execute(
        "INSERT INTO datasets (key, draft, draft_version, updated_at) VALUES (?1, ?2, 1, ?3)
         ON CONFLICT(key) DO UPDATE SET draft = excluded.draft,
             draft_version = datasets.draft_version + 1,
             updated_at = excluded.updated_at",
        params![key, draft, now_millis()],
    )
    .map_err(|e| e.to_string())?;
    Ok(load_dataset(conn, key)?.draft_version)
}

/// Writes the resolved draft to both columns, so the draft keeps durable URLs too.
pub fn promote(conn: &Connection, key: &str, resolved: &str, version: i64) -> Result<(), String> {
    conn.execute(
        "UPDATE datasets SET draft = ?1, published = ?1, published_version = ?2 WHERE key = ?3",
        params![resolved, version, key],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

/// Published version of every dataset that has been published.
pub fn published_versions(conn: &Connection) -> Result<Vec<(String, i64)>, String> {
    let mut stmt = conn
        .prepare("SELECT key, published_version FROM datasets WHERE published_version IS NOT NULL ORDER BY key")
        .map_err(|e| e.to_string())?;
    let versions = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(|e| e.to_string())?
        .filter_map(Result::ok)
        .collect();
    Ok(versions)
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

pub fn insert_image(conn: &Connection, id: &str, image: &StoredImage) -> Result<(), String> {
    conn.execute(
        "INSERT INTO images (id, filename, mime, bytes, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, &image.filename, &image.mime, &image.bytes, now_millis()],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

pub fn find_image(conn: &Connection, id: &str) -> Result<Option<StoredImage>, String> {
    conn.query_row(
        "SELECT filename, mime, bytes FROM images WHERE id = ?1",
        params![id],
        |row| {
            Ok(StoredImage {
                filename: row.get(0)?,
                mime: row.get(1)?,
                bytes: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> StubState {
        StubState::open(StubConfig {
            db_path: ":memory:".into(),
            ..StubConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn admin_account_is_seeded() {
        let state = state();
        let conn = state.conn().unwrap();
        let admin = find_user(&conn, "admin").unwrap().unwrap();
        assert!(admin.is_admin());
        assert!(admin.check_password("admin"));
        assert!(!admin.check_password("Admin"));
    }

    #[test]
    fn draft_versions_increase_and_publish_copies() {
        let state = state();
        let conn = state.conn().unwrap();
        assert_eq!(load_dataset(&conn, "providers").unwrap(), DatasetRow::default());

        assert_eq!(save_draft(&conn, "providers", "{}").unwrap(), 1);
        assert_eq!(save_draft(&conn, "providers", r#"{"a":{}}"#).unwrap(), 2);
        assert!(published_versions(&conn).unwrap().is_empty());

        promote(&conn, "providers", r#"{"a":{}}"#, 2).unwrap();
        let row = load_dataset(&conn, "providers").unwrap();
        assert_eq!(row.published.as_deref(), Some(r#"{"a":{}}"#));
        assert_eq!(published_versions(&conn).unwrap(), vec![("providers".to_string(), 2)]);
    }

    #[test]
    fn sessions_resolve_to_users_on_a_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stub.sqlite");
        let state = StubState::open(StubConfig {
            db_path: path.to_string_lossy().into_owned(),
            ..StubConfig::default()
        })
        .unwrap();
        let conn = state.conn().unwrap();
        let token = open_session(&conn, "admin").unwrap();
        assert_eq!(session_user(&conn, &token).unwrap().unwrap().username, "admin");
        assert!(session_user(&conn, "nope").unwrap().is_none());

        set_password(&conn, "admin", "changed").unwrap();
        assert!(find_user(&conn, "admin").unwrap().unwrap().check_password("changed"));
    }
}
