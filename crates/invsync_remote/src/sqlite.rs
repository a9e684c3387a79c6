//! SQLite implementation of the remote store.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use invsync_model::{Activity, ActivityKey, Exchange, Version};

use crate::error::{RemoteResult, RemoteStoreError};
use crate::store::RemoteStore;

/// DDL for one schema namespace; `{s}` is replaced by the namespace prefix.
///
/// The `activities` view joins activity rows to their database membership,
/// which is what `(database, code)` version lookups go through.
const SCHEMA_TEMPLATE: &str = r#"
CREATE TABLE IF NOT EXISTS "{s}_database" (
    name TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS "{s}_activity" (
    key TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    type TEXT NOT NULL,
    unit TEXT NOT NULL,
    version INTEGER NOT NULL,
    comment TEXT
);

CREATE TABLE IF NOT EXISTS "{s}_activity_database" (
    key TEXT NOT NULL,
    database TEXT NOT NULL,
    PRIMARY KEY (key, database),
    FOREIGN KEY (key) REFERENCES "{s}_activity"(key)
);

CREATE TABLE IF NOT EXISTS "{s}_exchange" (
    key TEXT NOT NULL,
    input TEXT NOT NULL,
    amount REAL NOT NULL,
    unit TEXT NOT NULL,
    type TEXT NOT NULL,
    uncertainty_type INTEGER NOT NULL DEFAULT 0,
    comment TEXT,
    version INTEGER NOT NULL,
    PRIMARY KEY (key, input),
    FOREIGN KEY (key) REFERENCES "{s}_activity"(key)
);

CREATE INDEX IF NOT EXISTS "{s}_idx_membership_database"
    ON "{s}_activity_database"(database);
CREATE INDEX IF NOT EXISTS "{s}_idx_exchange_input"
    ON "{s}_exchange"(input);

CREATE VIEW IF NOT EXISTS "{s}_activities" AS
    SELECT a.key, a.name, a.location, a.type, a.unit, a.version, a.comment,
           m.database AS database
    FROM "{s}_activity" AS a
    JOIN "{s}_activity_database" AS m ON m.key = a.key;
"#;

/// A SQLite-backed remote store.
///
/// All four relations live under a schema namespace given at open time, so
/// one database file can hold several independent remote schemas. The DDL is
/// idempotent and runs on every open.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    schema: String,
}

impl SqliteStore {
    /// Opens (creating if needed) the store at `path` under the given
    /// schema namespace.
    ///
    /// # Errors
    ///
    /// Fails when the namespace is not a valid identifier or the database
    /// cannot be opened or migrated.
    pub fn open(path: &Path, schema: &str) -> RemoteResult<Self> {
        validate_schema_name(schema)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )?;
        Self::bootstrap(conn, schema)
    }

    /// Opens an in-memory store under the given schema namespace.
    ///
    /// # Errors
    ///
    /// Fails when the namespace is not a valid identifier.
    pub fn open_in_memory(schema: &str) -> RemoteResult<Self> {
        validate_schema_name(schema)?;
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::bootstrap(conn, schema)
    }

    fn bootstrap(conn: Connection, schema: &str) -> RemoteResult<Self> {
        conn.execute_batch(&SCHEMA_TEMPLATE.replace("{s}", schema))?;
        debug!(schema, "remote schema ready");
        Ok(Self {
            conn,
            schema: schema.to_owned(),
        })
    }

    /// Returns the schema namespace this store operates in.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    fn table(&self, name: &str) -> String {
        format!("\"{}_{}\"", self.schema, name)
    }

    fn read_activity_row(database: &str, row: &rusqlite::Row<'_>) -> rusqlite::Result<Activity> {
        Ok(Activity {
            key: ActivityKey::new(database, row.get::<_, String>(0)?),
            name: row.get(1)?,
            location: row.get(2)?,
            activity_type: row.get(3)?,
            unit: row.get(4)?,
            version: Version::new(row.get::<_, i64>(5)? as u64),
            comment: row.get(6)?,
        })
    }

    fn read_exchange_row(database: &str, row: &rusqlite::Row<'_>) -> rusqlite::Result<Exchange> {
        Ok(Exchange {
            input: ActivityKey::new(database, row.get::<_, String>(0)?),
            amount: row.get(1)?,
            unit: row.get(2)?,
            exchange_type: row.get(3)?,
            uncertainty_type: row.get::<_, i64>(4)? as u32,
            comment: row.get(5)?,
            version: Version::new(row.get::<_, i64>(6)? as u64),
        })
    }
}

impl RemoteStore for SqliteStore {
    fn database_registered(&self, database: &str) -> RemoteResult<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE name = ?1", self.table("database"));
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let found = stmt.query_row(params![database], |_| Ok(())).optional()?;
        Ok(found.is_some())
    }

    fn register_database(&self, database: &str) -> RemoteResult<()> {
        let sql = format!(
            "INSERT OR IGNORE INTO {} (name) VALUES (?1)",
            self.table("database")
        );
        self.conn.execute(&sql, params![database])?;
        Ok(())
    }

    fn activity_version(&self, database: &str, code: &str) -> RemoteResult<Option<Version>> {
        let sql = format!(
            "SELECT version FROM {} WHERE key = ?1 AND database = ?2",
            self.table("activities")
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let version = stmt
            .query_row(params![code, database], |row| row.get::<_, i64>(0))
            .optional()?;
        Ok(version.map(|v| Version::new(v as u64)))
    }

    fn activity_exists(
        &self,
        database: &str,
        code: &str,
        min_version: Version,
    ) -> RemoteResult<bool> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE key = ?1 AND database = ?2 AND version >= ?3",
            self.table("activities")
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let found = stmt
            .query_row(params![code, database, min_version.as_u64() as i64], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn get_activity(&self, database: &str, code: &str) -> RemoteResult<Activity> {
        let sql = format!(
            "SELECT key, name, location, type, unit, version, comment
             FROM {} WHERE key = ?1 AND database = ?2",
            self.table("activities")
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        stmt.query_row(params![code, database], |row| {
            Self::read_activity_row(database, row)
        })
        .optional()?
        .ok_or_else(|| RemoteStoreError::not_found(database, code))
    }

    fn activities_in(&self, database: &str) -> RemoteResult<Vec<Activity>> {
        let sql = format!(
            "SELECT key, name, location, type, unit, version, comment
             FROM {} WHERE database = ?1 ORDER BY key",
            self.table("activities")
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![database], |row| {
            Self::read_activity_row(database, row)
        })?;
        let mut activities = Vec::new();
        for row in rows {
            activities.push(row?);
        }
        Ok(activities)
    }

    fn insert_activity(&self, activity: &Activity) -> RemoteResult<()> {
        // One logical entity write: the row plus its membership, in a
        // single transaction.
        let tx = self.conn.unchecked_transaction()?;
        let insert_row = format!(
            "INSERT INTO {} (key, name, location, type, unit, version, comment)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            self.table("activity")
        );
        tx.execute(
            &insert_row,
            params![
                activity.key.code,
                activity.name,
                activity.location,
                activity.activity_type,
                activity.unit,
                activity.version.as_u64() as i64,
                activity.comment,
            ],
        )?;
        let insert_membership = format!(
            "INSERT INTO {} (key, database) VALUES (?1, ?2)",
            self.table("activity_database")
        );
        tx.execute(&insert_membership, params![activity.key.code, activity.key.database])?;
        tx.commit()?;
        debug!(key = %activity.key, version = %activity.version, "remote activity inserted");
        Ok(())
    }

    fn update_activity(&self, activity: &Activity) -> RemoteResult<()> {
        let sql = format!(
            "UPDATE {} SET name = ?2, location = ?3, type = ?4, unit = ?5,
                           version = ?6, comment = ?7
             WHERE key = ?1",
            self.table("activity")
        );
        self.conn.execute(
            &sql,
            params![
                activity.key.code,
                activity.name,
                activity.location,
                activity.activity_type,
                activity.unit,
                activity.version.as_u64() as i64,
                activity.comment,
            ],
        )?;
        debug!(key = %activity.key, version = %activity.version, "remote activity updated");
        Ok(())
    }

    fn exchange_version(
        &self,
        owner_code: &str,
        input_code: &str,
    ) -> RemoteResult<Option<Version>> {
        let sql = format!(
            "SELECT version FROM {} WHERE key = ?1 AND input = ?2",
            self.table("exchange")
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let version = stmt
            .query_row(params![owner_code, input_code], |row| row.get::<_, i64>(0))
            .optional()?;
        Ok(version.map(|v| Version::new(v as u64)))
    }

    fn exchanges_of(&self, database: &str, owner_code: &str) -> RemoteResult<Vec<Exchange>> {
        let sql = format!(
            "SELECT input, amount, unit, type, uncertainty_type, comment, version
             FROM {} WHERE key = ?1 ORDER BY input",
            self.table("exchange")
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![owner_code], |row| {
            Self::read_exchange_row(database, row)
        })?;
        let mut exchanges = Vec::new();
        for row in rows {
            exchanges.push(row?);
        }
        Ok(exchanges)
    }

    fn insert_exchange(&self, owner_code: &str, exchange: &Exchange) -> RemoteResult<()> {
        let sql = format!(
            "INSERT INTO {} (key, input, amount, unit, type, uncertainty_type, comment, version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            self.table("exchange")
        );
        self.conn.execute(
            &sql,
            params![
                owner_code,
                exchange.input.code,
                exchange.amount,
                exchange.unit,
                exchange.exchange_type,
                i64::from(exchange.uncertainty_type),
                exchange.comment,
                exchange.version.as_u64() as i64,
            ],
        )?;
        debug!(owner = owner_code, input = %exchange.input, "remote exchange inserted");
        Ok(())
    }

    fn update_exchange(&self, owner_code: &str, exchange: &Exchange) -> RemoteResult<()> {
        let sql = format!(
            "UPDATE {} SET amount = ?3, unit = ?4, type = ?5, uncertainty_type = ?6,
                           comment = ?7, version = ?8
             WHERE key = ?1 AND input = ?2",
            self.table("exchange")
        );
        self.conn.execute(
            &sql,
            params![
                owner_code,
                exchange.input.code,
                exchange.amount,
                exchange.unit,
                exchange.exchange_type,
                i64::from(exchange.uncertainty_type),
                exchange.comment,
                exchange.version.as_u64() as i64,
            ],
        )?;
        debug!(owner = owner_code, input = %exchange.input, "remote exchange updated");
        Ok(())
    }
}

fn validate_schema_name(schema: &str) -> RemoteResult<()> {
    let valid = !schema.is_empty()
        && schema
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RemoteStoreError::InvalidSchemaName {
            schema: schema.to_owned(),
        })
    }
}
