use super::{PersistenceError, PersistenceResult, Record, TrackerDocument, TrackerStore};
use rusqlite::{Connection, Transaction, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Mutex;

/// One table per record kind, each row holding the record as JSON.
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS store_meta (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                initialized_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS exercises (
                id INTEGER PRIMARY KEY,
                record_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS schedule (
                id INTEGER PRIMARY KEY,
                record_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS progress (
                id INTEGER PRIMARY KEY,
                record_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_records<R: Record + Serialize>(
        tx: &Transaction,
        records: &[R],
    ) -> PersistenceResult<()> {
        let table = R::KIND.as_str();
        tx.execute(&format!("DELETE FROM {table}"), [])?;
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {table} (id, record_json) VALUES (?1, ?2)"
        ))?;
        for record in records {
            let json = serde_json::to_string(record)?;
            stmt.execute(params![record.id(), json])?;
        }
        Ok(())
    }

    fn load_records<R: Record + DeserializeOwned>(conn: &Connection) -> PersistenceResult<Vec<R>> {
        let table = R::KIND.as_str();
        let mut stmt = conn.prepare(&format!("SELECT record_json FROM {table} ORDER BY id ASC"))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut records = Vec::new();
        for json in rows {
            records.push(serde_json::from_str(&json?)?);
        }
        Ok(records)
    }
}

impl TrackerStore for SqliteStore {
    fn save_document(&self, document: &TrackerDocument) -> PersistenceResult<()> {
        let mut conn = self
            .connection
            .lock()
            .map_err(|_| PersistenceError::Poisoned)?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO store_meta (id, initialized_at) VALUES (1, datetime('now'))",
            [],
        )?;
        Self::save_records(&tx, &document.exercises)?;
        Self::save_records(&tx, &document.schedule)?;
        Self::save_records(&tx, &document.progress)?;
        tx.commit()?;
        Ok(())
    }

    fn load_document(&self) -> PersistenceResult<Option<TrackerDocument>> {
        let conn = self
            .connection
            .lock()
            .map_err(|_| PersistenceError::Poisoned)?;
        let initialized: i64 =
            conn.query_row("SELECT COUNT(*) FROM store_meta", [], |row| row.get(0))?;
        if initialized == 0 {
            return Ok(None);
        }
        Ok(Some(TrackerDocument {
            exercises: Self::load_records(&conn)?,
            schedule: Self::load_records(&conn)?,
            progress: Self::load_records(&conn)?,
        }))
    }
}
