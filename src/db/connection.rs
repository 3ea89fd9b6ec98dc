use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::normalize::normalize_parts;
use crate::errors::StoreError;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

// Thread-local connection slots, one per database path.
thread_local! {
    static DB_CONNS: RefCell<HashMap<String, Connection>> = RefCell::new(HashMap::new());
}

#[derive(Clone, Debug)]
pub struct Database {
    path: String,
}

impl Database {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Provides this thread's connection for `path` to the closure, opening it on first use.
    /// Must not be re-entered from inside `f`.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError>,
    {
        DB_CONNS
            .try_with(|cell| {
                let mut slots = cell
                    .try_borrow_mut()
                    .map_err(|_| StoreError::ConnectionUnavailable)?;
                if !slots.contains_key(&self.path) {
                    let conn = open_connection(&self.path)?;
                    slots.insert(self.path.clone(), conn);
                }
                let conn = slots
                    .get_mut(&self.path)
                    .ok_or(StoreError::ConnectionUnavailable)?;
                f(conn)
            })
            .map_err(|_| StoreError::ConnectionUnavailable)?
    }
}

fn open_connection(path: &str) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    register_functions(&conn)?;
    debug!(path, "opened sqlite connection");
    Ok(conn)
}

/// Registers `norm(a, b, ...)`: the address normalizer as a SQL scalar,
/// so grouping and matching in SQL agree byte-for-byte with Rust-side matching.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "norm",
        -1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(normalize_args(ctx)),
    )
}

fn normalize_args(ctx: &Context<'_>) -> String {
    let fragments: Vec<Option<String>> = (0..ctx.len())
        .map(|i| match ctx.get_raw(i) {
            ValueRef::Null | ValueRef::Blob(_) => None,
            ValueRef::Integer(n) => Some(n.to_string()),
            ValueRef::Real(r) => Some(r.to_string()),
            ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        })
        .collect();
    normalize_parts(fragments.iter().map(|f| f.as_deref()))
}

/// Apply the embedded schema. Idempotent.
pub fn init_db(db: &Database) -> Result<(), StoreError> {
    db.with_conn(|conn| {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| StoreError::Schema(format!("Failed to apply schema: {e}")))
    })?;

    info!(path = db.path(), "database initialized");
    Ok(())
}
