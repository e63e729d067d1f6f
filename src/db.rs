use rusqlite::{Connection, Result};
use std::path::Path;

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA encoding = 'UTF-8'", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            doc_key TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            stored_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

pub fn init_db<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_memory_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}
