//! Database schema definitions
//!
//! This module contains the SQL schema for the link store.

/// SQL schema for the link store
pub const SCHEMA_SQL: &str = r#"
-- One row per emitted page
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    link TEXT NOT NULL
);
"#;

/// Statement used for every link record
pub const INSERT_LINK_SQL: &str = "INSERT INTO links (link) VALUES (?1)";

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
