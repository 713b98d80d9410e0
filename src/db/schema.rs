use std::path::Path;

use tokio_rusqlite::Connection;
use tracing::info;

use crate::error::Result;

/// Recreates both tables from scratch. `categories.category` has no UNIQUE
/// constraint and `entries.category` no foreign key; both are plain labels.
pub const SCHEMA: &str = r#"
DROP TABLE IF EXISTS entries;
CREATE TABLE entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    text TEXT NOT NULL,
    posted TEXT NOT NULL,
    category TEXT NOT NULL
);

DROP TABLE IF EXISTS categories;
CREATE TABLE categories (
    category TEXT NOT NULL,
    description TEXT NOT NULL
);
"#;

/// Run the schema script against the store at `db_path`, wiping any existing data.
pub async fn init_db(db_path: &str, schema_path: Option<&Path>) -> Result<()> {
    let schema = match schema_path {
        Some(path) => std::fs::read_to_string(path)?,
        None => SCHEMA.to_string(),
    };

    let conn = Connection::open(db_path).await?;
    conn.call(move |conn| {
        conn.execute_batch(&schema)?;
        Ok(())
    })
    .await?;
    conn.close().await?;

    info!("Initialized database at {db_path}");
    Ok(())
}
