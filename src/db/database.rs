use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use rusqlite::{params_from_iter, types::Value, ErrorCode, Row};
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Store handle scoped to a single request.
///
/// Each request opens its own connection and owns it for the duration of the
/// handler; the connection is closed when the handle is dropped, whichever way
/// the handler exits. Writes go through [`Db::execute`] and only become durable
/// once [`Db::commit`] runs. A handle dropped with uncommitted writes rolls
/// them back.
pub struct Db {
    conn: Connection,
}

impl Db {
    pub async fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Ok(Self { conn })
    }

    /// Run a parameterized read and map every row with `map`.
    ///
    /// Values are only ever bound to placeholders, never spliced into `sql`.
    /// A structural failure (missing table, bad column) comes back as an empty
    /// result instead of an error.
    pub async fn query<T, F>(&self, sql: &'static str, params: Vec<Value>, map: F) -> Result<Vec<T>>
    where
        T: Send + 'static,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    {
        let result = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql)?;
                let rows = stmt
                    .query_map(params_from_iter(params), map)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await;

        match result {
            Ok(rows) => Ok(rows),
            Err(e) if is_structural(&e) => {
                warn!("Query failed, treating as no rows: {e}");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Like [`Db::query`], keeping only the first row.
    pub async fn query_one<T, F>(
        &self,
        sql: &'static str,
        params: Vec<Value>,
        map: F,
    ) -> Result<Option<T>>
    where
        T: Send + 'static,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    {
        let rows = self.query(sql, params, map).await?;
        Ok(rows.into_iter().next())
    }

    /// Run a parameterized write inside the request's transaction, returning
    /// the number of rows affected. A structural failure affects no rows,
    /// same as for reads.
    pub async fn execute(&self, sql: &'static str, params: Vec<Value>) -> Result<usize> {
        let result = self
            .conn
            .call(move |conn| {
                if conn.is_autocommit() {
                    conn.execute_batch("BEGIN")?;
                }
                let affected = conn.execute(sql, params_from_iter(params))?;
                Ok(affected)
            })
            .await;

        match result {
            Ok(affected) => Ok(affected),
            Err(e) if is_structural(&e) => {
                warn!("Write failed, treating as no rows affected: {e}");
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn commit(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                if !conn.is_autocommit() {
                    conn.execute_batch("COMMIT")?;
                }
                Ok(())
            })
            .await?;
        debug!("Committed");
        Ok(())
    }
}

fn is_structural(error: &tokio_rusqlite::Error) -> bool {
    matches!(
        error,
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
            if e.code == ErrorCode::Unknown
    )
}

#[async_trait]
impl FromRequestParts<AppState> for Db {
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self> {
        Db::open(&state.config.db_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;

    async fn fresh() -> (tempfile::NamedTempFile, String) {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().to_string();
        init_db(&path, None).await.unwrap();
        (file, path)
    }

    async fn count_entries(db: &Db) -> i64 {
        db.query_one("SELECT COUNT(*) FROM entries", vec![], |row| row.get(0))
            .await
            .unwrap()
            .unwrap()
    }

    const INSERT: &str =
        "INSERT INTO entries (title, text, posted, category) VALUES (?1, ?2, ?3, ?4)";

    fn row() -> Vec<Value> {
        vec![
            Value::Text("t".into()),
            Value::Text("b".into()),
            Value::Text("now".into()),
            Value::Text("c".into()),
        ]
    }

    #[tokio::test]
    async fn committed_write_is_durable() {
        let (_file, path) = fresh().await;

        let db = Db::open(&path).await.unwrap();
        assert_eq!(db.execute(INSERT, row()).await.unwrap(), 1);
        db.commit().await.unwrap();
        drop(db);

        let db = Db::open(&path).await.unwrap();
        assert_eq!(count_entries(&db).await, 1);
    }

    #[tokio::test]
    async fn uncommitted_write_is_rolled_back() {
        let (_file, path) = fresh().await;

        let db = Db::open(&path).await.unwrap();
        db.execute(INSERT, row()).await.unwrap();
        db.conn.clone().close().await.unwrap();

        let db = Db::open(&path).await.unwrap();
        assert_eq!(count_entries(&db).await, 0);
    }

    #[tokio::test]
    async fn missing_table_reads_as_empty() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let db = Db::open(&file.path().to_string_lossy()).await.unwrap();

        let rows = db
            .query("SELECT id FROM entries", vec![], |row| row.get::<_, i64>(0))
            .await
            .unwrap();
        assert!(rows.is_empty());

        let one = db
            .query_one("SELECT id FROM entries WHERE id = ?1", vec![Value::Integer(1)], |row| {
                row.get::<_, i64>(0)
            })
            .await
            .unwrap();
        assert!(one.is_none());
    }

    #[tokio::test]
    async fn write_to_missing_table_affects_nothing() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let db = Db::open(&file.path().to_string_lossy()).await.unwrap();

        assert_eq!(db.execute(INSERT, row()).await.unwrap(), 0);
        assert_eq!(
            db.execute("DELETE FROM entries WHERE id = ?1", vec![Value::Integer(1)])
                .await
                .unwrap(),
            0
        );
        db.commit().await.unwrap();
    }

    #[tokio::test]
    async fn constraint_violation_still_propagates() {
        let (_file, path) = fresh().await;
        let db = Db::open(&path).await.unwrap();

        let result = db
            .execute(
                INSERT,
                vec![Value::Null, Value::Null, Value::Null, Value::Null],
            )
            .await;
        assert!(matches!(result, Err(AppError::Connection(_))));
    }

    #[tokio::test]
    async fn values_are_bound_not_interpolated() {
        let (_file, path) = fresh().await;
        let db = Db::open(&path).await.unwrap();

        let hostile = "x'); DROP TABLE entries; --";
        db.execute(
            INSERT,
            vec![
                Value::Text(hostile.into()),
                Value::Text("b".into()),
                Value::Text("now".into()),
                Value::Text(hostile.into()),
            ],
        )
        .await
        .unwrap();
        db.commit().await.unwrap();

        let titles = db
            .query("SELECT title FROM entries", vec![], |row| row.get::<_, String>(0))
            .await
            .unwrap();
        assert_eq!(titles, vec![hostile.to_string()]);
    }
}
