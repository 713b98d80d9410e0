use rusqlite::{types::Value, Row};

use crate::error::Result;
use crate::models::{Category, Entry, NewCategory, NewEntry};

use super::Db;

// Entry operations

/// All entries in insertion order.
pub async fn get_all_entries(db: &Db) -> Result<Vec<Entry>> {
    db.query(
        "SELECT id, title, text, posted, category FROM entries ORDER BY id ASC",
        vec![],
        entry_from_row,
    )
    .await
}

/// Entries whose category is exactly `category`, in insertion order.
pub async fn entries_in_category(db: &Db, category: &str) -> Result<Vec<Entry>> {
    db.query(
        "SELECT id, title, text, posted, category FROM entries WHERE category = ?1 ORDER BY id ASC",
        vec![Value::Text(category.to_string())],
        entry_from_row,
    )
    .await
}

pub async fn insert_entry(db: &Db, entry: NewEntry, posted: String) -> Result<()> {
    db.execute(
        "INSERT INTO entries (title, text, posted, category) VALUES (?1, ?2, ?3, ?4)",
        vec![
            Value::Text(entry.title),
            Value::Text(entry.text),
            Value::Text(posted),
            Value::Text(entry.category),
        ],
    )
    .await?;
    db.commit().await
}

/// Returns the number of rows removed; zero when `id` does not exist.
pub async fn delete_entry(db: &Db, id: i64) -> Result<usize> {
    let removed = db
        .execute("DELETE FROM entries WHERE id = ?1", vec![Value::Integer(id)])
        .await?;
    db.commit().await?;
    Ok(removed)
}

// Category operations

pub async fn get_all_categories(db: &Db) -> Result<Vec<Category>> {
    db.query(
        "SELECT category, description FROM categories",
        vec![],
        category_from_row,
    )
    .await
}

pub async fn insert_category(db: &Db, category: NewCategory) -> Result<()> {
    db.execute(
        "INSERT INTO categories (category, description) VALUES (?1, ?2)",
        vec![
            Value::Text(category.category),
            Value::Text(category.description),
        ],
    )
    .await?;
    db.commit().await
}

fn entry_from_row(row: &Row) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: row.get(0)?,
        title: row.get(1)?,
        text: row.get(2)?,
        posted: row.get(3)?,
        category: row.get(4)?,
    })
}

fn category_from_row(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        category: row.get(0)?,
        description: row.get(1)?,
    })
}
