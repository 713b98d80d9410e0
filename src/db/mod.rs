mod database;
mod repository;
mod schema;

pub use database::Db;
pub use repository::{
    delete_entry, entries_in_category, get_all_categories, get_all_entries, insert_category,
    insert_entry,
};
pub use schema::{init_db, SCHEMA};
