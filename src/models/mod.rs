mod category;
mod entry;

pub use category::{Category, NewCategory};
pub use entry::{order_entries, Entry, NewEntry};
