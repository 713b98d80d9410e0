use serde::{Deserialize, Serialize};

/// A single blog post.
///
/// `title` is escaped wherever it is displayed; `text` is trusted HTML and is
/// emitted as-is. `category` is a plain label and need not name an existing
/// [`Category`](super::Category).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub posted: String,
    pub category: String,
}

/// Form payload for `POST /add`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEntry {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub category: String,
}

/// Apply the ordering policy to entries fetched in insertion order.
pub fn order_entries(mut entries: Vec<Entry>, latest_first: bool) -> Vec<Entry> {
    if latest_first {
        entries.reverse();
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64) -> Entry {
        Entry {
            id,
            title: format!("Post {id}"),
            text: String::new(),
            posted: String::new(),
            category: String::new(),
        }
    }

    #[test]
    fn latest_first_is_exact_reverse() {
        let entries: Vec<Entry> = (1..=4).map(entry).collect();

        let chronological = order_entries(entries.clone(), false);
        let mut newest = order_entries(entries, true);

        assert_eq!(
            chronological.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        newest.reverse();
        assert_eq!(newest, chronological);
    }
}
