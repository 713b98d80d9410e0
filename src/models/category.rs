use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category: String,
    pub description: String,
}

/// Form payload for `POST /add_category`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub category: String,
    #[serde(default)]
    pub description: String,
}
