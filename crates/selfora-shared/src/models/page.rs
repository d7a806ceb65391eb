use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single page in a workspace, as the backend serializes it.
///
/// Pages form a forest via `parent`; `None` means the page is a root of its
/// workspace. `order` is the sibling sort key (ties keep arrival order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub order: f64,
    #[serde(default)]
    pub is_favorite: bool,
    pub workspace_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A page together with its sorted children, recursively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageTreeNode {
    pub page: Page,
    pub children: Vec<PageTreeNode>,
}
