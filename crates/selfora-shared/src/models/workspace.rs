use serde::{Deserialize, Serialize};

/// A named container scoping a set of pages to one owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub owner_id: String,
}
