//! Provider-neutral item representation

use serde::{Deserialize, Serialize};

/// A remote resource as the rest of the system sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationItem {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    pub name: String,
    pub directory: bool,
    pub parent_id: Option<String>,
    pub parent_path_or_name: Option<String>,
    pub url: Option<String>,
    pub visibility: bool,
}
