use serde::{Deserialize, Serialize};

/// A customer account, looked up by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub username: String,
    pub active: bool,
}
