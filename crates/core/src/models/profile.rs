use serde::{Deserialize, Serialize};

/// A row of the `profiles` table, keyed by the identity service's user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}
