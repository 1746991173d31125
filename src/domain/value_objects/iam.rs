use serde::{Deserialize, Serialize};

/// Per-request identity supplied by the external identity provider.
/// The token identifier is the stable, opaque key accounts are stored under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserIdentity {
    pub token_identifier: String,
    pub name: String,
    pub email: String,
    pub picture_url: Option<String>,
}
