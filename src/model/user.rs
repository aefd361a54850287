use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account. The password is stored only as a salted hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    /// Lowercase hex of sha256(password + salt)
    pub password_hash: String,
    pub salt: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
