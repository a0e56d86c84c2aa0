use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a login session.
///
/// The fields other than `token` are what the session store persists; `token`
/// is the store key and travels to the client in the session cookie. `email`
/// and `name` are copied from the user record at issuance and are not kept in
/// sync afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The opaque session identifier.
    #[serde(skip)]
    pub token: String,
    /// Whether the holder has logged in.
    pub authenticated: bool,
    /// The email of the account this session belongs to.
    pub email: String,
    /// The display name of the account this session belongs to.
    pub name: String,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has reached its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
