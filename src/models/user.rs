use uuid::Uuid;

/// Represents a registered account.
///
/// The password hash never leaves the crate: it is only readable by the stores
/// and the login path.
#[derive(Clone)]
pub struct UserRecord {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's email address, as submitted at signup.
    pub email: String,
    /// The user's display name.
    pub name: String,
    password_hash: String,
}

impl UserRecord {
    pub fn new(id: Uuid, email: String, password_hash: String, name: String) -> Self {
        Self { id, email, name, password_hash }
    }

    pub(crate) fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_hash() {
        let user = UserRecord::new(
            Uuid::new_v4(),
            "a@b.com".into(),
            "$argon2id$secret".into(),
            "Alice".into(),
        );
        let printed = format!("{:?}", user);
        assert!(printed.contains("Alice"));
        assert!(!printed.contains("$argon2id$secret"));
    }
}
