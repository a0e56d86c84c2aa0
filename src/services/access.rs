use crate::models::session::Session;

/// The outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// The holder may proceed; carries the session snapshot for display.
    Allow(Session),
    /// The holder must be sent back to the public entry point.
    Deny,
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allow(_))
    }

    /// The display name of an allowed holder.
    pub fn name(&self) -> Option<&str> {
        match self {
            Access::Allow(session) => Some(&session.name),
            Access::Deny => None,
        }
    }
}

/// Decides whether a request may reach a protected resource.
///
/// Only a present, authenticated session is allowed through.
pub fn authorize(session: Option<Session>) -> Access {
    match session {
        Some(session) if session.authenticated => Access::Allow(session),
        _ => Access::Deny,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(authenticated: bool) -> Session {
        Session {
            token: "t".into(),
            authenticated,
            email: "a@b.com".into(),
            name: "Alice".into(),
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn allows_only_authenticated_sessions() {
        let allowed = authorize(Some(session(true)));
        assert!(allowed.is_allowed());
        assert_eq!(allowed.name(), Some("Alice"));

        assert_eq!(authorize(Some(session(false))), Access::Deny);
        assert_eq!(authorize(None), Access::Deny);
        assert_eq!(Access::Deny.name(), None);
    }
}
