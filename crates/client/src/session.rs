//! Session state: the current user and their credential token.
//!
//! The token is held as a [`SecretString`] and only exposed when writing the
//! Authorization header or the storage file. The session itself carries no
//! behavior beyond state transitions; the guard checks live on
//! [`crate::Storefront`], which owns the session.

use secrecy::SecretString;

use crate::types::User;

/// The current browsing context: anonymous, or an authenticated user with a
/// bearer token.
#[derive(Default)]
pub struct Session {
    user: Option<User>,
    token: Option<SecretString>,
}

impl Session {
    /// Create an anonymous session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the session after a successful login, registration, or
    /// startup token resolution.
    pub fn authenticate(&mut self, user: User, token: SecretString) {
        self.user = Some(user);
        self.token = Some(token);
    }

    /// Drop the user and token unconditionally.
    pub fn clear(&mut self) {
        self.user = None;
        self.token = None;
    }

    /// Replace the user profile, keeping the token. Used after profile
    /// updates.
    pub fn update_user(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Whether a user is authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Whether the authenticated user has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|user| user.role.is_admin())
    }

    /// The authenticated user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The credential token, if any.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use vexa_core::{Email, Role, UserId};

    fn user(role: Role) -> User {
        User {
            id: UserId::new("user1"),
            name: "John Doe".to_string(),
            email: Email::parse("john@example.com").unwrap(),
            role,
        }
    }

    #[test]
    fn test_anonymous_by_default() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert!(!session.is_admin());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_authenticate_then_clear() {
        let mut session = Session::new();
        session.authenticate(user(Role::User), SecretString::from("tok"));
        assert!(session.is_authenticated());
        assert!(!session.is_admin());

        session.clear();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_admin_role() {
        let mut session = Session::new();
        session.authenticate(user(Role::Admin), SecretString::from("tok"));
        assert!(session.is_admin());
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut session = Session::new();
        session.authenticate(user(Role::User), SecretString::from("super-secret"));
        let debug = format!("{session:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
