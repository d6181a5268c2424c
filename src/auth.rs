//! Authorization gate - The collaborator the core consults before admin and
//! friend-facing operations.
//!
//! Credential storage, hashing, and session issuance live outside this crate;
//! the core only asks yes/no questions through [`AuthGate`] and maps a "no"
//! to a permission error. The bundled [`SharedSecretGate`] compares a
//! configured admin token and the cycle's stored shared secret, which is all
//! the single-household deployment needs.

use crate::{
    entities::cycle,
    errors::{Error, Result},
};

/// Yes/no authorization decisions the core consults as preconditions.
pub trait AuthGate {
    /// Whether the presented credential identifies the administrator.
    fn is_authorized_admin(&self, credentials: &str) -> bool;

    /// Whether the presented secret grants friend access to the cycle.
    fn is_authorized_friend_access(&self, cycle: &cycle::Model, secret: Option<&str>) -> bool;
}

/// Gate backed by a configured admin token and per-cycle shared secrets.
#[derive(Debug, Clone)]
pub struct SharedSecretGate {
    admin_token: String,
}

impl SharedSecretGate {
    /// Creates a gate with the given admin token. An empty token locks the
    /// admin side entirely rather than opening it.
    #[must_use]
    pub fn new(admin_token: impl Into<String>) -> Self {
        Self {
            admin_token: admin_token.into(),
        }
    }
}

impl AuthGate for SharedSecretGate {
    fn is_authorized_admin(&self, credentials: &str) -> bool {
        !self.admin_token.is_empty() && credentials == self.admin_token
    }

    fn is_authorized_friend_access(&self, cycle: &cycle::Model, secret: Option<&str>) -> bool {
        match cycle.shared_secret.as_deref() {
            // a cycle without a secret is openly accessible
            None | Some("") => true,
            Some(expected) => secret == Some(expected),
        }
    }
}

/// Fails with a permission error unless the credential identifies the admin.
///
/// # Errors
/// Returns [`Error::PermissionDenied`] on a wrong or missing credential.
pub fn require_admin<G: AuthGate>(gate: &G, credentials: &str) -> Result<()> {
    if gate.is_authorized_admin(credentials) {
        Ok(())
    } else {
        Err(Error::PermissionDenied {
            message: "admin credential rejected".to_string(),
        })
    }
}

/// Fails with a permission error unless the secret grants access to the
/// cycle.
///
/// # Errors
/// Returns [`Error::PermissionDenied`] on a wrong or missing secret.
pub fn require_friend_access<G: AuthGate>(
    gate: &G,
    cycle: &cycle::Model,
    secret: Option<&str>,
) -> Result<()> {
    if gate.is_authorized_friend_access(cycle, secret) {
        Ok(())
    } else {
        Err(Error::PermissionDenied {
            message: format!("access to cycle {} rejected", cycle.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle_with_secret(secret: Option<&str>) -> cycle::Model {
        cycle::Model {
            id: 1,
            name: "Cycle".to_string(),
            status: cycle::CycleStatus::Open,
            shared_secret: secret.map(str::to_string),
            markup_ratio: 1.0,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_admin_token_comparison() {
        let gate = SharedSecretGate::new("letmein");
        assert!(gate.is_authorized_admin("letmein"));
        assert!(!gate.is_authorized_admin("guess"));
        assert!(require_admin(&gate, "letmein").is_ok());
        assert!(matches!(
            require_admin(&gate, "guess").unwrap_err(),
            Error::PermissionDenied { .. }
        ));
    }

    #[test]
    fn test_empty_admin_token_locks_admin_side() {
        let gate = SharedSecretGate::new("");
        assert!(!gate.is_authorized_admin(""));
        assert!(!gate.is_authorized_admin("anything"));
    }

    #[test]
    fn test_cycle_without_secret_is_open() {
        let gate = SharedSecretGate::new("letmein");
        let open = cycle_with_secret(None);
        assert!(gate.is_authorized_friend_access(&open, None));
        assert!(gate.is_authorized_friend_access(&open, Some("whatever")));
    }

    #[test]
    fn test_cycle_secret_must_match() {
        let gate = SharedSecretGate::new("letmein");
        let gated = cycle_with_secret(Some("kava"));
        assert!(gate.is_authorized_friend_access(&gated, Some("kava")));
        assert!(!gate.is_authorized_friend_access(&gated, Some("wrong")));
        assert!(!gate.is_authorized_friend_access(&gated, None));

        assert!(matches!(
            require_friend_access(&gate, &gated, None).unwrap_err(),
            Error::PermissionDenied { .. }
        ));
    }
}
