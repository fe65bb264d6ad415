//! Error types for inventack-authz

use thiserror::Error;

use crate::permission::Permission;
use crate::role::Role;

/// The main error type for inventack-authz operations.
///
/// The permission engine itself never produces one of these: a query against
/// an unknown role or permission simply answers `false`. Errors come from the
/// boundaries around it (parsing, gating a mutation, the membership store).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// A role string outside `admin`, `manager`, `member`.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// A permission string outside the vocabulary.
    #[error("unknown permission: {0}")]
    UnknownPermission(String),

    /// The acting role lacks the permission the operation needs.
    #[error("you don't have permission to {}", permission.label().to_lowercase())]
    Forbidden {
        /// Role the actor held, `None` when it could not be resolved.
        role: Option<Role>,
        /// Permission the operation required.
        permission: Permission,
    },

    /// The check was made against a different organization than the session's.
    #[error("role was resolved for {current:?}, not for organization {requested}")]
    WrongOrganization {
        current: Option<String>,
        requested: String,
    },

    #[error("invalid {kind} id: {reason}")]
    InvalidId { kind: &'static str, reason: String },

    #[error("membership store not initialized")]
    NotInitialized,

    #[error("membership store already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("{user} is not a member of {organization}")]
    NotAMember { organization: String, user: String },

    #[error("organization {0} already exists")]
    OrganizationExists(String),

    #[error("organization {0} does not exist")]
    OrganizationNotFound(String),

    /// The change would leave the organization without an admin.
    #[error("organization {0} must keep at least one admin")]
    LastAdmin(String),

    #[error("members cannot change their own role")]
    SelfRoleChange,

    #[error("invitation not found")]
    InvitationNotFound,

    #[error("invitation is already {0}")]
    InvitationClosed(String),

    /// Storage or I/O failure, stringified.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type alias for inventack-authz operations
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Convert any storage error to AuthzError
pub fn err<E: std::error::Error>(e: E) -> AuthzError {
    AuthzError::Storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_message_names_the_action() {
        let e = AuthzError::Forbidden {
            role: Some(Role::Member),
            permission: Permission::OrderApprove,
        };
        assert_eq!(e.to_string(), "you don't have permission to approve orders");
    }

    #[test]
    fn storage_errors_are_stringified() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(err(io), AuthzError::Storage("disk full".into()));
    }
}
