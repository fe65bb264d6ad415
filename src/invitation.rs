//! Invitations into an organization
//!
//! An invitation carries the role the invitee will get on acceptance.
//! The caller receives a one-time token; only its SHA-256 hash is stored.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum::Display;
use tracing::info;

use crate::db::{current_epoch, read, write};
use crate::error::{err, AuthzError, Result};
use crate::gate;
use crate::keys::{invite_key, prefix, validate_id};
use crate::membership::{get_role, insert_membership, Membership};
use crate::permission::Permission;
use crate::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub organization_id: String,
    pub email: String,
    pub role: Role,
    pub status: InvitationStatus,
    pub invited_by: String,
    /// Epoch milliseconds
    pub created_at: u64,
}

/// Generate a token (32 random bytes, base64url without padding)
pub fn generate_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes).map_err(|e| AuthzError::Storage(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash token with SHA-256 for storage
fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    validate_id("email", &email)?;
    if !email.contains('@') {
        return Err(AuthzError::InvalidId { kind: "email", reason: "missing @".into() });
    }
    Ok(email)
}

/// Invite `email` into the organization with `role`. The actor needs
/// `user:invite`. A newer invitation to the same address replaces the
/// pending one. Returns the token to hand to the invitee.
pub fn invite(actor: &str, organization_id: &str, email: &str, role: Role) -> Result<String> {
    validate_id("organization", organization_id)?;
    validate_id("user", actor)?;
    let email = normalize_email(email)?;
    let token = generate_token()?;
    let hash = hash_token(&token);
    write(|d, tx| {
        gate::require(get_role(d, tx, organization_id, actor)?, Permission::UserInvite)?;
        let idx = invite_key(organization_id, &email);
        let previous = d.invites_by_org.get(tx, &idx).map_err(err)?.map(str::to_string);
        if let Some(previous) = previous {
            d.invites.delete(tx, &previous).map_err(err)?;
        }
        let inv = Invitation {
            organization_id: organization_id.to_string(),
            email: email.clone(),
            role,
            status: InvitationStatus::Pending,
            invited_by: actor.to_string(),
            created_at: current_epoch(),
        };
        d.invites.put(tx, &hash, &inv).map_err(err)?;
        d.invites_by_org.put(tx, &idx, &hash).map_err(err)
    })?;
    info!(organization_id, actor, email = %email, role = %role, "invitation created");
    Ok(token)
}

/// Look up an invitation by token
pub fn invitation(token: &str) -> Result<Option<Invitation>> {
    let hash = hash_token(token);
    read(|d, tx| d.invites.get(tx, &hash).map_err(err))
}

/// Accept a pending invitation as `user_id`, creating the membership with
/// the invited role. An existing membership keeps its current role.
///
/// The token is a bearer credential: it is not matched against the invited
/// email, so whoever holds it can accept.
pub fn accept_invitation(token: &str, user_id: &str) -> Result<Membership> {
    validate_id("user", user_id)?;
    let hash = hash_token(token);
    let m = write(|d, tx| {
        let mut inv = d.invites.get(tx, &hash).map_err(err)?.ok_or(AuthzError::InvitationNotFound)?;
        if inv.status != InvitationStatus::Pending {
            return Err(AuthzError::InvitationClosed(inv.status.to_string()));
        }
        let m = insert_membership(d, tx, &inv.organization_id, user_id, inv.role, Some(&inv.invited_by))?;
        inv.status = InvitationStatus::Accepted;
        d.invites.put(tx, &hash, &inv).map_err(err)?;
        d.invites_by_org.delete(tx, &invite_key(&inv.organization_id, &inv.email)).map_err(err)?;
        Ok(m)
    })?;
    info!(organization_id = %m.organization_id, user_id, role = %m.role, "invitation accepted");
    Ok(m)
}

/// Decline a pending invitation
pub fn decline_invitation(token: &str) -> Result<()> {
    let hash = hash_token(token);
    write(|d, tx| {
        let mut inv = d.invites.get(tx, &hash).map_err(err)?.ok_or(AuthzError::InvitationNotFound)?;
        if inv.status != InvitationStatus::Pending {
            return Err(AuthzError::InvitationClosed(inv.status.to_string()));
        }
        inv.status = InvitationStatus::Declined;
        d.invites.put(tx, &hash, &inv).map_err(err)?;
        d.invites_by_org.delete(tx, &invite_key(&inv.organization_id, &inv.email)).map_err(err)?;
        Ok(())
    })
}

/// Withdraw the pending invitation for `email`. The actor needs `user:invite`.
pub fn cancel_invitation(actor: &str, organization_id: &str, email: &str) -> Result<bool> {
    validate_id("organization", organization_id)?;
    validate_id("user", actor)?;
    let email = normalize_email(email)?;
    let removed = write(|d, tx| {
        gate::require(get_role(d, tx, organization_id, actor)?, Permission::UserInvite)?;
        let idx = invite_key(organization_id, &email);
        let hash = d.invites_by_org.get(tx, &idx).map_err(err)?.map(str::to_string);
        match hash {
            Some(hash) => {
                d.invites.delete(tx, &hash).map_err(err)?;
                d.invites_by_org.delete(tx, &idx).map_err(err)
            }
            None => Ok(false),
        }
    })?;
    if removed {
        info!(organization_id, actor, email = %email, "invitation cancelled");
    }
    Ok(removed)
}

/// Pending invitations of an organization, ordered by email
pub fn pending_invitations(organization_id: &str) -> Result<Vec<Invitation>> {
    validate_id("organization", organization_id)?;
    read(|d, tx| {
        let mut r = Vec::new();
        for item in d.invites_by_org.prefix_iter(tx, &prefix(organization_id)).map_err(err)? {
            let (_, hash) = item.map_err(err)?;
            if let Some(inv) = d.invites.get(tx, hash).map_err(err)? {
                if inv.status == InvitationStatus::Pending {
                    r.push(inv);
                }
            }
        }
        r.sort_by(|a: &Invitation, b| a.email.cmp(&b.email));
        Ok(r)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_url_safe() {
        let a = generate_token().unwrap();
        let b = generate_token().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn hash_is_hex_sha256() {
        let h = hash_token("abc");
        assert_eq!(h, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Bob@Example.COM ").unwrap(), "bob@example.com");
        assert!(normalize_email("").is_err());
        assert!(normalize_email("not-an-email").is_err());
    }

    #[test]
    fn status_display() {
        assert_eq!(InvitationStatus::Declined.to_string(), "declined");
    }
}
