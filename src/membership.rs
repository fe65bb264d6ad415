//! Organization membership: who holds which role where
//!
//! A user's role lives on the `(organization, user)` membership record and
//! nowhere else. Reads are unprotected; role changes and removals are gated
//! on the actor's own role in the same organization, checked inside the
//! write transaction that performs the change.

use heed::RoTxn;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::{current_epoch, read, write, Dbs};
use crate::error::{err, AuthzError, Result};
use crate::gate;
use crate::keys::{get_part, member_key, prefix, user_org_key, validate_id};
use crate::permission::Permission;
use crate::role::Role;

/// Membership record of one user in one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub organization_id: String,
    pub user_id: String,
    pub role: Role,
    pub invited_by: Option<String>,
    /// Epoch milliseconds
    pub joined_at: u64,
}

#[inline]
pub(crate) fn get_membership(d: &Dbs, tx: &RoTxn, organization_id: &str, user_id: &str) -> Result<Option<Membership>> {
    d.members.get(tx, &member_key(organization_id, user_id)).map_err(err)
}

#[inline]
pub(crate) fn get_role(d: &Dbs, tx: &RoTxn, organization_id: &str, user_id: &str) -> Result<Option<Role>> {
    Ok(get_membership(d, tx, organization_id, user_id)?.map(|m| m.role))
}

/// Insert a membership unless one exists. Returns the record now stored.
pub(crate) fn insert_membership(
    d: &Dbs,
    tx: &mut heed::RwTxn,
    organization_id: &str,
    user_id: &str,
    role: Role,
    invited_by: Option<&str>,
) -> Result<Membership> {
    if let Some(existing) = get_membership(d, tx, organization_id, user_id)? {
        return Ok(existing);
    }
    let m = Membership {
        organization_id: organization_id.to_string(),
        user_id: user_id.to_string(),
        role,
        invited_by: invited_by.map(str::to_string),
        joined_at: current_epoch(),
    };
    d.members.put(tx, &member_key(organization_id, user_id), &m).map_err(err)?;
    d.by_user.put(tx, &user_org_key(user_id, organization_id), &m.joined_at).map_err(err)?;
    Ok(m)
}

fn organization_exists(d: &Dbs, tx: &RoTxn, organization_id: &str) -> Result<bool> {
    Ok(d.members.prefix_iter(tx, &prefix(organization_id)).map_err(err)?.next().is_some())
}

fn admin_count(d: &Dbs, tx: &RoTxn, organization_id: &str) -> Result<usize> {
    let mut n = 0;
    for item in d.members.prefix_iter(tx, &prefix(organization_id)).map_err(err)? {
        let (_, m) = item.map_err(err)?;
        if m.role == Role::Admin {
            n += 1;
        }
    }
    Ok(n)
}

/// Fail if `user_id` is the organization's only admin.
fn keep_last_admin(d: &Dbs, tx: &RoTxn, organization_id: &str, user_id: &str) -> Result<()> {
    if get_role(d, tx, organization_id, user_id)? == Some(Role::Admin) && admin_count(d, tx, organization_id)? <= 1 {
        return Err(AuthzError::LastAdmin(organization_id.to_string()));
    }
    Ok(())
}

fn validate_pair(organization_id: &str, user_id: &str) -> Result<()> {
    validate_id("organization", organization_id)?;
    validate_id("user", user_id)
}

/// The user's role in the organization, `None` when not a member
pub fn role_of(organization_id: &str, user_id: &str) -> Result<Option<Role>> {
    validate_pair(organization_id, user_id)?;
    read(|d, tx| get_role(d, tx, organization_id, user_id))
}

pub fn membership(organization_id: &str, user_id: &str) -> Result<Option<Membership>> {
    validate_pair(organization_id, user_id)?;
    read(|d, tx| get_membership(d, tx, organization_id, user_id))
}

/// Create an organization with `creator` as its first admin. Refused when
/// the organization already has members.
pub fn create_organization(organization_id: &str, creator: &str) -> Result<Membership> {
    validate_pair(organization_id, creator)?;
    let m = write(|d, tx| {
        if organization_exists(d, tx, organization_id)? {
            return Err(AuthzError::OrganizationExists(organization_id.to_string()));
        }
        insert_membership(d, tx, organization_id, creator, Role::Admin, None)
    })?;
    info!(organization_id, creator, "organization created");
    Ok(m)
}

/// Join an existing organization as `member`. An existing membership keeps its role.
pub fn join_organization(organization_id: &str, user_id: &str) -> Result<Membership> {
    validate_pair(organization_id, user_id)?;
    let m = write(|d, tx| {
        if !organization_exists(d, tx, organization_id)? {
            return Err(AuthzError::OrganizationNotFound(organization_id.to_string()));
        }
        insert_membership(d, tx, organization_id, user_id, Role::Member, None)
    })?;
    info!(organization_id, user_id, role = %m.role, "joined organization");
    Ok(m)
}

/// Leave an organization. Returns whether a membership existed. The last
/// admin cannot leave.
pub fn leave_organization(organization_id: &str, user_id: &str) -> Result<bool> {
    validate_pair(organization_id, user_id)?;
    let removed = write(|d, tx| {
        keep_last_admin(d, tx, organization_id, user_id)?;
        delete_membership(d, tx, organization_id, user_id)
    })?;
    if removed {
        info!(organization_id, user_id, "left organization");
    }
    Ok(removed)
}

fn delete_membership(d: &Dbs, tx: &mut heed::RwTxn, organization_id: &str, user_id: &str) -> Result<bool> {
    let r = d.members.delete(tx, &member_key(organization_id, user_id)).map_err(err)?;
    d.by_user.delete(tx, &user_org_key(user_id, organization_id)).map_err(err)?;
    Ok(r)
}

/// Change `target`'s role. The actor needs `user:role:update` in this
/// organization and cannot change their own role.
pub fn update_member_role(actor: &str, organization_id: &str, target: &str, role: Role) -> Result<Membership> {
    validate_pair(organization_id, actor)?;
    validate_id("user", target)?;
    let (old, m) = write(|d, tx| {
        let actor_role = get_role(d, tx, organization_id, actor)?;
        gate::require(actor_role, Permission::UserRoleUpdate)?;
        if actor == target {
            return Err(AuthzError::SelfRoleChange);
        }
        let mut m = get_membership(d, tx, organization_id, target)?.ok_or_else(|| AuthzError::NotAMember {
            organization: organization_id.to_string(),
            user: target.to_string(),
        })?;
        let old = m.role;
        if old == Role::Admin && role != Role::Admin {
            keep_last_admin(d, tx, organization_id, target)?;
        }
        m.role = role;
        d.members.put(tx, &member_key(organization_id, target), &m).map_err(err)?;
        Ok((old, m))
    })?;
    info!(organization_id, actor, target, from = %old, to = %role, "member role updated");
    Ok(m)
}

/// Remove `target` from the organization. The actor needs `user:delete`;
/// the last admin cannot be removed.
pub fn remove_member(actor: &str, organization_id: &str, target: &str) -> Result<bool> {
    validate_pair(organization_id, actor)?;
    validate_id("user", target)?;
    let removed = write(|d, tx| {
        let actor_role = get_role(d, tx, organization_id, actor)?;
        gate::require(actor_role, Permission::UserDelete)?;
        keep_last_admin(d, tx, organization_id, target)?;
        delete_membership(d, tx, organization_id, target)
    })?;
    if removed {
        info!(organization_id, actor, target, "member removed");
    }
    Ok(removed)
}

/// All members of an organization, ordered by user id
pub fn members_of(organization_id: &str) -> Result<Vec<Membership>> {
    validate_id("organization", organization_id)?;
    read(|d, tx| {
        let mut r = Vec::new();
        for item in d.members.prefix_iter(tx, &prefix(organization_id)).map_err(err)? {
            let (_, m) = item.map_err(err)?;
            r.push(m);
        }
        r.sort_by(|a: &Membership, b| a.user_id.cmp(&b.user_id));
        Ok(r)
    })
}

/// Organizations the user belongs to, with their role in each, ordered by id
pub fn organizations_for(user_id: &str) -> Result<Vec<(String, Role)>> {
    validate_id("user", user_id)?;
    read(|d, tx| {
        let mut r = Vec::new();
        for item in d.by_user.prefix_iter(tx, &prefix(user_id)).map_err(err)? {
            let (k, _) = item.map_err(err)?;
            let Some(org) = get_part(k, 1) else { continue };
            if let Some(role) = get_role(d, tx, org, user_id)? {
                r.push((org.to_string(), role));
            }
        }
        r.sort();
        Ok(r)
    })
}

/// Number of members per role, highest privilege first
pub fn role_counts(organization_id: &str) -> Result<[(Role, usize); 3]> {
    let members = members_of(organization_id)?;
    Ok(Role::ALL.map(|role| (role, members.iter().filter(|m| m.role == role).count())))
}
