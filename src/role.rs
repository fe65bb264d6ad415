//! Organization roles

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::AuthzError;

/// Position a user holds within one organization.
///
/// A user can be `Admin` in one organization and `Member` in another, so a
/// `Role` value only means something next to the organization it was read for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    /// Default role on join and invitation.
    #[default]
    Member,
}

impl Role {
    /// All roles, highest privilege first.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Member];

    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Parse a role string, rejecting anything outside the three roles.
    pub fn parse(s: &str) -> Result<Self, AuthzError> {
        Role::from_str(s).map_err(|_| AuthzError::UnknownRole(s.to_string()))
    }
}
