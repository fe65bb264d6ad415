//! Permission vocabulary and permission sets
//!
//! Permissions are a closed enum with stable string ids (`"product:create"`,
//! `"user:role:update"`, ...). Each one owns a bit, so a role's permissions
//! fit in a single [`PermissionSet`] mask and membership is one AND.

use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumString, IntoStaticStr};

use crate::error::AuthzError;

/// One named capability from the closed vocabulary.
///
/// The discriminant is the bit position inside a [`PermissionSet`]; new
/// permissions are appended, never renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, IntoStaticStr)]
#[repr(u8)]
pub enum Permission {
    #[strum(serialize = "product:create")]
    ProductCreate = 0,
    #[strum(serialize = "product:read")]
    ProductRead = 1,
    #[strum(serialize = "product:update")]
    ProductUpdate = 2,
    #[strum(serialize = "product:delete")]
    ProductDelete = 3,

    #[strum(serialize = "supplier:create")]
    SupplierCreate = 4,
    #[strum(serialize = "supplier:read")]
    SupplierRead = 5,
    #[strum(serialize = "supplier:update")]
    SupplierUpdate = 6,
    #[strum(serialize = "supplier:delete")]
    SupplierDelete = 7,

    #[strum(serialize = "order:create")]
    OrderCreate = 8,
    #[strum(serialize = "order:read")]
    OrderRead = 9,
    #[strum(serialize = "order:update")]
    OrderUpdate = 10,
    #[strum(serialize = "order:delete")]
    OrderDelete = 11,
    #[strum(serialize = "order:approve")]
    OrderApprove = 12,

    #[strum(serialize = "user:invite")]
    UserInvite = 13,
    #[strum(serialize = "user:read")]
    UserRead = 14,
    #[strum(serialize = "user:update")]
    UserUpdate = 15,
    #[strum(serialize = "user:delete")]
    UserDelete = 16,
    #[strum(serialize = "user:role:update")]
    UserRoleUpdate = 17,

    #[strum(serialize = "org:settings:update")]
    OrgSettingsUpdate = 18,
    #[strum(serialize = "org:delete")]
    OrgDelete = 19,

    #[strum(serialize = "reports:view")]
    ReportsView = 20,
    #[strum(serialize = "reports:export")]
    ReportsExport = 21,
}

impl Permission {
    /// The full vocabulary, in bit order.
    pub const ALL: [Permission; 22] = [
        Permission::ProductCreate,
        Permission::ProductRead,
        Permission::ProductUpdate,
        Permission::ProductDelete,
        Permission::SupplierCreate,
        Permission::SupplierRead,
        Permission::SupplierUpdate,
        Permission::SupplierDelete,
        Permission::OrderCreate,
        Permission::OrderRead,
        Permission::OrderUpdate,
        Permission::OrderDelete,
        Permission::OrderApprove,
        Permission::UserInvite,
        Permission::UserRead,
        Permission::UserUpdate,
        Permission::UserDelete,
        Permission::UserRoleUpdate,
        Permission::OrgSettingsUpdate,
        Permission::OrgDelete,
        Permission::ReportsView,
        Permission::ReportsExport,
    ];

    #[inline]
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Parse a permission id, rejecting anything outside the vocabulary.
    pub fn parse(s: &str) -> Result<Self, AuthzError> {
        Permission::from_str(s).map_err(|_| AuthzError::UnknownPermission(s.to_string()))
    }

    pub fn family(self) -> ResourceFamily {
        use Permission::*;
        match self {
            ProductCreate | ProductRead | ProductUpdate | ProductDelete => ResourceFamily::Product,
            SupplierCreate | SupplierRead | SupplierUpdate | SupplierDelete => ResourceFamily::Supplier,
            OrderCreate | OrderRead | OrderUpdate | OrderDelete | OrderApprove => ResourceFamily::Order,
            UserInvite | UserRead | UserUpdate | UserDelete | UserRoleUpdate => ResourceFamily::User,
            OrgSettingsUpdate | OrgDelete => ResourceFamily::Organization,
            ReportsView | ReportsExport => ResourceFamily::Reports,
        }
    }

    /// Human-readable name shown next to the permission in role screens.
    pub fn label(self) -> &'static str {
        use Permission::*;
        match self {
            ProductCreate => "Create Products",
            ProductRead => "View Products",
            ProductUpdate => "Edit Products",
            ProductDelete => "Delete Products",
            SupplierCreate => "Create Suppliers",
            SupplierRead => "View Suppliers",
            SupplierUpdate => "Edit Suppliers",
            SupplierDelete => "Delete Suppliers",
            OrderCreate => "Create Orders",
            OrderRead => "View Orders",
            OrderUpdate => "Edit Orders",
            OrderDelete => "Delete Orders",
            OrderApprove => "Approve Orders",
            UserInvite => "Invite Users",
            UserRead => "View Users",
            UserUpdate => "Edit Users",
            UserDelete => "Remove Users",
            UserRoleUpdate => "Change User Roles",
            OrgSettingsUpdate => "Update Organization Settings",
            OrgDelete => "Delete Organization",
            ReportsView => "View Reports",
            ReportsExport => "Export Reports",
        }
    }
}

impl serde::Serialize for Permission {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Permission {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Presentational grouping of permissions. The engine ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceFamily {
    Product,
    Supplier,
    Order,
    User,
    Organization,
    Reports,
}

impl ResourceFamily {
    pub const ALL: [ResourceFamily; 6] = [
        ResourceFamily::Product,
        ResourceFamily::Supplier,
        ResourceFamily::Order,
        ResourceFamily::User,
        ResourceFamily::Organization,
        ResourceFamily::Reports,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ResourceFamily::Product => "Product Management",
            ResourceFamily::Supplier => "Supplier Management",
            ResourceFamily::Order => "Order Management",
            ResourceFamily::User => "User Management",
            ResourceFamily::Organization => "Organization Management",
            ResourceFamily::Reports => "Reports",
        }
    }

    /// Permissions in this family, in vocabulary order.
    pub fn permissions(self) -> impl Iterator<Item = Permission> {
        Permission::ALL.into_iter().filter(move |p| p.family() == self)
    }
}

/// Bitmask set of permissions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PermissionSet(u32);

impl PermissionSet {
    pub const EMPTY: PermissionSet = PermissionSet(0);

    /// Build a set at compile time.
    pub const fn of(perms: &[Permission]) -> Self {
        let mut mask = 0u32;
        let mut i = 0;
        while i < perms.len() {
            mask |= perms[i].bit();
            i += 1;
        }
        PermissionSet(mask)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, p: Permission) -> bool {
        self.0 & p.bit() != 0
    }

    /// True when every permission of `other` is also in `self`.
    #[inline]
    pub const fn is_superset_of(self, other: PermissionSet) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn union(self, other: PermissionSet) -> Self {
        PermissionSet(self.0 | other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Membership test on a raw string; anything outside the vocabulary is absent.
    pub fn contains_str(self, permission: &str) -> bool {
        Permission::from_str(permission).map(|p| self.contains(p)).unwrap_or(false)
    }

    pub fn iter(self) -> impl Iterator<Item = Permission> {
        Permission::ALL.into_iter().filter(move |p| self.contains(*p))
    }

    /// String ids of the permissions in the set, in vocabulary order.
    pub fn names(self) -> Vec<&'static str> {
        self.iter().map(Permission::as_str).collect()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        PermissionSet(iter.into_iter().fold(0, |m, p| m | p.bit()))
    }
}

impl fmt::Debug for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Permission::as_str)).finish()
    }
}

impl serde::Serialize for PermissionSet {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}
