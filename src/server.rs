//! HTTP surface for server-side permission checks and membership admin
//!
//! Run with: cargo run --features server --bin inventack-authz-server
//!
//! Endpoints:
//!   GET  /status                                - Store status
//!   GET  /roles                                 - Roles with their permissions
//!   GET  /permissions                           - Vocabulary grouped by family
//!   GET  /roles/:role/permissions               - One role's permissions
//!   POST /check                                 - Check a role or a member
//!   POST /organizations/:org                    - Create with caller as admin
//!   POST /organizations/:org/join               - Join as member
//!   GET  /organizations/:org/members            - List members
//!   POST /organizations/:org/members/role       - Change a member's role
//!   POST /organizations/:org/members/remove     - Remove a member
//!   POST /organizations/:org/invitations        - Invite by email
//!   GET  /organizations/:org/invitations        - Pending invitations
//!   POST /invitations/accept                    - Accept with token

use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AuthzError;
use crate::permission::{PermissionSet, ResourceFamily};
use crate::role::Role;
use crate::table::{permission_matrix, MatrixRow, ROLE_PERMISSIONS};
use crate::{engine, invitation, membership};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CheckReq {
    /// Role string to check directly
    pub role: Option<String>,
    /// Or resolve the role of this user in this organization
    pub organization_id: Option<String>,
    pub user_id: Option<String>,
    pub permission: String,
}

#[derive(Debug, Deserialize)]
pub struct UserReq {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdateReq {
    pub actor: String,
    pub target: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct RemoveReq {
    pub actor: String,
    pub target: String,
}

#[derive(Debug, Deserialize)]
pub struct InviteReq {
    pub actor: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct AcceptReq {
    pub token: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct StatusRes {
    pub initialized: bool,
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleInfo {
    pub role: Role,
    pub permissions: PermissionSet,
}

#[derive(Debug, Serialize)]
pub struct FamilyInfo {
    pub family: ResourceFamily,
    pub label: &'static str,
    pub permissions: Vec<MatrixRow>,
}

#[derive(Debug, Serialize)]
pub struct CheckRes {
    pub allowed: bool,
    pub role: Option<Role>,
    pub permission: String,
}

#[derive(Debug, Serialize)]
pub struct InviteRes {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(msg.into()) }
    }
}

pub type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

// ============================================================================
// Helpers
// ============================================================================

fn status_for(e: &AuthzError) -> StatusCode {
    match e {
        AuthzError::Forbidden { .. } | AuthzError::WrongOrganization { .. } => StatusCode::FORBIDDEN,
        AuthzError::NotAMember { .. } | AuthzError::OrganizationNotFound(_) | AuthzError::InvitationNotFound => {
            StatusCode::NOT_FOUND
        }
        AuthzError::InvitationClosed(_) | AuthzError::OrganizationExists(_) | AuthzError::LastAdmin(_) => {
            StatusCode::CONFLICT
        }
        AuthzError::NotInitialized | AuthzError::AlreadyInitialized(_) | AuthzError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    }
}

fn reply<T>(r: crate::Result<T>) -> Reply<T> {
    match r {
        Ok(v) => (StatusCode::OK, Json(ApiResponse::ok(v))),
        Err(e) => (status_for(&e), Json(ApiResponse::err(e.to_string()))),
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn get_status() -> Json<ApiResponse<StatusRes>> {
    let path = crate::db::INIT_PATH.get().cloned();
    Json(ApiResponse::ok(StatusRes { initialized: path.is_some(), path }))
}

pub async fn get_roles() -> Json<ApiResponse<Vec<RoleInfo>>> {
    let roles = ROLE_PERMISSIONS
        .into_iter()
        .map(|(role, permissions)| RoleInfo { role, permissions })
        .collect();
    Json(ApiResponse::ok(roles))
}

pub async fn get_permissions() -> Json<ApiResponse<Vec<FamilyInfo>>> {
    let families = permission_matrix()
        .into_iter()
        .map(|(family, permissions)| FamilyInfo { family, label: family.label(), permissions })
        .collect();
    Json(ApiResponse::ok(families))
}

pub async fn get_role_permissions(Path(role): Path<String>) -> Reply<RoleInfo> {
    reply(Role::parse(&role).map(|role| RoleInfo { role, permissions: role.permissions() }))
}

/// Answers with the engine's verdict. A member lookup that finds no
/// membership, or a role string that does not parse, is a plain denial.
pub async fn post_check(Json(req): Json<CheckReq>) -> Reply<CheckRes> {
    let role = match (&req.organization_id, &req.user_id) {
        (Some(org), Some(user)) => match membership::role_of(org, user) {
            Ok(role) => role,
            Err(e) => return reply(Err(e)),
        },
        _ => req.role.as_deref().and_then(|r| Role::parse(r).ok()),
    };
    let allowed = role.is_some_and(|r| engine::has_permission(r.as_str(), &req.permission));
    tracing::debug!(role = ?role, permission = %req.permission, allowed, "permission check");
    reply(Ok(CheckRes { allowed, role, permission: req.permission }))
}

pub async fn post_organization(Path(org): Path<String>, Json(req): Json<UserReq>) -> Reply<membership::Membership> {
    reply(membership::create_organization(&org, &req.user_id))
}

pub async fn post_join(Path(org): Path<String>, Json(req): Json<UserReq>) -> Reply<membership::Membership> {
    reply(membership::join_organization(&org, &req.user_id))
}

pub async fn get_members(Path(org): Path<String>) -> Reply<Vec<membership::Membership>> {
    reply(membership::members_of(&org))
}

pub async fn post_member_role(Path(org): Path<String>, Json(req): Json<RoleUpdateReq>) -> Reply<membership::Membership> {
    reply(membership::update_member_role(&req.actor, &org, &req.target, req.role))
}

pub async fn post_member_remove(Path(org): Path<String>, Json(req): Json<RemoveReq>) -> Reply<bool> {
    reply(membership::remove_member(&req.actor, &org, &req.target))
}

pub async fn post_invitation(Path(org): Path<String>, Json(req): Json<InviteReq>) -> Reply<InviteRes> {
    reply(invitation::invite(&req.actor, &org, &req.email, req.role).map(|token| InviteRes { token }))
}

pub async fn get_invitations(Path(org): Path<String>) -> Reply<Vec<invitation::Invitation>> {
    reply(invitation::pending_invitations(&org))
}

pub async fn post_accept(Json(req): Json<AcceptReq>) -> Reply<membership::Membership> {
    reply(invitation::accept_invitation(&req.token, &req.user_id))
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/status", get(get_status))
        .route("/roles", get(get_roles))
        .route("/permissions", get(get_permissions))
        .route("/roles/:role/permissions", get(get_role_permissions))
        .route("/check", post(post_check))
        .route("/organizations/:org", post(post_organization))
        .route("/organizations/:org/join", post(post_join))
        .route("/organizations/:org/members", get(get_members))
        .route("/organizations/:org/members/role", post(post_member_role))
        .route("/organizations/:org/members/remove", post(post_member_remove))
        .route("/organizations/:org/invitations", post(post_invitation).get(get_invitations))
        .route("/invitations/accept", post(post_accept))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::Permission;

    #[tokio::test]
    async fn role_permissions_endpoint() {
        let (code, Json(body)) = get_role_permissions(Path("manager".into())).await;
        assert_eq!(code, StatusCode::OK);
        let info = body.data.unwrap();
        assert_eq!(info.role, Role::Manager);
        assert!(info.permissions.contains(Permission::OrderApprove));

        let (code, Json(body)) = get_role_permissions(Path("superadmin".into())).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.as_deref(), Some("unknown role: superadmin"));
    }

    #[tokio::test]
    async fn check_by_role_string_fails_closed() {
        let req = |role: &str, permission: &str| CheckReq {
            role: Some(role.into()),
            organization_id: None,
            user_id: None,
            permission: permission.into(),
        };
        let (_, Json(body)) = post_check(Json(req("admin", "org:delete"))).await;
        assert!(body.data.unwrap().allowed);
        let (_, Json(body)) = post_check(Json(req("member", "org:delete"))).await;
        assert!(!body.data.unwrap().allowed);
        let (_, Json(body)) = post_check(Json(req("superadmin", "product:read"))).await;
        let res = body.data.unwrap();
        assert!(!res.allowed);
        assert_eq!(res.role, None);
        let (_, Json(body)) = post_check(Json(req("admin", "product:archive"))).await;
        assert!(!body.data.unwrap().allowed);
    }

    #[tokio::test]
    async fn catalogue_endpoints() {
        let Json(roles) = get_roles().await;
        let roles = roles.data.unwrap();
        assert_eq!(roles.len(), 3);
        assert_eq!(roles[0].permissions.len(), 22);

        let Json(families) = get_permissions().await;
        let families = families.data.unwrap();
        assert_eq!(families[0].label, "Product Management");
        assert_eq!(families.iter().map(|f| f.permissions.len()).sum::<usize>(), 22);
    }

    #[test]
    fn error_status_mapping() {
        let forbidden = AuthzError::Forbidden { role: None, permission: Permission::OrgDelete };
        assert_eq!(status_for(&forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_for(&AuthzError::InvitationNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&AuthzError::SelfRoleChange), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&AuthzError::LastAdmin("acme".into())), StatusCode::CONFLICT);
        assert_eq!(status_for(&AuthzError::OrganizationNotFound("newco".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&AuthzError::Storage("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
