//! Gateway-trust authorization.
//!
//! Authentication happens upstream; the gateway injects the caller's
//! identity as `x-user-id` and `x-user-roles` headers. This module maps
//! roles onto the permissions the mutating endpoints require.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::errors::ServiceError;

/// Permission names used by the HTTP surface
pub mod consts {
    pub const ORDERS_READ: &str = "orders:read";
    pub const ORDERS_CREATE: &str = "orders:create";
    pub const ORDERS_UPDATE: &str = "orders:update";
    pub const ORDERS_RECONCILE: &str = "orders:reconcile";
    pub const REPORTS_READ: &str = "reports:read";
    pub const REPORTS_WRITE: &str = "reports:write";
    pub const MATERIALS_READ: &str = "materials:read";
    pub const MATERIALS_WRITE: &str = "materials:write";
    pub const RECIPES_READ: &str = "recipes:read";
    pub const RECIPES_WRITE: &str = "recipes:write";
    pub const MACHINES_READ: &str = "machines:read";
    pub const MACHINES_WRITE: &str = "machines:write";
}

/// Permissions granted to a role name
fn permissions_for_role(role: &str) -> &'static [&'static str] {
    use consts::*;
    match role {
        "admin" | "manager" => &[
            ORDERS_READ,
            ORDERS_CREATE,
            ORDERS_UPDATE,
            ORDERS_RECONCILE,
            REPORTS_READ,
            REPORTS_WRITE,
            MATERIALS_READ,
            MATERIALS_WRITE,
            RECIPES_READ,
            RECIPES_WRITE,
            MACHINES_READ,
            MACHINES_WRITE,
        ],
        "operator" => &[
            ORDERS_READ,
            REPORTS_READ,
            REPORTS_WRITE,
            MATERIALS_READ,
            MATERIALS_WRITE,
            RECIPES_READ,
            MACHINES_READ,
        ],
        "viewer" => &[
            ORDERS_READ,
            REPORTS_READ,
            MATERIALS_READ,
            RECIPES_READ,
            MACHINES_READ,
        ],
        _ => &[],
    }
}

/// Authenticated caller, as asserted by the upstream gateway
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn new(user_id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles,
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.roles
            .iter()
            .any(|role| permissions_for_role(role).contains(&permission))
    }

    /// Rejects the caller unless one of their roles grants `permission`.
    pub fn require(&self, permission: &str) -> Result<(), ServiceError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "Missing permission: {}",
                permission
            )))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ServiceError::Unauthorized("Missing x-user-id header".to_string())
            })?
            .to_string();

        let roles = parts
            .headers
            .get("x-user-roles")
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                v.split(',')
                    .map(|role| role.trim().to_ascii_lowercase())
                    .filter(|role| !role.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(AuthUser { user_id, roles })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn manager_can_mutate_orders() {
        let user = AuthUser::new("u1", vec!["manager".into()]);
        assert!(user.require(consts::ORDERS_CREATE).is_ok());
        assert!(user.require(consts::ORDERS_RECONCILE).is_ok());
    }

    #[test]
    fn operator_writes_reports_but_not_orders() {
        let user = AuthUser::new("u2", vec!["operator".into()]);
        assert!(user.require(consts::REPORTS_WRITE).is_ok());
        assert_matches!(
            user.require(consts::ORDERS_CREATE),
            Err(ServiceError::Forbidden(_))
        );
    }

    #[test]
    fn viewer_is_read_only() {
        let user = AuthUser::new("u3", vec!["viewer".into()]);
        assert!(user.require(consts::ORDERS_READ).is_ok());
        assert_matches!(
            user.require(consts::REPORTS_WRITE),
            Err(ServiceError::Forbidden(_))
        );
    }

    #[test]
    fn unknown_role_grants_nothing() {
        let user = AuthUser::new("u4", vec!["intern".into()]);
        assert!(!user.has_permission(consts::ORDERS_READ));
    }
}
