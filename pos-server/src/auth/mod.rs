//! Authentication and authorization
//!
//! - [`JwtService`]: token issue/validation
//! - [`CurrentUser`]: authenticated identity with tenant/branch scoping rules
//! - [`middleware`]: `require_auth` and role gates for routers
//! - [`rate_limit`]: per-IP limiter for login and registration

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod rate_limit;

pub use jwt::{Claims, JwtError, JwtService};

use shared::error::{AppError, ErrorCode};
use shared::models::Role;

/// Authenticated staff identity extracted from the JWT
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub tenant_id: i64,
    pub branch_id: Option<i64>,
    pub role: Role,
    pub email: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            tenant_id: claims.tenant_id,
            branch_id: claims.branch_id,
            role: claims.role,
            email: claims.email,
        }
    }
}

impl CurrentUser {
    pub fn is_owner(&self) -> bool {
        self.role.spans_all_branches()
    }

    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    /// Whether this user may see rows of `branch_id`
    pub fn can_access_branch(&self, branch_id: i64) -> bool {
        self.is_owner() || self.branch_id == Some(branch_id)
    }

    /// Branch filter for list queries.
    ///
    /// Owners get whatever they asked for (`None` = all branches). Everyone
    /// else is pinned to their own branch and may not ask for another.
    pub fn list_scope(&self, requested: Option<i64>) -> Result<Option<i64>, AppError> {
        if self.is_owner() {
            return Ok(requested);
        }
        let own = self.own_branch()?;
        match requested {
            Some(b) if b != own => Err(AppError::new(ErrorCode::BranchAccessDenied)),
            _ => Ok(Some(own)),
        }
    }

    /// Branch a new row is created in.
    ///
    /// Non-owners always write to their own branch; owners must name one.
    pub fn target_branch(&self, requested: Option<i64>) -> Result<i64, AppError> {
        if self.is_owner() {
            return requested.ok_or_else(|| {
                AppError::validation("branch_id is required").with_detail("field", "branch_id")
            });
        }
        let own = self.own_branch()?;
        match requested {
            Some(b) if b != own => Err(AppError::new(ErrorCode::BranchAccessDenied)),
            _ => Ok(own),
        }
    }

    fn own_branch(&self) -> Result<i64, AppError> {
        self.branch_id
            .ok_or_else(|| AppError::new(ErrorCode::BranchAccessDenied))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, branch_id: Option<i64>) -> CurrentUser {
        CurrentUser {
            id: 1,
            tenant_id: 1,
            branch_id,
            role,
            email: "u@example.com".into(),
        }
    }

    #[test]
    fn test_owner_sees_everything() {
        let owner = user(Role::Owner, None);
        assert!(owner.can_access_branch(99));
        assert_eq!(owner.list_scope(None).unwrap(), None);
        assert_eq!(owner.list_scope(Some(4)).unwrap(), Some(4));
    }

    #[test]
    fn test_staff_pinned_to_branch() {
        let cashier = user(Role::Cashier, Some(2));
        assert!(cashier.can_access_branch(2));
        assert!(!cashier.can_access_branch(3));
        assert_eq!(cashier.list_scope(None).unwrap(), Some(2));
        assert_eq!(cashier.list_scope(Some(2)).unwrap(), Some(2));
        assert_eq!(
            cashier.list_scope(Some(3)).unwrap_err().code,
            ErrorCode::BranchAccessDenied
        );
    }

    #[test]
    fn test_target_branch() {
        let owner = user(Role::Owner, None);
        assert_eq!(owner.target_branch(Some(5)).unwrap(), 5);
        assert_eq!(
            owner.target_branch(None).unwrap_err().code,
            ErrorCode::ValidationFailed
        );

        let manager = user(Role::Manager, Some(2));
        assert_eq!(manager.target_branch(None).unwrap(), 2);
        assert!(manager.target_branch(Some(9)).is_err());
    }

    #[test]
    fn test_staff_without_branch_is_denied() {
        let broken = user(Role::Waiter, None);
        assert!(broken.list_scope(None).is_err());
        assert!(!broken.can_access_branch(1));
    }
}
