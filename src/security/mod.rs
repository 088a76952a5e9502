//! Caller context and the authorization port every handler goes through.
//!
//! Handlers never inspect permission strings themselves. They describe the
//! policy as a [`Gate`] (or ask for a [`BranchVisibility`]) and the injected
//! [`Authorizer`] answers whether the caller holds a given [`Permission`].

mod permission;

use std::collections::BTreeSet;
use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;

use crate::auth::Claims;
use crate::error::ApiError;

pub use permission::{Permission, UnknownPermission};

/// Request-scoped identity, built by the JWT middleware
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallerContext {
    pub user_id: Option<u64>,
    pub filiale_id: Option<u64>,
    pub permissions: BTreeSet<Permission>,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(user_id: u64, filiale_id: Option<u64>, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            user_id: Some(user_id),
            filiale_id,
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Actor of record for mutating calls. No identity is a terminal 401.
    pub fn require_user(&self) -> Result<u64, ApiError> {
        self.user_id.ok_or_else(ApiError::unauthenticated)
    }
}

impl From<Claims> for CallerContext {
    fn from(claims: Claims) -> Self {
        let permissions = claims
            .permissions
            .iter()
            .filter_map(|code| match code.parse::<Permission>() {
                Ok(permission) => Some(permission),
                Err(e) => {
                    tracing::debug!("Ignoring token permission: {}", e);
                    None
                }
            })
            .collect();

        Self {
            user_id: claims.sub,
            filiale_id: claims.filiale_id,
            permissions,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<CallerContext>().cloned().unwrap_or_default())
    }
}

/// Authorization port: does this caller hold this permission?
pub trait Authorizer: Send + Sync {
    fn is_granted(&self, caller: &CallerContext, permission: Permission) -> bool;
}

/// Grants exactly the permissions carried by the caller's token
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenAuthorizer;

impl Authorizer for TokenAuthorizer {
    fn is_granted(&self, caller: &CallerContext, permission: Permission) -> bool {
        caller.permissions.contains(&permission)
    }
}

/// Authorization policy of one endpoint
#[derive(Debug, Clone, Copy)]
pub enum Gate {
    Public,
    Require(Permission),
    AnyOf(&'static [Permission]),
}

impl Gate {
    pub fn check(self, authorizer: &dyn Authorizer, caller: &CallerContext) -> Result<(), ApiError> {
        match self {
            Gate::Public => Ok(()),
            Gate::Require(permission) => {
                deny_unless(authorizer.is_granted(caller, permission), caller, &[permission])
            }
            Gate::AnyOf(permissions) => deny_unless(
                permissions.iter().any(|p| authorizer.is_granted(caller, *p)),
                caller,
                permissions,
            ),
        }
    }
}

fn deny_unless(granted: bool, caller: &CallerContext, required: &[Permission]) -> Result<(), ApiError> {
    if granted {
        return Ok(());
    }

    tracing::debug!(user_id = ?caller.user_id, ?required, "Permission denied");
    Err(ApiError::permission_denied(required))
}

/// Result of a scope-narrowing decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchVisibility {
    /// Caller holds an elevated permission
    All,
    /// Caller sees only its own branch
    Own(u64),
    /// Caller is not elevated and carries no branch scope
    Nothing,
}

impl BranchVisibility {
    pub fn resolve(authorizer: &dyn Authorizer, caller: &CallerContext, elevated: &[Permission]) -> Self {
        if elevated.iter().any(|p| authorizer.is_granted(caller, *p)) {
            return BranchVisibility::All;
        }

        match caller.filiale_id {
            Some(id) => BranchVisibility::Own(id),
            None => BranchVisibility::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn caller(permissions: &[Permission], filiale_id: Option<u64>) -> CallerContext {
        CallerContext::new(1, filiale_id, permissions.iter().copied())
    }

    #[test]
    fn require_gate_needs_the_exact_permission() {
        let ctx = caller(&[Permission::FilialesView], None);
        assert!(Gate::Require(Permission::FilialesView).check(&TokenAuthorizer, &ctx).is_ok());

        let err = Gate::Require(Permission::FilialesCreate)
            .check(&TokenAuthorizer, &ctx)
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn any_of_gate_accepts_either_permission() {
        let gate = Gate::AnyOf(&[Permission::FilialesView, Permission::ServiceRequestsFilterByFiliale]);
        let ctx = caller(&[Permission::ServiceRequestsFilterByFiliale], None);
        assert!(gate.check(&TokenAuthorizer, &ctx).is_ok());
        assert!(gate.check(&TokenAuthorizer, &CallerContext::anonymous()).is_err());
    }

    #[test]
    fn public_gate_admits_anonymous() {
        assert!(Gate::Public.check(&TokenAuthorizer, &CallerContext::anonymous()).is_ok());
    }

    #[test]
    fn visibility_narrows_to_own_branch() {
        let elevated = [Permission::FilialesViewAll, Permission::FilialesManage];

        let scoped = caller(&[Permission::FilialesView], Some(7));
        assert_eq!(BranchVisibility::resolve(&TokenAuthorizer, &scoped, &elevated), BranchVisibility::Own(7));

        let manager = caller(&[Permission::FilialesManage], Some(7));
        assert_eq!(BranchVisibility::resolve(&TokenAuthorizer, &manager, &elevated), BranchVisibility::All);

        let unscoped = caller(&[Permission::FilialesView], None);
        assert_eq!(BranchVisibility::resolve(&TokenAuthorizer, &unscoped, &elevated), BranchVisibility::Nothing);
    }

    #[test]
    fn claims_with_unknown_codes_keep_known_ones() {
        let claims = Claims::new(
            Some(3),
            Some(9),
            vec!["filiales.view".into(), "legacy.admin".into()],
            1,
        );
        let ctx = CallerContext::from(claims);
        assert_eq!(ctx.user_id, Some(3));
        assert_eq!(ctx.filiale_id, Some(9));
        assert_eq!(ctx.permissions.len(), 1);
        assert!(ctx.permissions.contains(&Permission::FilialesView));
    }

    #[test]
    fn anonymous_caller_has_no_identity() {
        let err = CallerContext::anonymous().require_user().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
