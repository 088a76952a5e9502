use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::error::ApiError;
use crate::security::{Authorizer, BranchVisibility, CallerContext, Gate, Permission, TokenAuthorizer};
use crate::services::Services;

/// Shared by every handler; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub authorizer: Arc<dyn Authorizer>,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(services: Services, jwt: JwtKeys) -> Self {
        Self {
            services,
            authorizer: Arc::new(TokenAuthorizer),
            jwt,
        }
    }

    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    pub fn authorize(&self, caller: &CallerContext, gate: Gate) -> Result<(), ApiError> {
        gate.check(self.authorizer.as_ref(), caller)
    }

    pub fn visibility(&self, caller: &CallerContext, elevated: &[Permission]) -> BranchVisibility {
        BranchVisibility::resolve(self.authorizer.as_ref(), caller, elevated)
    }
}
