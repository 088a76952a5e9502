use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ServiceResult;

/// A permission as exposed to the administration UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub module: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePermissionRequest {
    #[validate(length(min = 3, max = 100))]
    pub code: String,
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub module: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePermissionRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub module: Option<String>,
    pub description: Option<String>,
}

#[async_trait]
pub trait PermissionService: Send + Sync {
    async fn create(&self, req: CreatePermissionRequest, actor: u64) -> ServiceResult<PermissionDefinition>;
    /// All definitions, optionally restricted to one module
    async fn get_all(&self, module: Option<&str>) -> ServiceResult<Vec<PermissionDefinition>>;
    async fn get_by_id(&self, id: u64) -> ServiceResult<PermissionDefinition>;
    async fn get_by_code(&self, code: &str) -> ServiceResult<PermissionDefinition>;
    async fn update(&self, id: u64, req: UpdatePermissionRequest, actor: u64) -> ServiceResult<PermissionDefinition>;
    async fn delete(&self, id: u64, actor: u64) -> ServiceResult<()>;
}
