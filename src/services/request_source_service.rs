use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::filiale_service::default_true;
use super::ServiceResult;

/// Channel a request came through (phone, email, portal, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSource {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_by: u64,
    pub updated_by: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRequestSourceRequest {
    #[validate(length(min = 1, max = 30))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRequestSourceRequest {
    #[validate(length(min = 1, max = 30))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[async_trait]
pub trait RequestSourceService: Send + Sync {
    async fn create(&self, req: CreateRequestSourceRequest, actor: u64) -> ServiceResult<RequestSource>;
    async fn get_all(&self) -> ServiceResult<Vec<RequestSource>>;
    async fn get_by_id(&self, id: u64) -> ServiceResult<RequestSource>;
    async fn get_by_code(&self, code: &str) -> ServiceResult<RequestSource>;
    async fn update(&self, id: u64, req: UpdateRequestSourceRequest, actor: u64) -> ServiceResult<RequestSource>;
    async fn delete(&self, id: u64, actor: u64) -> ServiceResult<()>;
}
