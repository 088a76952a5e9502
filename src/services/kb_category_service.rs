use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::filiale_service::default_true;
use super::ServiceResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbCategory {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<u64>,
    pub is_active: bool,
    pub created_by: u64,
    pub updated_by: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateKbCategoryRequest {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub parent_id: Option<u64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateKbCategoryRequest {
    #[validate(length(min = 1, max = 50))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub parent_id: Option<u64>,
    pub is_active: Option<bool>,
}

/// Knowledge-base categories (tree via `parent_id`)
#[async_trait]
pub trait KbCategoryService: Send + Sync {
    async fn create(&self, req: CreateKbCategoryRequest, actor: u64) -> ServiceResult<KbCategory>;
    async fn get_all(&self) -> ServiceResult<Vec<KbCategory>>;
    async fn get_by_id(&self, id: u64) -> ServiceResult<KbCategory>;
    async fn get_by_code(&self, code: &str) -> ServiceResult<KbCategory>;
    async fn update(&self, id: u64, req: UpdateKbCategoryRequest, actor: u64) -> ServiceResult<KbCategory>;
    async fn delete(&self, id: u64, actor: u64) -> ServiceResult<()>;
}
