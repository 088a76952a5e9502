use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ServiceResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filiale {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub is_software_provider: bool,
    pub created_by: u64,
    pub updated_by: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFilialeRequest {
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_software_provider: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateFilialeRequest {
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub is_software_provider: Option<bool>,
}

pub(crate) fn default_true() -> bool {
    true
}

/// Branches ("filiales"), the unit of data-visibility scoping
#[async_trait]
pub trait FilialeService: Send + Sync {
    async fn create(&self, req: CreateFilialeRequest, actor: u64) -> ServiceResult<Filiale>;
    async fn get_all(&self) -> ServiceResult<Vec<Filiale>>;
    /// Active branches, offered on the public registration form
    async fn get_active(&self) -> ServiceResult<Vec<Filiale>>;
    async fn get_by_id(&self, id: u64) -> ServiceResult<Filiale>;
    async fn get_by_code(&self, code: &str) -> ServiceResult<Filiale>;
    /// The branch flagged as the organisation's software provider
    async fn get_software_provider(&self) -> ServiceResult<Filiale>;
    async fn update(&self, id: u64, req: UpdateFilialeRequest, actor: u64) -> ServiceResult<Filiale>;
    async fn delete(&self, id: u64, actor: u64) -> ServiceResult<()>;
}
