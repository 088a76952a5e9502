use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ServiceResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRequestStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl ServiceRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceRequestStatus::Open => "open",
            ServiceRequestStatus::InProgress => "in_progress",
            ServiceRequestStatus::Resolved => "resolved",
            ServiceRequestStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for ServiceRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ServiceRequestStatus::Open),
            "in_progress" => Ok(ServiceRequestStatus::InProgress),
            "resolved" => Ok(ServiceRequestStatus::Resolved),
            "closed" => Ok(ServiceRequestStatus::Closed),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: u64,
    /// Human-facing reference assigned by the service, e.g. `SR-000042`
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub type_id: u64,
    pub source_id: Option<u64>,
    pub filiale_id: u64,
    pub status: ServiceRequestStatus,
    pub priority: Priority,
    pub assignee_id: Option<u64>,
    pub created_by: u64,
    pub updated_by: Option<u64>,
    pub validated_by: Option<u64>,
    pub validated_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateServiceRequestRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub type_id: u64,
    #[validate(range(min = 1))]
    pub source_id: Option<u64>,
    #[validate(range(min = 1))]
    pub filiale_id: u64,
    /// Falls back to the type's default priority
    pub priority: Option<Priority>,
    #[validate(range(min = 1))]
    pub assignee_id: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateServiceRequestRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub type_id: Option<u64>,
    #[validate(range(min = 1))]
    pub source_id: Option<u64>,
    pub status: Option<ServiceRequestStatus>,
    pub priority: Option<Priority>,
    #[validate(range(min = 1))]
    pub assignee_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceRequestFilter {
    pub filiale_id: Option<u64>,
    pub status: Option<ServiceRequestStatus>,
}

#[async_trait]
pub trait ServiceRequestService: Send + Sync {
    async fn create(&self, req: CreateServiceRequestRequest, actor: u64) -> ServiceResult<ServiceRequest>;
    async fn get_all(&self, filter: ServiceRequestFilter) -> ServiceResult<Vec<ServiceRequest>>;
    async fn get_by_id(&self, id: u64) -> ServiceResult<ServiceRequest>;
    async fn get_by_code(&self, code: &str) -> ServiceResult<ServiceRequest>;
    async fn update(&self, id: u64, req: UpdateServiceRequestRequest, actor: u64) -> ServiceResult<ServiceRequest>;
    async fn delete(&self, id: u64, actor: u64) -> ServiceResult<()>;
    /// Sign off a resolved request
    async fn validate(&self, id: u64, actor: u64) -> ServiceResult<ServiceRequest>;
}
