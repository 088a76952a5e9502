use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ServiceResult;

/// Hours an agent spent on a service request on a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: u64,
    pub service_request_id: u64,
    pub user_id: u64,
    pub date: NaiveDate,
    pub hours: Decimal,
    pub description: Option<String>,
    pub validated: bool,
    pub validated_by: Option<u64>,
    pub validated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTimeEntryRequest {
    #[validate(range(min = 1))]
    pub service_request_id: u64,
    pub date: NaiveDate,
    pub hours: Decimal,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTimeEntryRequest {
    pub date: Option<NaiveDate>,
    pub hours: Option<Decimal>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeEntryFilter {
    pub service_request_id: Option<u64>,
    pub user_id: Option<u64>,
}

#[async_trait]
pub trait TimeEntryService: Send + Sync {
    /// `actor` is recorded as the entry's `user_id`
    async fn create(&self, req: CreateTimeEntryRequest, actor: u64) -> ServiceResult<TimeEntry>;
    async fn get_all(&self, filter: TimeEntryFilter) -> ServiceResult<Vec<TimeEntry>>;
    async fn get_by_id(&self, id: u64) -> ServiceResult<TimeEntry>;
    async fn update(&self, id: u64, req: UpdateTimeEntryRequest, actor: u64) -> ServiceResult<TimeEntry>;
    async fn delete(&self, id: u64, actor: u64) -> ServiceResult<()>;
    /// Lock the entry for payroll/billing
    async fn validate(&self, id: u64, actor: u64) -> ServiceResult<TimeEntry>;
}
