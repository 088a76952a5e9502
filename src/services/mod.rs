//! Service interfaces consumed by the handlers, one per resource.
//!
//! Handlers only see these traits; `memory` provides the implementation the
//! binary and the tests run against.

pub mod filiale_service;
pub mod kb_category_service;
pub mod memory;
pub mod permission_service;
pub mod request_source_service;
pub mod service_request_service;
pub mod service_request_type_service;
pub mod statistics_service;
pub mod time_entry_service;

use std::sync::Arc;

pub use filiale_service::{CreateFilialeRequest, Filiale, FilialeService, UpdateFilialeRequest};
pub use kb_category_service::{CreateKbCategoryRequest, KbCategory, KbCategoryService, UpdateKbCategoryRequest};
pub use memory::MemoryBackend;
pub use permission_service::{
    CreatePermissionRequest, PermissionDefinition, PermissionService, UpdatePermissionRequest,
};
pub use request_source_service::{
    CreateRequestSourceRequest, RequestSource, RequestSourceService, UpdateRequestSourceRequest,
};
pub use service_request_service::{
    CreateServiceRequestRequest, Priority, ServiceRequest, ServiceRequestFilter, ServiceRequestService,
    ServiceRequestStatus, UpdateServiceRequestRequest,
};
pub use service_request_type_service::{
    CreateServiceRequestTypeRequest, ServiceRequestType, ServiceRequestTypeService, UpdateServiceRequestTypeRequest,
};
pub use statistics_service::{Metric, Overview, Period, StatisticsService, TrendPeriod, TrendPoint, TrendSeries, UserWorkload};
pub use time_entry_service::{CreateTimeEntryRequest, TimeEntry, TimeEntryFilter, TimeEntryService, UpdateTimeEntryRequest};

/// Outcome classes a service can report. The HTTP layer maps each to exactly one status.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    /// Business rule rejected the input (duplicate code, bad state transition, ...)
    #[error("{0}")]
    Invalid(String),
    #[error("caller identity could not be resolved")]
    Unauthenticated,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::Invalid(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Every collaborator the dispatcher can call
#[derive(Clone)]
pub struct Services {
    pub filiales: Arc<dyn FilialeService>,
    pub kb_categories: Arc<dyn KbCategoryService>,
    pub request_sources: Arc<dyn RequestSourceService>,
    pub service_request_types: Arc<dyn ServiceRequestTypeService>,
    pub service_requests: Arc<dyn ServiceRequestService>,
    pub time_entries: Arc<dyn TimeEntryService>,
    pub permissions: Arc<dyn PermissionService>,
    pub statistics: Arc<dyn StatisticsService>,
}

impl Services {
    /// All services backed by one shared in-memory store
    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(MemoryBackend::new()))
    }

    pub fn from_backend(backend: Arc<MemoryBackend>) -> Self {
        Self {
            filiales: backend.clone(),
            kb_categories: backend.clone(),
            request_sources: backend.clone(),
            service_request_types: backend.clone(),
            service_requests: backend.clone(),
            time_entries: backend.clone(),
            permissions: backend.clone(),
            statistics: backend,
        }
    }
}
