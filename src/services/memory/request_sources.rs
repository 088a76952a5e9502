use async_trait::async_trait;
use chrono::Utc;

use super::{found, MemoryBackend};
use crate::services::{
    CreateRequestSourceRequest, RequestSource, RequestSourceService, ServiceError, ServiceResult,
    UpdateRequestSourceRequest,
};

const NOT_FOUND: &str = "Source introuvable";

fn duplicate_code(code: &str) -> ServiceError {
    ServiceError::invalid(format!("Une source avec le code '{}' existe déjà", code))
}

#[async_trait]
impl RequestSourceService for MemoryBackend {
    async fn create(&self, req: CreateRequestSourceRequest, actor: u64) -> ServiceResult<RequestSource> {
        let mut tables = self.tables.write().await;
        if tables.request_sources.find(|s| s.code == req.code).is_some() {
            return Err(duplicate_code(&req.code));
        }

        let now = Utc::now();
        Ok(tables.request_sources.insert_with(|id| RequestSource {
            id,
            code: req.code,
            name: req.name,
            description: req.description,
            is_active: req.is_active,
            created_by: actor,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn get_all(&self) -> ServiceResult<Vec<RequestSource>> {
        Ok(self.tables.read().await.request_sources.all())
    }

    async fn get_by_id(&self, id: u64) -> ServiceResult<RequestSource> {
        found(self.tables.read().await.request_sources.get(id).cloned(), NOT_FOUND)
    }

    async fn get_by_code(&self, code: &str) -> ServiceResult<RequestSource> {
        found(self.tables.read().await.request_sources.find(|s| s.code == code).cloned(), NOT_FOUND)
    }

    async fn update(&self, id: u64, req: UpdateRequestSourceRequest, actor: u64) -> ServiceResult<RequestSource> {
        let mut tables = self.tables.write().await;
        if !tables.request_sources.contains(id) {
            return Err(ServiceError::not_found(NOT_FOUND));
        }
        if let Some(code) = &req.code {
            if tables.request_sources.find(|s| &s.code == code && s.id != id).is_some() {
                return Err(duplicate_code(code));
            }
        }

        let source = found(tables.request_sources.get_mut(id), NOT_FOUND)?;
        if let Some(code) = req.code {
            source.code = code;
        }
        if let Some(name) = req.name {
            source.name = name;
        }
        if req.description.is_some() {
            source.description = req.description;
        }
        if let Some(is_active) = req.is_active {
            source.is_active = is_active;
        }
        source.updated_by = Some(actor);
        source.updated_at = Utc::now();

        Ok(source.clone())
    }

    async fn delete(&self, id: u64, _actor: u64) -> ServiceResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.request_sources.contains(id) {
            return Err(ServiceError::not_found(NOT_FOUND));
        }
        if tables.service_requests.find(|r| r.source_id == Some(id)).is_some() {
            return Err(ServiceError::invalid("Source utilisée par des demandes existantes"));
        }

        tables.request_sources.remove(id);
        Ok(())
    }
}
