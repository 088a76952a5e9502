use async_trait::async_trait;
use chrono::Utc;

use super::{found, MemoryBackend, Tables};
use crate::services::{
    CreateServiceRequestRequest, ServiceError, ServiceRequest, ServiceRequestFilter, ServiceRequestService,
    ServiceRequestStatus, ServiceResult, UpdateServiceRequestRequest,
};

const NOT_FOUND: &str = "Demande introuvable";

fn request_code(id: u64) -> String {
    format!("SR-{:06}", id)
}

fn check_references(tables: &Tables, type_id: Option<u64>, source_id: Option<u64>) -> ServiceResult<()> {
    if let Some(type_id) = type_id {
        if !tables.service_request_types.contains(type_id) {
            return Err(ServiceError::invalid("Type de demande invalide"));
        }
    }
    if let Some(source_id) = source_id {
        if !tables.request_sources.contains(source_id) {
            return Err(ServiceError::invalid("Source de demande invalide"));
        }
    }
    Ok(())
}

#[async_trait]
impl ServiceRequestService for MemoryBackend {
    async fn create(&self, req: CreateServiceRequestRequest, actor: u64) -> ServiceResult<ServiceRequest> {
        let mut tables = self.tables.write().await;
        check_references(&tables, Some(req.type_id), req.source_id)?;
        if !tables.filiales.contains(req.filiale_id) {
            return Err(ServiceError::invalid("Filiale invalide"));
        }

        let priority = match req.priority {
            Some(priority) => priority,
            None => found(tables.service_request_types.get(req.type_id), "Type introuvable")?.default_priority,
        };

        let now = Utc::now();
        let request = tables.service_requests.insert_with(|id| ServiceRequest {
            id,
            code: request_code(id),
            title: req.title,
            description: req.description,
            type_id: req.type_id,
            source_id: req.source_id,
            filiale_id: req.filiale_id,
            status: ServiceRequestStatus::Open,
            priority,
            assignee_id: req.assignee_id,
            created_by: actor,
            updated_by: None,
            validated_by: None,
            validated_at: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        });

        tracing::info!(request = %request.code, actor, "Service request created");
        Ok(request)
    }

    async fn get_all(&self, filter: ServiceRequestFilter) -> ServiceResult<Vec<ServiceRequest>> {
        let tables = self.tables.read().await;
        Ok(tables
            .service_requests
            .values()
            .filter(|r| filter.filiale_id.map_or(true, |id| r.filiale_id == id))
            .filter(|r| filter.status.map_or(true, |status| r.status == status))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: u64) -> ServiceResult<ServiceRequest> {
        found(self.tables.read().await.service_requests.get(id).cloned(), NOT_FOUND)
    }

    async fn get_by_code(&self, code: &str) -> ServiceResult<ServiceRequest> {
        found(self.tables.read().await.service_requests.find(|r| r.code == code).cloned(), NOT_FOUND)
    }

    async fn update(&self, id: u64, req: UpdateServiceRequestRequest, actor: u64) -> ServiceResult<ServiceRequest> {
        let mut tables = self.tables.write().await;
        if !tables.service_requests.contains(id) {
            return Err(ServiceError::not_found(NOT_FOUND));
        }
        check_references(&tables, req.type_id, req.source_id)?;

        let request = found(tables.service_requests.get_mut(id), NOT_FOUND)?;
        if request.validated_by.is_some() {
            return Err(ServiceError::invalid("Une demande validée ne peut plus être modifiée"));
        }

        let now = Utc::now();
        if let Some(title) = req.title {
            request.title = title;
        }
        if req.description.is_some() {
            request.description = req.description;
        }
        if let Some(type_id) = req.type_id {
            request.type_id = type_id;
        }
        if req.source_id.is_some() {
            request.source_id = req.source_id;
        }
        if let Some(priority) = req.priority {
            request.priority = priority;
        }
        if req.assignee_id.is_some() {
            request.assignee_id = req.assignee_id;
        }
        if let Some(status) = req.status {
            if status != ServiceRequestStatus::Resolved {
                request.resolved_at = None;
            } else if request.status != ServiceRequestStatus::Resolved {
                request.resolved_at = Some(now);
            }
            request.status = status;
        }
        request.updated_by = Some(actor);
        request.updated_at = now;

        Ok(request.clone())
    }

    async fn delete(&self, id: u64, actor: u64) -> ServiceResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.service_requests.contains(id) {
            return Err(ServiceError::not_found(NOT_FOUND));
        }
        if tables.time_entries.find(|e| e.service_request_id == id).is_some() {
            return Err(ServiceError::invalid(
                "Impossible de supprimer une demande avec des saisies de temps",
            ));
        }

        tables.service_requests.remove(id);
        tracing::info!(request_id = id, actor, "Service request deleted");
        Ok(())
    }

    async fn validate(&self, id: u64, actor: u64) -> ServiceResult<ServiceRequest> {
        let mut tables = self.tables.write().await;
        let request = found(tables.service_requests.get_mut(id), NOT_FOUND)?;
        if request.validated_by.is_some() {
            return Err(ServiceError::invalid("Demande déjà validée"));
        }
        if request.status != ServiceRequestStatus::Resolved {
            return Err(ServiceError::invalid("Seule une demande résolue peut être validée"));
        }

        let now = Utc::now();
        request.validated_by = Some(actor);
        request.validated_at = Some(now);
        request.updated_by = Some(actor);
        request.updated_at = now;

        Ok(request.clone())
    }
}
