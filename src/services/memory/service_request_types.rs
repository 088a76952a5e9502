use async_trait::async_trait;
use chrono::Utc;

use super::{found, MemoryBackend};
use crate::services::{
    CreateServiceRequestTypeRequest, ServiceError, ServiceRequestType, ServiceRequestTypeService, ServiceResult,
    UpdateServiceRequestTypeRequest,
};

const NOT_FOUND: &str = "Type introuvable";

fn duplicate_code(code: &str) -> ServiceError {
    ServiceError::invalid(format!("Un type avec le code '{}' existe déjà", code))
}

#[async_trait]
impl ServiceRequestTypeService for MemoryBackend {
    async fn create(&self, req: CreateServiceRequestTypeRequest, actor: u64) -> ServiceResult<ServiceRequestType> {
        let mut tables = self.tables.write().await;
        if tables.service_request_types.find(|t| t.code == req.code).is_some() {
            return Err(duplicate_code(&req.code));
        }

        let now = Utc::now();
        Ok(tables.service_request_types.insert_with(|id| ServiceRequestType {
            id,
            code: req.code,
            name: req.name,
            description: req.description,
            default_priority: req.default_priority,
            is_active: req.is_active,
            created_by: actor,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn get_all(&self) -> ServiceResult<Vec<ServiceRequestType>> {
        Ok(self.tables.read().await.service_request_types.all())
    }

    async fn get_by_id(&self, id: u64) -> ServiceResult<ServiceRequestType> {
        found(self.tables.read().await.service_request_types.get(id).cloned(), NOT_FOUND)
    }

    async fn update(
        &self,
        id: u64,
        req: UpdateServiceRequestTypeRequest,
        actor: u64,
    ) -> ServiceResult<ServiceRequestType> {
        let mut tables = self.tables.write().await;
        if !tables.service_request_types.contains(id) {
            return Err(ServiceError::not_found(NOT_FOUND));
        }
        if let Some(code) = &req.code {
            if tables.service_request_types.find(|t| &t.code == code && t.id != id).is_some() {
                return Err(duplicate_code(code));
            }
        }

        let request_type = found(tables.service_request_types.get_mut(id), NOT_FOUND)?;
        if let Some(code) = req.code {
            request_type.code = code;
        }
        if let Some(name) = req.name {
            request_type.name = name;
        }
        if req.description.is_some() {
            request_type.description = req.description;
        }
        if let Some(priority) = req.default_priority {
            request_type.default_priority = priority;
        }
        if let Some(is_active) = req.is_active {
            request_type.is_active = is_active;
        }
        request_type.updated_by = Some(actor);
        request_type.updated_at = Utc::now();

        Ok(request_type.clone())
    }

    async fn delete(&self, id: u64, _actor: u64) -> ServiceResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.service_request_types.contains(id) {
            return Err(ServiceError::not_found(NOT_FOUND));
        }
        if tables.service_requests.find(|r| r.type_id == id).is_some() {
            return Err(ServiceError::invalid("Type utilisé par des demandes existantes"));
        }

        tables.service_request_types.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Priority;

    fn request(code: &str) -> CreateServiceRequestTypeRequest {
        CreateServiceRequestTypeRequest {
            code: code.to_string(),
            name: code.to_string(),
            description: None,
            default_priority: Priority::default(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn update_of_missing_type_is_not_found_even_with_taken_code() {
        let backend = MemoryBackend::new();
        ServiceRequestTypeService::create(&backend, request("T"), 1).await.unwrap();

        let update = UpdateServiceRequestTypeRequest {
            code: Some("T".into()),
            ..Default::default()
        };
        let err = ServiceRequestTypeService::update(&backend, 99, update, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_to_taken_code_is_rejected() {
        let backend = MemoryBackend::new();
        ServiceRequestTypeService::create(&backend, request("INC"), 1).await.unwrap();
        let other = ServiceRequestTypeService::create(&backend, request("DEM"), 1).await.unwrap();

        let update = UpdateServiceRequestTypeRequest {
            code: Some("INC".into()),
            ..Default::default()
        };
        let err = ServiceRequestTypeService::update(&backend, other.id, update, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
    }
}
