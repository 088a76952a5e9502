use async_trait::async_trait;

use super::{found, MemoryBackend};
use crate::services::{
    CreatePermissionRequest, PermissionDefinition, PermissionService, ServiceError, ServiceResult,
    UpdatePermissionRequest,
};

const NOT_FOUND: &str = "Permission introuvable";

#[async_trait]
impl PermissionService for MemoryBackend {
    async fn create(&self, req: CreatePermissionRequest, _actor: u64) -> ServiceResult<PermissionDefinition> {
        let mut tables = self.tables.write().await;
        if tables.permissions.find(|p| p.code == req.code).is_some() {
            return Err(ServiceError::invalid(format!(
                "Une permission avec le code '{}' existe déjà",
                req.code
            )));
        }

        Ok(tables.permissions.insert_with(|id| PermissionDefinition {
            id,
            code: req.code,
            name: req.name,
            module: req.module,
            description: req.description,
        }))
    }

    async fn get_all(&self, module: Option<&str>) -> ServiceResult<Vec<PermissionDefinition>> {
        let tables = self.tables.read().await;
        Ok(tables
            .permissions
            .values()
            .filter(|p| module.map_or(true, |m| p.module == m))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: u64) -> ServiceResult<PermissionDefinition> {
        found(self.tables.read().await.permissions.get(id).cloned(), NOT_FOUND)
    }

    async fn get_by_code(&self, code: &str) -> ServiceResult<PermissionDefinition> {
        found(self.tables.read().await.permissions.find(|p| p.code == code).cloned(), NOT_FOUND)
    }

    async fn update(&self, id: u64, req: UpdatePermissionRequest, _actor: u64) -> ServiceResult<PermissionDefinition> {
        let mut tables = self.tables.write().await;
        let permission = found(tables.permissions.get_mut(id), NOT_FOUND)?;
        if let Some(name) = req.name {
            permission.name = name;
        }
        if let Some(module) = req.module {
            permission.module = module;
        }
        if req.description.is_some() {
            permission.description = req.description;
        }

        Ok(permission.clone())
    }

    async fn delete(&self, id: u64, _actor: u64) -> ServiceResult<()> {
        let mut tables = self.tables.write().await;
        found(tables.permissions.remove(id), NOT_FOUND).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::Permission;

    #[tokio::test]
    async fn catalogue_is_seeded_from_permission_enum() {
        let backend = MemoryBackend::new();
        let all = PermissionService::get_all(&backend, None).await.unwrap();
        assert_eq!(all.len(), Permission::ALL.len());

        let stats = PermissionService::get_all(&backend, Some("stats")).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].code, "stats.view");
    }
}
