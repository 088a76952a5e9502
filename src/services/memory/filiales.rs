use async_trait::async_trait;
use chrono::Utc;

use super::{found, MemoryBackend};
use crate::services::{
    CreateFilialeRequest, Filiale, FilialeService, ServiceError, ServiceResult, UpdateFilialeRequest,
};

const NOT_FOUND: &str = "Filiale introuvable";

fn duplicate_code(code: &str) -> ServiceError {
    ServiceError::invalid(format!("Une filiale avec le code '{}' existe déjà", code))
}

#[async_trait]
impl FilialeService for MemoryBackend {
    async fn create(&self, req: CreateFilialeRequest, actor: u64) -> ServiceResult<Filiale> {
        let mut tables = self.tables.write().await;
        if tables.filiales.find(|f| f.code == req.code).is_some() {
            return Err(duplicate_code(&req.code));
        }

        let now = Utc::now();
        let filiale = tables.filiales.insert_with(|id| Filiale {
            id,
            code: req.code,
            name: req.name,
            address: req.address,
            phone: req.phone,
            email: req.email,
            is_active: req.is_active,
            is_software_provider: req.is_software_provider,
            created_by: actor,
            updated_by: None,
            created_at: now,
            updated_at: now,
        });

        tracing::info!(filiale_id = filiale.id, actor, "Filiale created");
        Ok(filiale)
    }

    async fn get_all(&self) -> ServiceResult<Vec<Filiale>> {
        Ok(self.tables.read().await.filiales.all())
    }

    async fn get_active(&self) -> ServiceResult<Vec<Filiale>> {
        let tables = self.tables.read().await;
        Ok(tables.filiales.values().filter(|f| f.is_active).cloned().collect())
    }

    async fn get_by_id(&self, id: u64) -> ServiceResult<Filiale> {
        found(self.tables.read().await.filiales.get(id).cloned(), NOT_FOUND)
    }

    async fn get_by_code(&self, code: &str) -> ServiceResult<Filiale> {
        found(self.tables.read().await.filiales.find(|f| f.code == code).cloned(), NOT_FOUND)
    }

    async fn get_software_provider(&self) -> ServiceResult<Filiale> {
        let tables = self.tables.read().await;
        found(
            tables.filiales.find(|f| f.is_software_provider).cloned(),
            "Aucune filiale n'est définie comme fournisseur de logiciel",
        )
    }

    async fn update(&self, id: u64, req: UpdateFilialeRequest, actor: u64) -> ServiceResult<Filiale> {
        let mut tables = self.tables.write().await;
        if !tables.filiales.contains(id) {
            return Err(ServiceError::not_found(NOT_FOUND));
        }
        if let Some(code) = &req.code {
            if tables.filiales.find(|f| &f.code == code && f.id != id).is_some() {
                return Err(duplicate_code(code));
            }
        }

        let filiale = found(tables.filiales.get_mut(id), NOT_FOUND)?;
        if let Some(code) = req.code {
            filiale.code = code;
        }
        if let Some(name) = req.name {
            filiale.name = name;
        }
        if req.address.is_some() {
            filiale.address = req.address;
        }
        if req.phone.is_some() {
            filiale.phone = req.phone;
        }
        if req.email.is_some() {
            filiale.email = req.email;
        }
        if let Some(is_active) = req.is_active {
            filiale.is_active = is_active;
        }
        if let Some(provider) = req.is_software_provider {
            filiale.is_software_provider = provider;
        }
        filiale.updated_by = Some(actor);
        filiale.updated_at = Utc::now();

        Ok(filiale.clone())
    }

    async fn delete(&self, id: u64, actor: u64) -> ServiceResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.filiales.contains(id) {
            return Err(ServiceError::not_found(NOT_FOUND));
        }
        if tables.service_requests.find(|r| r.filiale_id == id).is_some() {
            return Err(ServiceError::invalid("Filiale utilisée par des demandes existantes"));
        }

        tables.filiales.remove(id);
        tracing::info!(filiale_id = id, actor, "Filiale deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(code: &str, provider: bool) -> CreateFilialeRequest {
        CreateFilialeRequest {
            code: code.to_string(),
            name: format!("Filiale {}", code),
            address: None,
            phone: None,
            email: None,
            is_active: true,
            is_software_provider: provider,
        }
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected() {
        let backend = MemoryBackend::new();
        FilialeService::create(&backend, request("ABJ", false), 1).await.unwrap();

        let err = FilialeService::create(&backend, request("ABJ", false), 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[tokio::test]
    async fn update_keeps_own_code_and_stamps_actor() {
        let backend = MemoryBackend::new();
        let created = FilialeService::create(&backend, request("DKR", false), 1).await.unwrap();

        let update = UpdateFilialeRequest {
            code: Some("DKR".to_string()),
            name: Some("Dakar".to_string()),
            ..Default::default()
        };
        let updated = FilialeService::update(&backend, created.id, update, 9).await.unwrap();
        assert_eq!(updated.name, "Dakar");
        assert_eq!(updated.updated_by, Some(9));
    }

    #[tokio::test]
    async fn software_provider_lookup() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.get_software_provider().await,
            Err(ServiceError::NotFound(_))
        ));

        FilialeService::create(&backend, request("HQ", true), 1).await.unwrap();
        assert_eq!(backend.get_software_provider().await.unwrap().code, "HQ");
    }

    #[tokio::test]
    async fn get_active_skips_inactive_branches() {
        let backend = MemoryBackend::new();
        let mut closed = request("OLD", false);
        closed.is_active = false;
        FilialeService::create(&backend, closed, 1).await.unwrap();
        FilialeService::create(&backend, request("NEW", false), 1).await.unwrap();

        let active = backend.get_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].code, "NEW");
    }
}
