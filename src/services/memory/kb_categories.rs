use async_trait::async_trait;
use chrono::Utc;

use super::{found, MemoryBackend, Tables};
use crate::services::{
    CreateKbCategoryRequest, KbCategory, KbCategoryService, ServiceError, ServiceResult, UpdateKbCategoryRequest,
};

const NOT_FOUND: &str = "Catégorie introuvable";

fn check_code_free(tables: &Tables, code: &str, except: Option<u64>) -> ServiceResult<()> {
    match tables.kb_categories.find(|c| c.code == code && Some(c.id) != except) {
        Some(_) => Err(ServiceError::invalid(format!(
            "Une catégorie avec le code '{}' existe déjà",
            code
        ))),
        None => Ok(()),
    }
}

fn check_parent(tables: &Tables, parent_id: Option<u64>, own_id: Option<u64>) -> ServiceResult<()> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };
    if Some(parent_id) == own_id {
        return Err(ServiceError::invalid("Une catégorie ne peut pas être sa propre parente"));
    }
    if !tables.kb_categories.contains(parent_id) {
        return Err(ServiceError::invalid("Catégorie parente introuvable"));
    }

    // The new parent must not sit below the category being moved
    if let Some(own_id) = own_id {
        let mut cursor = Some(parent_id);
        let mut hops = 0;
        while let Some(current) = cursor {
            if current == own_id {
                return Err(ServiceError::invalid(
                    "Une catégorie ne peut pas être rattachée à l'une de ses sous-catégories",
                ));
            }
            hops += 1;
            if hops > tables.kb_categories.len() {
                break;
            }
            cursor = tables.kb_categories.get(current).and_then(|c| c.parent_id);
        }
    }
    Ok(())
}

#[async_trait]
impl KbCategoryService for MemoryBackend {
    async fn create(&self, req: CreateKbCategoryRequest, actor: u64) -> ServiceResult<KbCategory> {
        let mut tables = self.tables.write().await;
        check_code_free(&tables, &req.code, None)?;
        check_parent(&tables, req.parent_id, None)?;

        let now = Utc::now();
        Ok(tables.kb_categories.insert_with(|id| KbCategory {
            id,
            code: req.code,
            name: req.name,
            description: req.description,
            parent_id: req.parent_id,
            is_active: req.is_active,
            created_by: actor,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn get_all(&self) -> ServiceResult<Vec<KbCategory>> {
        Ok(self.tables.read().await.kb_categories.all())
    }

    async fn get_by_id(&self, id: u64) -> ServiceResult<KbCategory> {
        found(self.tables.read().await.kb_categories.get(id).cloned(), NOT_FOUND)
    }

    async fn get_by_code(&self, code: &str) -> ServiceResult<KbCategory> {
        found(self.tables.read().await.kb_categories.find(|c| c.code == code).cloned(), NOT_FOUND)
    }

    async fn update(&self, id: u64, req: UpdateKbCategoryRequest, actor: u64) -> ServiceResult<KbCategory> {
        let mut tables = self.tables.write().await;
        if !tables.kb_categories.contains(id) {
            return Err(ServiceError::not_found(NOT_FOUND));
        }
        if let Some(code) = &req.code {
            check_code_free(&tables, code, Some(id))?;
        }
        check_parent(&tables, req.parent_id, Some(id))?;

        let category = found(tables.kb_categories.get_mut(id), NOT_FOUND)?;
        if let Some(code) = req.code {
            category.code = code;
        }
        if let Some(name) = req.name {
            category.name = name;
        }
        if req.description.is_some() {
            category.description = req.description;
        }
        if req.parent_id.is_some() {
            category.parent_id = req.parent_id;
        }
        if let Some(is_active) = req.is_active {
            category.is_active = is_active;
        }
        category.updated_by = Some(actor);
        category.updated_at = Utc::now();

        Ok(category.clone())
    }

    async fn delete(&self, id: u64, _actor: u64) -> ServiceResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.kb_categories.contains(id) {
            return Err(ServiceError::not_found(NOT_FOUND));
        }
        if tables.kb_categories.find(|c| c.parent_id == Some(id)).is_some() {
            return Err(ServiceError::invalid(
                "Impossible de supprimer une catégorie contenant des sous-catégories",
            ));
        }

        tables.kb_categories.remove(id);
        Ok(())
    }
}
