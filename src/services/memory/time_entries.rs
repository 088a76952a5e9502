use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use super::{found, MemoryBackend};
use crate::services::{
    CreateTimeEntryRequest, ServiceError, ServiceResult, TimeEntry, TimeEntryFilter, TimeEntryService,
    UpdateTimeEntryRequest,
};

const NOT_FOUND: &str = "Saisie de temps introuvable";

fn check_hours(hours: Decimal) -> ServiceResult<()> {
    if hours <= Decimal::ZERO || hours > Decimal::from(24) {
        return Err(ServiceError::invalid("Le nombre d'heures doit être compris entre 0 et 24"));
    }
    Ok(())
}

#[async_trait]
impl TimeEntryService for MemoryBackend {
    async fn create(&self, req: CreateTimeEntryRequest, actor: u64) -> ServiceResult<TimeEntry> {
        check_hours(req.hours)?;

        let mut tables = self.tables.write().await;
        if !tables.service_requests.contains(req.service_request_id) {
            return Err(ServiceError::invalid("Demande de service invalide"));
        }

        let now = Utc::now();
        Ok(tables.time_entries.insert_with(|id| TimeEntry {
            id,
            service_request_id: req.service_request_id,
            user_id: actor,
            date: req.date,
            hours: req.hours,
            description: req.description,
            validated: false,
            validated_by: None,
            validated_at: None,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn get_all(&self, filter: TimeEntryFilter) -> ServiceResult<Vec<TimeEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .time_entries
            .values()
            .filter(|e| filter.service_request_id.map_or(true, |id| e.service_request_id == id))
            .filter(|e| filter.user_id.map_or(true, |id| e.user_id == id))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: u64) -> ServiceResult<TimeEntry> {
        found(self.tables.read().await.time_entries.get(id).cloned(), NOT_FOUND)
    }

    async fn update(&self, id: u64, req: UpdateTimeEntryRequest, _actor: u64) -> ServiceResult<TimeEntry> {
        if let Some(hours) = req.hours {
            check_hours(hours)?;
        }

        let mut tables = self.tables.write().await;
        let entry = found(tables.time_entries.get_mut(id), NOT_FOUND)?;
        if entry.validated {
            return Err(ServiceError::invalid("Saisie de temps déjà validée"));
        }

        if let Some(date) = req.date {
            entry.date = date;
        }
        if let Some(hours) = req.hours {
            entry.hours = hours;
        }
        if req.description.is_some() {
            entry.description = req.description;
        }
        entry.updated_at = Utc::now();

        Ok(entry.clone())
    }

    async fn delete(&self, id: u64, _actor: u64) -> ServiceResult<()> {
        let mut tables = self.tables.write().await;
        if found(tables.time_entries.get(id), NOT_FOUND)?.validated {
            return Err(ServiceError::invalid("Saisie de temps déjà validée"));
        }

        tables.time_entries.remove(id);
        Ok(())
    }

    async fn validate(&self, id: u64, actor: u64) -> ServiceResult<TimeEntry> {
        let mut tables = self.tables.write().await;
        let entry = found(tables.time_entries.get_mut(id), NOT_FOUND)?;
        if entry.validated {
            return Err(ServiceError::invalid("Saisie de temps déjà validée"));
        }

        let now = Utc::now();
        entry.validated = true;
        entry.validated_by = Some(actor);
        entry.validated_at = Some(now);
        entry.updated_at = now;

        Ok(entry.clone())
    }
}
