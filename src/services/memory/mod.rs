//! In-memory implementation of every service trait.
//!
//! All tables live behind one async `RwLock` so cross-resource rules
//! (a type still referenced by requests, a request with time entries)
//! are checked against a consistent snapshot.

mod filiales;
mod kb_categories;
mod permissions;
mod request_sources;
mod service_request_types;
mod service_requests;
mod statistics;
mod time_entries;

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use super::{
    Filiale, KbCategory, PermissionDefinition, RequestSource, ServiceError, ServiceRequest, ServiceRequestType,
    ServiceResult, TimeEntry,
};
use crate::security::Permission;

pub struct MemoryBackend {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    filiales: Table<Filiale>,
    kb_categories: Table<KbCategory>,
    request_sources: Table<RequestSource>,
    service_request_types: Table<ServiceRequestType>,
    service_requests: Table<ServiceRequest>,
    time_entries: Table<TimeEntry>,
    permissions: Table<PermissionDefinition>,
}

/// Rows keyed by id, ids handed out sequentially from 1
struct Table<T> {
    rows: BTreeMap<u64, T>,
    last_id: u64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(u64) -> T) -> T {
        self.last_id += 1;
        let row = build(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        row
    }

    fn get(&self, id: u64) -> Option<&T> {
        self.rows.get(&id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    fn remove(&mut self, id: u64) -> Option<T> {
        self.rows.remove(&id)
    }

    fn contains(&self, id: u64) -> bool {
        self.rows.contains_key(&id)
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<&T> {
        self.rows.values().find(|row| predicate(row))
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }
}

fn found<T>(row: Option<T>, message: &str) -> ServiceResult<T> {
    row.ok_or_else(|| ServiceError::not_found(message))
}

impl MemoryBackend {
    /// Empty store with the permission catalogue pre-seeded
    pub fn new() -> Self {
        let mut tables = Tables::default();
        for permission in Permission::ALL {
            tables.permissions.insert_with(|id| PermissionDefinition {
                id,
                code: permission.code().to_string(),
                name: permission.label().to_string(),
                module: permission.module().to_string(),
                description: None,
            });
        }

        Self {
            tables: RwLock::new(tables),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}
