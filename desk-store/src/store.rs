use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock as StdRwLock};

use serde_json::Value;
use tokio::sync::RwLock;

use desk_core::resource::ResourceDescriptor;

use crate::repository::Repository;

/// Records for one collection: tenant key → (record id → record).
///
/// The inner map is ordered by id so equal-sort-key pagination stays
/// stable.
pub type TenantMap = HashMap<String, BTreeMap<String, Value>>;

/// The shared mutable store. One async lock per collection.
#[derive(Default)]
pub struct MemoryStore {
    collections: StdRwLock<HashMap<String, Arc<RwLock<TenantMap>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared handle for a collection, created on first use.
    pub fn collection(&self, name: &str) -> Arc<RwLock<TenantMap>> {
        if let Some(existing) = self.collections.read().unwrap().get(name) {
            return Arc::clone(existing);
        }

        let mut map = self.collections.write().unwrap();
        Arc::clone(
            map.entry(name.to_string())
                .or_insert_with(|| Arc::new(RwLock::new(TenantMap::new()))),
        )
    }

    /// A repository bound to the descriptor's collection.
    pub fn repository(&self, descriptor: &'static ResourceDescriptor) -> Repository {
        Repository::new(descriptor, self.collection(descriptor.collection))
    }
}
