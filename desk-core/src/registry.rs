use std::collections::HashMap;
use std::sync::Arc;

use crate::ResourceService;

/// Maps service names to service instances.
///
/// Named services are the unit of composition: any transport (HTTP,
/// CLI, tests) resolves a service by name and calls it through the
/// pipeline.
pub struct ServiceRegistry<P = ()> {
    services: HashMap<String, Arc<dyn ResourceService<P>>>,
}

impl<P> ServiceRegistry<P> {
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    pub fn register<S>(&mut self, name: S, service: Arc<dyn ResourceService<P>>)
    where
        S: Into<String>,
    {
        self.services.insert(name.into(), service);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ResourceService<P>>> {
        self.services.get(name)
    }
}

impl<P> Default for ServiceRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}
