use std::sync::Arc;

use desk_axum::params::{FromRestParams, RestParams};
use desk_blob::{AttachmentStore, LocalDiskStore};
use desk_core::query::ListQuery;
use desk_core::resource::ResourceDescriptor;
use desk_store::{MemoryStore, Repository};

use crate::services::mailer::{LogMailer, Mailer};

/// Params carried from the transport into every service call.
#[derive(Debug, Clone)]
pub struct SuiteParams {
    pub rest: RestParams,
    pub list: ListQuery,
}

impl FromRestParams for SuiteParams {
    fn from_rest_params(rest: RestParams) -> Self {
        let list = ListQuery::from_map(&rest.query);
        Self { rest, list }
    }
}

impl Default for SuiteParams {
    fn default() -> Self {
        Self {
            rest: RestParams::default(),
            list: ListQuery::default(),
        }
    }
}

/// Shared collaborators for every service: the store, the attachment
/// backend, and the mailer.
pub struct SuiteState {
    pub store: MemoryStore,
    pub attachments: Arc<dyn AttachmentStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl SuiteState {
    pub fn standard(attachments_root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            store: MemoryStore::new(),
            attachments: Arc::new(LocalDiskStore::new(attachments_root)),
            mailer: Arc::new(LogMailer),
        }
    }

    pub fn with_collaborators(
        attachments: Arc<dyn AttachmentStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store: MemoryStore::new(),
            attachments,
            mailer,
        }
    }

    pub fn repo(&self, descriptor: &'static ResourceDescriptor) -> Repository {
        self.store.repository(descriptor)
    }

    pub fn tickets(&self) -> Repository {
        self.repo(&crate::services::tickets::DESCRIPTOR)
    }

    pub fn conversations(&self) -> Repository {
        self.repo(&crate::services::conversations::DESCRIPTOR)
    }

    pub fn contracts(&self) -> Repository {
        self.repo(&crate::services::contracts::DESCRIPTOR)
    }
}
