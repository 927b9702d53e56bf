//! The plain resources: everything that needs nothing beyond the
//! generic scoped CRUD plus required-field checks.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use desk_axum::rest::ServiceRoute;
use desk_core::hooks::{BeforeHook, HookContext};
use desk_core::resource::{ResourceDescriptor, Visibility};
use desk_core::{DeskApp, ResourceService, ServiceMethodKind};
use desk_schema::SchemaErrors;

use crate::services::adapters::ScopedCrudService;
use crate::services::{SuiteParams, SuiteState};

pub static FAQS: ResourceDescriptor = ResourceDescriptor {
    collection: "faqs",
    capability_key: "faqs",
    id_prefix: "faq",
    label: "FAQ",
    search_fields: &["question", "answer"],
    sort_fields: &[],
    default_sort: "created_at",
    visibility: Visibility::CreatorOnly,
};

pub static KB_CATEGORIES: ResourceDescriptor = ResourceDescriptor {
    collection: "kb_categories",
    capability_key: "kb-categories",
    id_prefix: "kbcat",
    label: "Category",
    search_fields: &["name"],
    sort_fields: &["name"],
    default_sort: "created_at",
    visibility: Visibility::CreatorOnly,
};

pub static KB_ARTICLES: ResourceDescriptor = ResourceDescriptor {
    collection: "kb_articles",
    capability_key: "kb-articles",
    id_prefix: "kbart",
    label: "Article",
    search_fields: &["title", "body"],
    sort_fields: &["title"],
    default_sort: "created_at",
    visibility: Visibility::CreatorOnly,
};

pub static QUICK_LINKS: ResourceDescriptor = ResourceDescriptor {
    collection: "quick_links",
    capability_key: "quick-links",
    id_prefix: "qlink",
    label: "Quick link",
    search_fields: &["title", "url"],
    sort_fields: &["title"],
    default_sort: "created_at",
    visibility: Visibility::CreatorOnly,
};

pub static CUSTOM_PAGES: ResourceDescriptor = ResourceDescriptor {
    collection: "custom_pages",
    capability_key: "custom-pages",
    id_prefix: "page",
    label: "Page",
    search_fields: &["title", "slug"],
    sort_fields: &["title"],
    default_sort: "created_at",
    visibility: Visibility::CreatorOnly,
};

pub static CONTRACT_COMMENTS: ResourceDescriptor = ResourceDescriptor {
    collection: "contract_comments",
    capability_key: "contract-comments",
    id_prefix: "comment",
    label: "Comment",
    search_fields: &["comment"],
    sort_fields: &[],
    default_sort: "created_at",
    visibility: Visibility::CreatorOnly,
};

pub static CONTRACT_NOTES: ResourceDescriptor = ResourceDescriptor {
    collection: "contract_notes",
    capability_key: "contract-notes",
    id_prefix: "note",
    label: "Note",
    search_fields: &["note"],
    sort_fields: &[],
    default_sort: "created_at",
    visibility: Visibility::CreatorOnly,
};

pub static CONTRACT_RENEWALS: ResourceDescriptor = ResourceDescriptor {
    collection: "contract_renewals",
    capability_key: "contract-renewals",
    id_prefix: "renewal",
    label: "Renewal",
    search_fields: &["renewal_number"],
    sort_fields: &["renew_date"],
    default_sort: "created_at",
    visibility: Visibility::CreatorOnly,
};

pub static CONTRACT_SIGNATURES: ResourceDescriptor = ResourceDescriptor {
    collection: "contract_signatures",
    capability_key: "contract-signatures",
    id_prefix: "signature",
    label: "Signature",
    search_fields: &["signer_name", "signer_email"],
    sort_fields: &[],
    default_sort: "created_at",
    visibility: Visibility::CreatorOnly,
};

struct CatalogEntry {
    descriptor: &'static ResourceDescriptor,
    route: ServiceRoute,
    required_fields: &'static [&'static str],
}

fn catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            descriptor: &FAQS,
            route: ServiceRoute::new("faqs", "faqs", "FAQ"),
            required_fields: &["question", "answer"],
        },
        CatalogEntry {
            descriptor: &KB_CATEGORIES,
            route: ServiceRoute::new("kb-categories", "kb/categories", "Category"),
            required_fields: &["name"],
        },
        CatalogEntry {
            descriptor: &KB_ARTICLES,
            route: ServiceRoute::new("kb-articles", "kb/articles", "Article"),
            required_fields: &["title", "body"],
        },
        CatalogEntry {
            descriptor: &QUICK_LINKS,
            route: ServiceRoute::new("quick-links", "quick-links", "Quick link"),
            required_fields: &["title", "url"],
        },
        CatalogEntry {
            descriptor: &CUSTOM_PAGES,
            route: ServiceRoute::new("custom-pages", "pages", "Page"),
            required_fields: &["title", "slug"],
        },
        CatalogEntry {
            descriptor: &CONTRACT_COMMENTS,
            route: ServiceRoute::new("contract-comments", "contracts/comments", "Comment"),
            required_fields: &["contract_id", "comment"],
        },
        CatalogEntry {
            descriptor: &CONTRACT_NOTES,
            route: ServiceRoute::new("contract-notes", "contracts/notes", "Note"),
            required_fields: &["contract_id", "note"],
        },
        CatalogEntry {
            descriptor: &CONTRACT_RENEWALS,
            route: ServiceRoute::new("contract-renewals", "contracts/renewals", "Renewal"),
            required_fields: &["contract_id", "renew_date"],
        },
        CatalogEntry {
            descriptor: &CONTRACT_SIGNATURES,
            route: ServiceRoute::new("contract-signatures", "contracts/signatures", "Signature"),
            required_fields: &["contract_id", "signer_name", "signer_email"],
        },
    ]
}

pub fn routes(
    state: &Arc<SuiteState>,
) -> Vec<(ServiceRoute, Arc<dyn ResourceService<SuiteParams>>)> {
    catalog()
        .into_iter()
        .map(|entry| {
            let svc: Arc<dyn ResourceService<SuiteParams>> =
                Arc::new(ScopedCrudService::new(state, entry.descriptor));
            (entry.route, svc)
        })
        .collect()
}

pub fn register_hooks(app: &DeskApp<SuiteParams>) -> Result<()> {
    for entry in catalog() {
        let validate = Arc::new(RequireFields {
            label: entry.descriptor.label,
            fields: entry.required_fields,
        });

        app.service(entry.route.name)?.hooks(|h| {
            h.before(ServiceMethodKind::Create, validate.clone());
            h.before(ServiceMethodKind::Update, validate);
        });
    }

    Ok(())
}

/// Required-field check for the plain resources.
pub struct RequireFields {
    label: &'static str,
    fields: &'static [&'static str],
}

#[async_trait]
impl BeforeHook<SuiteParams> for RequireFields {
    async fn run(&self, ctx: &mut HookContext<SuiteParams>) -> Result<()> {
        let Some(data) = ctx.data.as_ref() else {
            return Ok(());
        };

        let mut errors = SchemaErrors::default();
        for field in self.fields {
            let present = data
                .get(field)
                .and_then(|v| v.as_str())
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false);
            if !present {
                errors.push_field(field, "is required");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into_unprocessable_anyhow(&format!("{} validation failed", self.label)))
        }
    }
}
