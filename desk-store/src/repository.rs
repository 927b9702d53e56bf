use std::cmp::Ordering;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use desk_core::errors::DeskError;
use desk_core::query::{ListQuery, Page, SortDir};
use desk_core::resource::ResourceDescriptor;
use desk_core::scope::OwnershipScope;
use desk_core::ActorContext;

use crate::store::TenantMap;

/// Fields the repository owns; mutations can never overwrite them.
const PROTECTED_FIELDS: &[&str] = &["id", "creator_id", "created_by", "created_at"];

/// Scope-aware access to one collection.
///
/// Every read applies the ownership scope before anything else; every
/// mutation re-applies the same scope as the read path. The scope is
/// checked before existence, so an out-of-scope id reports `Forbidden`
/// whether or not the record exists.
#[derive(Clone)]
pub struct Repository {
    descriptor: &'static ResourceDescriptor,
    data: Arc<RwLock<TenantMap>>,
}

impl Repository {
    pub fn new(descriptor: &'static ResourceDescriptor, data: Arc<RwLock<TenantMap>>) -> Self {
        Self { descriptor, data }
    }

    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        self.descriptor
    }

    fn tenant_key(ctx: &ActorContext) -> &str {
        &ctx.tenant_id.0
    }

    fn forbidden(&self) -> anyhow::Error {
        DeskError::forbidden(format!(
            "You are not allowed to access this {}",
            self.descriptor.label.to_lowercase()
        ))
        .into_anyhow()
    }

    fn not_found(&self, id: &str) -> anyhow::Error {
        DeskError::not_found(self.descriptor.not_found_message(id)).into_anyhow()
    }

    fn matches_search(&self, record: &Value, needle: &str) -> bool {
        self.descriptor.search_fields.iter().any(|field| {
            record
                .get(field)
                .and_then(|v| v.as_str())
                .map(|v| v.to_lowercase().contains(needle))
                .unwrap_or(false)
        })
    }

    /// Scoped, filtered, sorted page of records.
    ///
    /// A `Deny` scope or an empty match is an empty page, never an error.
    pub async fn list(&self, ctx: &ActorContext, scope: &OwnershipScope, query: &ListQuery) -> Page<Value> {
        if scope.is_deny() {
            return Page::empty(query);
        }

        let needle = query.search.as_ref().map(|s| s.to_lowercase());

        let mut records: Vec<Value> = {
            let guard = self.data.read().await;
            match guard.get(Self::tenant_key(ctx)) {
                Some(map) => map
                    .values()
                    .filter(|r| scope.permits(r))
                    .filter(|r| match &needle {
                        Some(n) => self.matches_search(r, n),
                        None => true,
                    })
                    .cloned()
                    .collect(),
                None => Vec::new(),
            }
        };

        let sort_field = self.descriptor.sort_field(query.sort.as_deref()).to_string();
        let dir = query.dir;
        records.sort_by(|a, b| {
            let primary = cmp_field(a, b, &sort_field);
            let primary = match dir {
                SortDir::Asc => primary,
                SortDir::Desc => primary.reverse(),
            };
            // Stable id tie-break so pagination is deterministic across
            // equal sort values.
            primary.then_with(|| cmp_field(a, b, "id"))
        });

        Page::paginate(records, query)
    }

    /// Fetch one record within scope.
    pub async fn get(&self, ctx: &ActorContext, scope: &OwnershipScope, id: &str) -> Result<Value> {
        if scope.is_deny() {
            return Err(self.forbidden());
        }

        let guard = self.data.read().await;
        let record = guard
            .get(Self::tenant_key(ctx))
            .and_then(|m| m.get(id))
            .cloned()
            .ok_or_else(|| self.not_found(id))?;

        if !scope.permits(&record) {
            return Err(self.forbidden());
        }

        Ok(record)
    }

    /// Insert a new record, stamping id, creator, tenant, and timestamps.
    pub async fn insert(&self, ctx: &ActorContext, data: Value) -> Result<Value> {
        let mut obj = data.as_object().cloned().unwrap_or_default();

        let id = format!("{}:{}", self.descriptor.id_prefix, Uuid::new_v4());
        let now = Utc::now().to_rfc3339();

        obj.insert("id".to_string(), Value::String(id.clone()));
        obj.insert(
            "creator_id".to_string(),
            Value::String(ctx.actor_id.0.clone()),
        );
        obj.insert(
            "created_by".to_string(),
            Value::String(ctx.tenant_id.0.clone()),
        );
        obj.insert("created_at".to_string(), Value::String(now.clone()));
        obj.insert("updated_at".to_string(), Value::String(now));

        let record = Value::Object(obj);

        let mut guard = self.data.write().await;
        guard
            .entry(Self::tenant_key(ctx).to_string())
            .or_default()
            .insert(id, record.clone());

        Ok(record)
    }

    /// Insert with a caller-fixed id (tenant singletons like settings).
    pub async fn insert_fixed(&self, ctx: &ActorContext, id: &str, data: Value) -> Result<Value> {
        let mut obj = data.as_object().cloned().unwrap_or_default();
        let now = Utc::now().to_rfc3339();

        obj.insert("id".to_string(), Value::String(id.to_string()));
        obj.insert(
            "creator_id".to_string(),
            Value::String(ctx.actor_id.0.clone()),
        );
        obj.insert(
            "created_by".to_string(),
            Value::String(ctx.tenant_id.0.clone()),
        );
        obj.insert("created_at".to_string(), Value::String(now.clone()));
        obj.insert("updated_at".to_string(), Value::String(now));

        let record = Value::Object(obj);

        let mut guard = self.data.write().await;
        guard
            .entry(Self::tenant_key(ctx).to_string())
            .or_default()
            .insert(id.to_string(), record.clone());

        Ok(record)
    }

    /// Full replace within scope. Protected fields survive from the
    /// stored record.
    pub async fn replace(
        &self,
        ctx: &ActorContext,
        scope: &OwnershipScope,
        id: &str,
        data: Value,
    ) -> Result<Value> {
        if scope.is_deny() {
            return Err(self.forbidden());
        }

        let mut guard = self.data.write().await;
        let map = guard
            .entry(Self::tenant_key(ctx).to_string())
            .or_default();

        let existing = map.get(id).cloned().ok_or_else(|| self.not_found(id))?;
        if !scope.permits(&existing) {
            return Err(self.forbidden());
        }

        let mut obj = data.as_object().cloned().unwrap_or_default();
        carry_protected(&mut obj, &existing);
        obj.insert(
            "updated_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );

        let record = Value::Object(obj);
        map.insert(id.to_string(), record.clone());
        Ok(record)
    }

    /// Partial update within scope. Protected fields in the patch are
    /// ignored.
    pub async fn merge(
        &self,
        ctx: &ActorContext,
        scope: &OwnershipScope,
        id: &str,
        patch: Value,
    ) -> Result<Value> {
        if scope.is_deny() {
            return Err(self.forbidden());
        }

        let mut guard = self.data.write().await;
        let map = guard
            .entry(Self::tenant_key(ctx).to_string())
            .or_default();

        let existing = map.get(id).cloned().ok_or_else(|| self.not_found(id))?;
        if !scope.permits(&existing) {
            return Err(self.forbidden());
        }

        let mut obj = existing.as_object().cloned().unwrap_or_default();
        if let Some(fields) = patch.as_object() {
            for (k, v) in fields {
                if PROTECTED_FIELDS.contains(&k.as_str()) || k == "updated_at" {
                    continue;
                }
                obj.insert(k.clone(), v.clone());
            }
        }
        obj.insert(
            "updated_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );

        let record = Value::Object(obj);
        map.insert(id.to_string(), record.clone());
        Ok(record)
    }

    /// Remove one record within scope, returning it.
    pub async fn remove(&self, ctx: &ActorContext, scope: &OwnershipScope, id: &str) -> Result<Value> {
        if scope.is_deny() {
            return Err(self.forbidden());
        }

        let mut guard = self.data.write().await;
        let map = guard
            .entry(Self::tenant_key(ctx).to_string())
            .or_default();

        let existing = map.get(id).cloned().ok_or_else(|| self.not_found(id))?;
        if !scope.permits(&existing) {
            return Err(self.forbidden());
        }

        map.remove(id);
        Ok(existing)
    }

    /// Remove every record in the tenant partition whose `field` equals
    /// `value`, returning the removed records.
    ///
    /// Used for cascades after the parent mutation has already been
    /// authorized; no scope of its own.
    pub async fn remove_where(&self, ctx: &ActorContext, field: &str, value: &str) -> Vec<Value> {
        let mut guard = self.data.write().await;
        let Some(map) = guard.get_mut(Self::tenant_key(ctx)) else {
            return Vec::new();
        };

        let ids: Vec<String> = map
            .iter()
            .filter(|(_, r)| {
                r.get(field)
                    .and_then(|v| v.as_str())
                    .map(|v| v == value)
                    .unwrap_or(false)
            })
            .map(|(id, _)| id.clone())
            .collect();

        ids.iter().filter_map(|id| map.remove(id)).collect()
    }

    /// All records visible under the scope, unpaginated (aggregations).
    pub async fn scoped(&self, ctx: &ActorContext, scope: &OwnershipScope) -> Vec<Value> {
        if scope.is_deny() {
            return Vec::new();
        }

        let guard = self.data.read().await;
        match guard.get(Self::tenant_key(ctx)) {
            Some(map) => map.values().filter(|r| scope.permits(r)).cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Raw fetch by id within the tenant partition, no scope.
    pub async fn raw_get(&self, ctx: &ActorContext, id: &str) -> Option<Value> {
        let guard = self.data.read().await;
        guard
            .get(Self::tenant_key(ctx))
            .and_then(|m| m.get(id))
            .cloned()
    }

    /// Number of records in the tenant partition, scope-blind.
    pub async fn tenant_len(&self, ctx: &ActorContext) -> usize {
        let guard = self.data.read().await;
        guard
            .get(Self::tenant_key(ctx))
            .map(|m| m.len())
            .unwrap_or(0)
    }
}

fn carry_protected(obj: &mut Map<String, Value>, existing: &Value) {
    for field in PROTECTED_FIELDS {
        if let Some(v) = existing.get(*field) {
            obj.insert((*field).to_string(), v.clone());
        }
    }
}

fn cmp_field(a: &Value, b: &Value, field: &str) -> Ordering {
    cmp_values(a.get(field), b.get(field))
}

fn cmp_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => match (x, y) {
            (Value::Number(m), Value::Number(n)) => m
                .as_f64()
                .unwrap_or(0.0)
                .partial_cmp(&n.as_f64().unwrap_or(0.0))
                .unwrap_or(Ordering::Equal),
            (Value::String(s), Value::String(t)) => s.to_lowercase().cmp(&t.to_lowercase()),
            (Value::Bool(p), Value::Bool(q)) => p.cmp(q),
            _ => x.to_string().cmp(&y.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use desk_core::capability::CapabilitySet;
    use desk_core::resource::Visibility;
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    static TICKETS: ResourceDescriptor = ResourceDescriptor {
        collection: "tickets",
        capability_key: "support-tickets",
        id_prefix: "ticket",
        label: "Ticket",
        search_fields: &["ticket_number", "name", "email", "subject"],
        sort_fields: &["ticket_number", "status", "priority"],
        default_sort: "created_at",
        visibility: Visibility::CreatorOrOwner,
    };

    fn actor(id: &str, caps: &[&str]) -> ActorContext {
        ActorContext::new(id, "tenant-5", CapabilitySet::from_keys(caps.to_vec()))
    }

    fn scope(ctx: &ActorContext) -> OwnershipScope {
        OwnershipScope::resolve(ctx, &TICKETS)
    }

    async fn seed(repo: &Repository) -> (ActorContext, ActorContext) {
        let alice = actor("user-5", &["manage-own-support-tickets", "edit-support-tickets"]);
        let staff = actor(
            "staff-1",
            &[
                "manage-any-support-tickets",
                "create-support-tickets",
                "edit-support-tickets",
            ],
        );

        for i in 0..3 {
            repo.insert(&alice, json!({"subject": format!("alice {i}"), "email": "alice@example.com"}))
                .await
                .unwrap();
        }
        for i in 0..7 {
            repo.insert(&staff, json!({"subject": format!("staff {i}"), "email": "desk@example.com"}))
                .await
                .unwrap();
        }

        (alice, staff)
    }

    #[tokio::test]
    async fn own_scope_lists_only_created_rows_and_any_lists_all() {
        let store = MemoryStore::new();
        let repo = store.repository(&TICKETS);
        let (alice, staff) = seed(&repo).await;

        let page = repo.list(&alice, &scope(&alice), &ListQuery::default()).await;
        assert_eq!(page.total, 3);

        let page = repo.list(&staff, &scope(&staff), &ListQuery::default()).await;
        assert_eq!(page.total, 10);
    }

    #[tokio::test]
    async fn deny_scope_lists_empty_not_error() {
        let store = MemoryStore::new();
        let repo = store.repository(&TICKETS);
        let (alice, _) = seed(&repo).await;

        let nobody = actor("user-9", &[]);
        let page = repo.list(&nobody, &scope(&nobody), &ListQuery::default()).await;
        assert_eq!(page.total, 0);
        assert!(page.data.is_empty());

        // alice's rows are untouched
        let page = repo.list(&alice, &scope(&alice), &ListQuery::default()).await;
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn own_scope_includes_assigned_tickets() {
        let store = MemoryStore::new();
        let repo = store.repository(&TICKETS);
        let staff = actor("staff-1", &["manage-any-support-tickets"]);

        repo.insert(&staff, json!({"subject": "assigned", "user_id": "user-5"}))
            .await
            .unwrap();

        let alice = actor("user-5", &["manage-own-support-tickets"]);
        let page = repo.list(&alice, &scope(&alice), &ListQuery::default()).await;
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0]["subject"], "assigned");
    }

    #[tokio::test]
    async fn search_is_substring_case_insensitive_or_combined() {
        let store = MemoryStore::new();
        let repo = store.repository(&TICKETS);
        let staff = actor("staff-1", &["manage-any-support-tickets"]);

        repo.insert(&staff, json!({"subject": "Printer", "email": "alice@example.com"}))
            .await
            .unwrap();
        repo.insert(&staff, json!({"subject": "Alice's request", "email": "bob@example.com"}))
            .await
            .unwrap();
        repo.insert(&staff, json!({"subject": "Unrelated", "email": "carol@example.com"}))
            .await
            .unwrap();

        let query = ListQuery {
            search: Some("ALICE".to_string()),
            ..Default::default()
        };
        let page = repo.list(&staff, &scope(&staff), &query).await;
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn pagination_is_deterministic_with_totals() {
        let store = MemoryStore::new();
        let repo = store.repository(&TICKETS);
        let staff = actor("staff-1", &["manage-any-support-tickets"]);

        for i in 0..25 {
            repo.insert(&staff, json!({"subject": format!("t{i:02}"), "status": "open"}))
                .await
                .unwrap();
        }

        // status is equal everywhere; the id tie-break must keep pages
        // disjoint and exhaustive.
        let mut seen = std::collections::HashSet::new();
        for page_no in 1..=3 {
            let query = ListQuery {
                sort: Some("status".to_string()),
                page: page_no,
                per_page: 10,
                ..Default::default()
            };
            let page = repo.list(&staff, &scope(&staff), &query).await;
            assert_eq!(page.total, 25);
            assert_eq!(page.total_pages, 3);
            for r in &page.data {
                assert!(seen.insert(r["id"].as_str().unwrap().to_string()));
            }
        }
        assert_eq!(seen.len(), 25);
    }

    #[tokio::test]
    async fn sort_unknown_field_falls_back_to_newest_first() {
        let store = MemoryStore::new();
        let repo = store.repository(&TICKETS);
        let staff = actor("staff-1", &["manage-any-support-tickets"]);

        repo.insert(&staff, json!({"subject": "older"})).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.insert(&staff, json!({"subject": "newer"})).await.unwrap();

        let query = ListQuery {
            sort: Some("nonsense".to_string()),
            ..Default::default()
        };
        let page = repo.list(&staff, &scope(&staff), &query).await;
        assert_eq!(page.data[0]["subject"], "newer");
    }

    #[tokio::test]
    async fn mutations_reject_out_of_scope_records() {
        let store = MemoryStore::new();
        let repo = store.repository(&TICKETS);
        let (alice, staff) = seed(&repo).await;

        let staff_ticket = repo
            .list(&staff, &scope(&staff), &ListQuery::default())
            .await
            .data
            .into_iter()
            .find(|r| r["creator_id"] == "staff-1")
            .unwrap();
        let id = staff_ticket["id"].as_str().unwrap().to_string();

        // alice holds only manage-own; someone else's ticket is Forbidden,
        // matching what her index scope would (not) have returned.
        let err = repo
            .merge(&alice, &scope(&alice), &id, json!({"subject": "hijack"}))
            .await
            .unwrap_err();
        assert_eq!(DeskError::from_anyhow(&err).unwrap().code(), 403);

        let err = repo.remove(&alice, &scope(&alice), &id).await.unwrap_err();
        assert_eq!(DeskError::from_anyhow(&err).unwrap().code(), 403);
    }

    #[tokio::test]
    async fn missing_record_is_not_found_and_deny_is_forbidden() {
        let store = MemoryStore::new();
        let repo = store.repository(&TICKETS);
        let (alice, _) = seed(&repo).await;

        let err = repo.get(&alice, &scope(&alice), "ticket:missing").await.unwrap_err();
        assert_eq!(DeskError::from_anyhow(&err).unwrap().code(), 404);

        // capability checked before existence: with no capability the
        // same missing id reads as Forbidden.
        let nobody = actor("user-9", &[]);
        let err = repo.get(&nobody, &scope(&nobody), "ticket:missing").await.unwrap_err();
        assert_eq!(DeskError::from_anyhow(&err).unwrap().code(), 403);
    }

    #[tokio::test]
    async fn merge_preserves_protected_fields() {
        let store = MemoryStore::new();
        let repo = store.repository(&TICKETS);
        let staff = actor("staff-1", &["manage-any-support-tickets"]);

        let created = repo.insert(&staff, json!({"subject": "before"})).await.unwrap();
        let id = created["id"].as_str().unwrap();

        let patched = repo
            .merge(
                &staff,
                &scope(&staff),
                id,
                json!({"subject": "after", "creator_id": "intruder", "created_by": "other-tenant"}),
            )
            .await
            .unwrap();

        assert_eq!(patched["subject"], "after");
        assert_eq!(patched["creator_id"], "staff-1");
        assert_eq!(patched["created_by"], "tenant-5");
    }

    #[tokio::test]
    async fn tenants_never_see_each_other() {
        let store = MemoryStore::new();
        let repo = store.repository(&TICKETS);

        let a = ActorContext::new(
            "user-1",
            "tenant-a",
            CapabilitySet::from_keys(vec!["manage-any-support-tickets"]),
        );
        let b = ActorContext::new(
            "user-2",
            "tenant-b",
            CapabilitySet::from_keys(vec!["manage-any-support-tickets"]),
        );

        repo.insert(&a, json!({"subject": "tenant a"})).await.unwrap();

        let page = repo.list(&b, &OwnershipScope::resolve(&b, &TICKETS), &ListQuery::default()).await;
        assert_eq!(page.total, 0);
    }
}
