use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use desk_axum::rest::ServiceRoute;
use desk_core::errors::DeskError;
use desk_core::query::Page;
use desk_core::scope::OwnershipScope;
use desk_core::{ActorContext, ResourceService, ServiceCapabilities, ServiceMethodKind};
use serde_json::{json, Value};

use crate::services::{contracts, tickets, SuiteParams, SuiteState};

pub fn route() -> ServiceRoute {
    ServiceRoute::new("dashboard", "dashboard", "Dashboard")
}

/// Read-only statistics over tickets and contracts.
///
/// Each block is scoped by the actor's own capabilities, so an agent
/// with `manage-own-support-tickets` sees counts over their tickets
/// only. A tenant with no data at all receives a demo data set so a
/// fresh dashboard is not empty.
pub struct DashboardService {
    state: Arc<SuiteState>,
}

impl DashboardService {
    pub fn new(state: Arc<SuiteState>) -> Self {
        Self { state }
    }
}

fn count_by(records: &[Value], field: &str, value: &str) -> usize {
    records
        .iter()
        .filter(|r| {
            r.get(field)
                .and_then(|v| v.as_str())
                .map(|v| v == value)
                .unwrap_or(false)
        })
        .count()
}

fn sum_values(records: &[Value], field: &str) -> f64 {
    records
        .iter()
        .filter_map(|r| r.get(field).and_then(|v| v.as_f64()))
        .sum()
}

/// `YYYY-MM` keys for the current month and the five before it,
/// oldest first.
fn last_six_months() -> Vec<String> {
    let now = Utc::now();
    let year = now.year();
    let month = now.month() as i32;

    (0..6)
        .rev()
        .map(|back| {
            let m0 = month - 1 - back;
            let y = year + m0.div_euclid(12);
            let m = m0.rem_euclid(12) + 1;
            format!("{y:04}-{m:02}")
        })
        .collect()
}

fn volume_series(records: &[Value]) -> Vec<Value> {
    last_six_months()
        .into_iter()
        .map(|key| {
            let count = records
                .iter()
                .filter(|r| {
                    r.get("created_at")
                        .and_then(|v| v.as_str())
                        .map(|ts| ts.starts_with(&key))
                        .unwrap_or(false)
                })
                .count();
            json!({"month": key, "count": count})
        })
        .collect()
}

fn demo_stats() -> Value {
    let months = last_six_months();
    let counts = [4, 2, 6, 3, 5, 4];
    let volume: Vec<Value> = months
        .into_iter()
        .zip(counts)
        .map(|(month, count)| json!({"month": month, "count": count}))
        .collect();

    json!({
        "demo": true,
        "tickets": {"total": 24, "open": 6, "pending": 3, "closed": 15},
        "contracts": {"total": 9, "draft": 2, "active": 6, "expired": 1, "total_value": 48500.0},
        "ticket_volume": volume,
    })
}

#[async_trait]
impl ResourceService<SuiteParams> for DashboardService {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Find])
    }

    async fn find(&self, ctx: &ActorContext, params: SuiteParams) -> Result<Page<Value>> {
        let ticket_scope = OwnershipScope::resolve(ctx, &tickets::DESCRIPTOR);
        let contract_scope = OwnershipScope::resolve(ctx, &contracts::DESCRIPTOR);

        if ticket_scope.is_deny() && contract_scope.is_deny() {
            return Err(
                DeskError::forbidden("You are not allowed to view the dashboard").into_anyhow()
            );
        }

        let ticket_repo = self.state.tickets();
        let contract_repo = self.state.contracts();

        let stats = if ticket_repo.tenant_len(ctx).await == 0
            && contract_repo.tenant_len(ctx).await == 0
        {
            demo_stats()
        } else {
            let tickets = ticket_repo.scoped(ctx, &ticket_scope).await;
            let contracts = contract_repo.scoped(ctx, &contract_scope).await;

            json!({
                "demo": false,
                "tickets": {
                    "total": tickets.len(),
                    "open": count_by(&tickets, "status", "open"),
                    "pending": count_by(&tickets, "status", "pending"),
                    "closed": count_by(&tickets, "status", "closed"),
                },
                "contracts": {
                    "total": contracts.len(),
                    "draft": count_by(&contracts, "status", "draft"),
                    "active": count_by(&contracts, "status", "active"),
                    "expired": count_by(&contracts, "status", "expired"),
                    "total_value": sum_values(&contracts, "value"),
                },
                "ticket_volume": volume_series(&tickets),
            })
        };

        Ok(Page {
            data: vec![stats],
            total: 1,
            page: 1,
            per_page: params.list.per_page,
            total_pages: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_month_keys_are_ordered_and_well_formed() {
        let months = last_six_months();
        assert_eq!(months.len(), 6);
        for key in &months {
            assert_eq!(key.len(), 7);
            assert_eq!(&key[4..5], "-");
        }
        let mut sorted = months.clone();
        sorted.sort();
        assert_eq!(months, sorted);
    }

    #[test]
    fn demo_stats_are_flagged() {
        let stats = demo_stats();
        assert_eq!(stats["demo"], true);
        assert_eq!(stats["ticket_volume"].as_array().unwrap().len(), 6);
    }
}
