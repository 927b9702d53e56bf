use std::sync::Arc;

use anyhow::Result;
use desk_axum::rest::ServiceRoute;
use desk_core::{DeskApp, ResourceService};

pub mod adapters;
pub mod catalog;
pub mod contracts;
pub mod conversations;
pub mod dashboard;
pub mod landing;
pub mod mailer;
pub mod settings;
pub mod tickets;
pub mod types;

pub use types::{SuiteParams, SuiteState};

use contracts::ContractsService;
use conversations::ConversationsService;
use dashboard::DashboardService;
use landing::LandingService;
use settings::SettingsService;
use tickets::TicketsService;

/// Every service and where it mounts.
pub fn routes(
    state: &Arc<SuiteState>,
) -> Vec<(ServiceRoute, Arc<dyn ResourceService<SuiteParams>>)> {
    let mut out: Vec<(ServiceRoute, Arc<dyn ResourceService<SuiteParams>>)> = vec![
        (
            tickets::tickets_shared::route(),
            Arc::new(TicketsService::new(Arc::clone(state))),
        ),
        (
            conversations::conversations_shared::route(),
            Arc::new(ConversationsService::new(Arc::clone(state))),
        ),
        (
            contracts::contracts_shared::route(),
            Arc::new(ContractsService::new(Arc::clone(state))),
        ),
        (
            landing::landing_shared::route(),
            Arc::new(LandingService::new(state)),
        ),
        (
            settings::settings_service::route(),
            Arc::new(SettingsService::new(state)),
        ),
        (
            dashboard::dashboard_service::route(),
            Arc::new(DashboardService::new(Arc::clone(state))),
        ),
    ];

    out.extend(catalog::routes(state));
    out
}

/// Hook registration; requires the services to be registered first.
pub fn register_hooks(app: &DeskApp<SuiteParams>, state: &Arc<SuiteState>) -> Result<()> {
    tickets::tickets_shared::register_hooks(app, state)?;
    contracts::contracts_shared::register_hooks(app)?;
    catalog::register_hooks(app)?;
    Ok(())
}
