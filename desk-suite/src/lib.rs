mod app;
mod hooks;
pub mod services;

use std::sync::Arc;

use anyhow::Result;
use desk_axum::AxumApp;

use crate::services::{SuiteParams, SuiteState};

/// Build the suite with the standard collaborators (disk attachments,
/// logging mailer).
pub fn build() -> Result<AxumApp<SuiteParams>> {
    let ax = app::desk_app()?;
    let root = ax
        .app
        .get("attachments.root")
        .unwrap_or_else(|| "./data/attachments".to_string());

    finish(ax, Arc::new(SuiteState::standard(root)))
}

/// Build against caller-supplied collaborators (tests swap the mailer
/// and attachment store here).
pub fn build_with_state(state: Arc<SuiteState>) -> Result<AxumApp<SuiteParams>> {
    finish(app::desk_app()?, state)
}

fn finish(mut ax: AxumApp<SuiteParams>, state: Arc<SuiteState>) -> Result<AxumApp<SuiteParams>> {
    for (route, svc) in services::routes(&state) {
        ax = ax.use_service(route, svc);
    }

    services::register_hooks(ax.app.as_ref(), &state)?;
    hooks::global_hooks(ax.app.as_ref());

    Ok(ax.use_get("/health", || async { "ok" }).with_http_layers())
}
