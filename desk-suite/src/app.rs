use anyhow::Result;
use desk_axum::{axum, AxumApp};
use desk_core::DeskApp;

use crate::services::SuiteParams;

/// The configured-but-unwired app: defaults first, environment
/// overrides (`DESK__HTTP__PORT` → `http.port`) on top.
pub fn desk_app() -> Result<AxumApp<SuiteParams>> {
    let app: DeskApp<SuiteParams> = DeskApp::new();
    app.set("http.host", "127.0.0.1");
    app.set("http.port", "3040");
    app.set("paginate.default", "10");
    app.set("paginate.max", "100");
    app.set("attachments.root", "./data/attachments");
    app.load_env("DESK__");

    Ok(axum(app))
}
