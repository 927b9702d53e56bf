use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use desk_core::errors::DeskError;

#[derive(Debug)]
pub struct DeskAxumError(pub anyhow::Error);

impl From<anyhow::Error> for DeskAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for DeskAxumError {
    fn into_response(self) -> Response {
        // Preserve structured fields when a DeskError is anywhere in the
        // chain, even if wrapped by anyhow contexts.
        if let Some(desk) = DeskError::from_anyhow(&self.0) {
            let safe = desk.sanitize_for_client();
            let status =
                StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (status, Json(safe.to_json())).into_response();
        }

        // Fallback: wrap anything else as a GeneralError
        let desk = DeskError::general_error(self.0.to_string());
        let safe = desk.sanitize_for_client();
        let status =
            StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(safe.to_json())).into_response()
    }
}
