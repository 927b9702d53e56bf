//! The server-driven page protocol.
//!
//! Every GET resolves to a component name plus props; every mutation
//! resolves to a redirect carrying a success or error flash. Structured
//! errors on mutations are recovered into error flashes so the client
//! always receives a navigable outcome.

use serde::Serialize;
use serde_json::Value;

use desk_core::errors::{DeskError, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

/// A page-protocol payload.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PageResponse {
    Render {
        component: String,
        props: Value,
    },
    Redirect {
        redirect: String,
        flash: Flash,
        /// Field-level errors carried back to the form on validation
        /// failure.
        #[serde(skip_serializing_if = "Option::is_none")]
        errors: Option<Value>,
    },
}

impl PageResponse {
    pub fn render(component: impl Into<String>, props: Value) -> Self {
        Self::Render {
            component: component.into(),
            props,
        }
    }

    pub fn redirect(to: impl Into<String>, flash: Flash) -> Self {
        Self::Redirect {
            redirect: to.into(),
            flash,
            errors: None,
        }
    }

    /// Recover a structured error into a redirect + error flash.
    ///
    /// Only the user-facing kinds recover; anything else (general
    /// faults, not-implemented) returns `None` and should propagate with
    /// its real status code.
    pub fn recover_error(to: &str, err: &anyhow::Error) -> Option<Self> {
        let desk = DeskError::from_anyhow(err)?;
        let flashable = matches!(
            desk.kind,
            ErrorKind::Forbidden
                | ErrorKind::NotFound
                | ErrorKind::Unprocessable
                | ErrorKind::BadGateway
        );
        if !flashable {
            return None;
        }

        Some(Self::Redirect {
            redirect: to.to_string(),
            flash: Flash::error(desk.message.clone()),
            errors: desk.errors.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn render_serializes_component_and_props() {
        let page = PageResponse::render("tickets/index", json!({"data": []}));
        let v = serde_json::to_value(&page).unwrap();
        assert_eq!(v["component"], "tickets/index");
        assert!(v["props"]["data"].is_array());
    }

    #[test]
    fn redirect_serializes_flash() {
        let page = PageResponse::redirect("/tickets", Flash::success("Ticket created."));
        let v = serde_json::to_value(&page).unwrap();
        assert_eq!(v["redirect"], "/tickets");
        assert_eq!(v["flash"]["kind"], "success");
        assert!(v.get("errors").is_none());
    }

    #[test]
    fn forbidden_recovers_into_error_flash() {
        let err = DeskError::forbidden("You are not allowed to update this ticket").into_anyhow();
        let page = PageResponse::recover_error("/tickets", &err).unwrap();
        let v = serde_json::to_value(&page).unwrap();
        assert_eq!(v["flash"]["kind"], "error");
        assert_eq!(v["redirect"], "/tickets");
    }

    #[test]
    fn validation_errors_ride_along() {
        let err = DeskError::unprocessable("Ticket validation failed")
            .with_errors(json!({"email": ["must be a valid email"]}))
            .into_anyhow();
        let page = PageResponse::recover_error("/tickets", &err).unwrap();
        let v = serde_json::to_value(&page).unwrap();
        assert_eq!(v["errors"]["email"][0], "must be a valid email");
    }

    #[test]
    fn plain_faults_do_not_recover() {
        let err = anyhow::anyhow!("boom");
        assert!(PageResponse::recover_error("/tickets", &err).is_none());

        let err = DeskError::not_implemented("nope").into_anyhow();
        assert!(PageResponse::recover_error("/tickets", &err).is_none());
    }
}
