//! Structured errors.
//!
//! DeskRS carries one structured error type through the whole service and
//! hook pipeline inside `anyhow::Error`, so hooks and handlers can attach
//! context freely and the transport layer can still recover status code,
//! class name, and field errors at the boundary.

use std::fmt;

use anyhow::Error as AnyError;

/// Convenience result type for core APIs.
pub type DeskResult<T> = std::result::Result<T, AnyError>;

/// Error classes and their HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,     // 400
    Forbidden,      // 403
    NotFound,       // 404
    Unprocessable,  // 422
    GeneralError,   // 500
    NotImplemented, // 501
    BadGateway,     // 502
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Unprocessable => 422,
            ErrorKind::GeneralError => 500,
            ErrorKind::NotImplemented => 501,
            ErrorKind::BadGateway => 502,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Unprocessable => "Unprocessable",
            ErrorKind::GeneralError => "GeneralError",
            ErrorKind::NotImplemented => "NotImplemented",
            ErrorKind::BadGateway => "BadGateway",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Unprocessable => "unprocessable",
            ErrorKind::GeneralError => "general-error",
            ErrorKind::NotImplemented => "not-implemented",
            ErrorKind::BadGateway => "bad-gateway",
        }
    }
}

/// A structured error that can live inside `anyhow::Error`.
#[derive(Debug)]
pub struct DeskError {
    pub kind: ErrorKind,
    pub message: String,
    /// Field-level errors, e.g. `{"email": ["must be a valid email"]}`.
    pub errors: Option<serde_json::Value>,
    pub source: Option<AnyError>,
}

impl DeskError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: None,
            source: None,
        }
    }

    pub fn with_errors(mut self, errors: serde_json::Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error` so it flows through the hook pipeline.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Find a `DeskError` anywhere in an `anyhow` chain.
    pub fn from_anyhow(err: &AnyError) -> Option<&DeskError> {
        err.chain().find_map(|e| e.downcast_ref::<DeskError>())
    }

    /// Turn any error into a `DeskError`, wrapping unknown ones as
    /// `GeneralError`.
    pub fn normalize(err: AnyError) -> DeskError {
        match err.downcast::<DeskError>() {
            Ok(desk) => desk,
            Err(other) => {
                DeskError::new(ErrorKind::GeneralError, other.to_string()).with_source(other)
            }
        }
    }

    /// A client-safe copy: keeps kind/message/errors, drops the inner
    /// source chain.
    pub fn sanitize_for_client(&self) -> DeskError {
        DeskError {
            kind: self.kind,
            message: self.message.clone(),
            errors: self.errors.clone(),
            source: None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut base = json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }

    // ---- Constructors ----

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unprocessable, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, msg)
    }
    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadGateway, msg)
    }
}

impl fmt::Display for DeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for DeskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Bail with a structured error: `bail_desk!(forbidden, "no capability")`.
#[macro_export]
macro_rules! bail_desk {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::DeskError::$ctor($msg).into_anyhow());
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::DeskError::$ctor(format!($fmt, $($arg)*)).into_anyhow());
    };
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn desk_error_survives_anyhow_context() {
        let err = DeskError::forbidden("You are not allowed to update this ticket")
            .into_anyhow()
            .context("update failed");

        let desk = DeskError::from_anyhow(&err).expect("must downcast");
        assert_eq!(desk.kind, ErrorKind::Forbidden);
        assert_eq!(desk.code(), 403);
    }

    #[test]
    fn normalize_wraps_plain_errors_as_general() {
        let desk = DeskError::normalize(anyhow::anyhow!("boom"));
        assert_eq!(desk.kind, ErrorKind::GeneralError);
        assert!(desk.message.contains("boom"));
    }

    #[test]
    fn to_json_includes_field_errors() {
        let desk = DeskError::unprocessable("Ticket validation failed")
            .with_errors(serde_json::json!({"email": ["must be a valid email"]}));
        let json = desk.to_json();
        assert_eq!(json["name"], "Unprocessable");
        assert_eq!(json["code"], 422);
        assert_eq!(json["errors"]["email"][0], "must be a valid email");
    }
}
