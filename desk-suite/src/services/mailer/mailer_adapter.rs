use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::templates;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Unknown email template: {0}")]
    UnknownTemplate(String),

    #[error("Email transport failed: {0}")]
    Transport(String),
}

/// Outbound email dispatch.
///
/// Called fire-and-continue after mutations: a failure is surfaced to
/// the caller but never rolls back the committed record.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, template: &str, to: &str, context: &Value) -> Result<(), MailerError>;
}

/// Renders templates and logs the dispatch instead of talking to a
/// transport. The seam where an SMTP or API-backed mailer plugs in.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, template: &str, to: &str, context: &Value) -> Result<(), MailerError> {
        let tpl = templates::find(template)
            .ok_or_else(|| MailerError::UnknownTemplate(template.to_string()))?;

        let (subject, _body) = templates::render(tpl, context);

        tracing::info!(template, to, subject = %subject, "email dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn log_mailer_accepts_known_templates() {
        let mailer = LogMailer;
        mailer
            .send("ticket-created", "alice@example.com", &json!({"name": "Alice"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_template_errors() {
        let mailer = LogMailer;
        let err = mailer
            .send("password-reset", "alice@example.com", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, MailerError::UnknownTemplate(_)));
    }
}
