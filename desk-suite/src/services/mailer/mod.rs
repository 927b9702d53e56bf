pub mod mailer_adapter;
pub mod templates;

pub use mailer_adapter::{LogMailer, Mailer, MailerError};
