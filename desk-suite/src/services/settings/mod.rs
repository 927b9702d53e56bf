pub mod settings_service;

pub use settings_service::{SettingsService, DESCRIPTOR};
