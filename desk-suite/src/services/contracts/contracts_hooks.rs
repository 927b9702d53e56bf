use anyhow::Result;
use async_trait::async_trait;
use desk_core::hooks::{BeforeHook, HookContext};
use serde::Deserialize;
use validator::Validate;

use crate::services::SuiteParams;

#[derive(Debug, Deserialize, Validate)]
pub struct ContractInput {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,

    #[validate(length(min = 1, message = "client_name must not be empty"))]
    pub client_name: String,

    #[validate(range(min = 0.0, message = "value must not be negative"))]
    pub value: Option<f64>,

    pub status: Option<String>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
}

pub struct ValidateContractInput;

#[async_trait]
impl BeforeHook<SuiteParams> for ValidateContractInput {
    async fn run(&self, ctx: &mut HookContext<SuiteParams>) -> Result<()> {
        let Some(data) = ctx.data.as_ref() else {
            return Ok(());
        };

        desk_schema::validate::<ContractInput>(data, "Contract validation failed")?;
        Ok(())
    }
}
