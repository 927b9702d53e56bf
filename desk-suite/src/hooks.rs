use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use desk_core::hooks::{AfterHook, BeforeHook, ErrorHook, HookContext};
use desk_core::DeskApp;

use crate::services::SuiteParams;

pub struct LogCall;

#[async_trait]
impl BeforeHook<SuiteParams> for LogCall {
    async fn run(&self, ctx: &mut HookContext<SuiteParams>) -> Result<()> {
        tracing::debug!(
            service = %ctx.service_name,
            method = ctx.method.name(),
            actor = %ctx.actor.actor_id.0,
            tenant = %ctx.actor.tenant_id.0,
            "service call"
        );
        Ok(())
    }
}

pub struct LogOutcome;

#[async_trait]
impl AfterHook<SuiteParams> for LogOutcome {
    async fn run(&self, ctx: &mut HookContext<SuiteParams>) -> Result<()> {
        tracing::debug!(
            service = %ctx.service_name,
            method = ctx.method.name(),
            "service call ok"
        );
        Ok(())
    }
}

pub struct LogFailure;

#[async_trait]
impl ErrorHook<SuiteParams> for LogFailure {
    async fn run(&self, ctx: &mut HookContext<SuiteParams>) -> Result<()> {
        if let Some(err) = &ctx.error {
            tracing::warn!(
                service = %ctx.service_name,
                method = ctx.method.name(),
                error = %err,
                "service call failed"
            );
        }
        Ok(())
    }
}

pub fn global_hooks(app: &DeskApp<SuiteParams>) {
    app.hooks(|h| {
        h.before_all(Arc::new(LogCall));
        h.after_all(Arc::new(LogOutcome));
        h.error_all(Arc::new(LogFailure));
    });
}
