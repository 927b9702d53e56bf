use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::actor::ActorContext;
use crate::config::DeskConfigSnapshot;
use crate::query::Page;
use crate::service::ServiceMethodKind;

pub type HookFut<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// The outcome of a service call as seen by after hooks.
#[derive(Debug)]
pub enum HookResult {
    One(Value),
    Page(Page<Value>),
}

/// Context passed to hooks.
///
/// `P` is the params type (filters, raw query, etc.).
#[derive(Debug)]
pub struct HookContext<P> {
    pub actor: ActorContext,
    pub service_name: String,
    pub method: ServiceMethodKind,
    pub params: P,
    /// Input payload (for create/update/patch); hooks may rewrite it.
    pub data: Option<Value>,
    /// Output (for after hooks); hooks may rewrite it.
    pub result: Option<HookResult>,
    /// Error (for error hooks); an error hook may clear it to recover.
    pub error: Option<anyhow::Error>,
    pub config: DeskConfigSnapshot,
}

impl<P> HookContext<P> {
    pub fn new(
        actor: ActorContext,
        service_name: impl Into<String>,
        method: ServiceMethodKind,
        params: P,
        config: DeskConfigSnapshot,
    ) -> Self {
        Self {
            actor,
            service_name: service_name.into(),
            method,
            params,
            data: None,
            result: None,
            error: None,
            config,
        }
    }
}

#[async_trait]
pub trait BeforeHook<P>: Send + Sync {
    async fn run(&self, ctx: &mut HookContext<P>) -> Result<()>;
}

#[async_trait]
pub trait AfterHook<P>: Send + Sync {
    async fn run(&self, ctx: &mut HookContext<P>) -> Result<()>;
}

#[async_trait]
pub trait ErrorHook<P>: Send + Sync {
    async fn run(&self, ctx: &mut HookContext<P>) -> Result<()>;
}

/// Hook registration for one scope (global or per-service).
///
/// `*_all` hooks run for every method; method-keyed hooks run for that
/// method only, after the `_all` ones.
pub struct ServiceHooks<P> {
    pub before_all: Vec<Arc<dyn BeforeHook<P>>>,
    pub before_by_method: HashMap<ServiceMethodKind, Vec<Arc<dyn BeforeHook<P>>>>,
    pub after_all: Vec<Arc<dyn AfterHook<P>>>,
    pub after_by_method: HashMap<ServiceMethodKind, Vec<Arc<dyn AfterHook<P>>>>,
    pub error_all: Vec<Arc<dyn ErrorHook<P>>>,
    pub error_by_method: HashMap<ServiceMethodKind, Vec<Arc<dyn ErrorHook<P>>>>,
}

impl<P> Default for ServiceHooks<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ServiceHooks<P> {
    pub fn new() -> Self {
        Self {
            before_all: Vec::new(),
            before_by_method: HashMap::new(),
            after_all: Vec::new(),
            after_by_method: HashMap::new(),
            error_all: Vec::new(),
            error_by_method: HashMap::new(),
        }
    }

    pub fn before_all(&mut self, hook: Arc<dyn BeforeHook<P>>) -> &mut Self {
        self.before_all.push(hook);
        self
    }

    pub fn before(&mut self, method: ServiceMethodKind, hook: Arc<dyn BeforeHook<P>>) -> &mut Self {
        self.before_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn after_all(&mut self, hook: Arc<dyn AfterHook<P>>) -> &mut Self {
        self.after_all.push(hook);
        self
    }

    pub fn after(&mut self, method: ServiceMethodKind, hook: Arc<dyn AfterHook<P>>) -> &mut Self {
        self.after_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn error_all(&mut self, hook: Arc<dyn ErrorHook<P>>) -> &mut Self {
        self.error_all.push(hook);
        self
    }

    pub fn error(&mut self, method: ServiceMethodKind, hook: Arc<dyn ErrorHook<P>>) -> &mut Self {
        self.error_by_method.entry(method).or_default().push(hook);
        self
    }
}

/// `_all` hooks first, then the ones registered for this method.
pub fn collect_method_hooks<H: ?Sized>(
    all: &[Arc<H>],
    by_method: &HashMap<ServiceMethodKind, Vec<Arc<H>>>,
    method: &ServiceMethodKind,
) -> Vec<Arc<H>> {
    let mut out: Vec<Arc<H>> = all.to_vec();
    if let Some(hooks) = by_method.get(method) {
        out.extend(hooks.iter().cloned());
    }
    out
}
