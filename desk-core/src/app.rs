use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::Result;
use serde_json::Value;

use crate::hooks::{collect_method_hooks, HookContext, HookFut, HookResult, ServiceHooks};
use crate::query::Page;
use crate::{
    ActorContext, DeskConfig, DeskConfigSnapshot, DeskError, ResourceService, ServiceMethodKind,
    ServiceRegistry,
};

struct DeskAppInner<P>
where
    P: Send + Clone + 'static,
{
    registry: RwLock<ServiceRegistry<P>>,
    global_hooks: RwLock<ServiceHooks<P>>,
    service_hooks: RwLock<HashMap<String, ServiceHooks<P>>>,
    config: RwLock<DeskConfig>,
}

/// Central application container.
///
/// Framework-agnostic. Holds:
/// - service registry
/// - app hooks
/// - per-service hooks
/// - config
pub struct DeskApp<P = ()>
where
    P: Send + Clone + 'static,
{
    inner: Arc<DeskAppInner<P>>,
}

type HooksForMethod<P> = (
    Vec<Arc<dyn crate::BeforeHook<P>>>,
    Vec<Arc<dyn crate::AfterHook<P>>>,
    Vec<Arc<dyn crate::ErrorHook<P>>>,
);

type ServiceCall<P> = Arc<
    dyn for<'a> Fn(Arc<dyn ResourceService<P>>, &'a mut HookContext<P>) -> HookFut<'a>
        + Send
        + Sync,
>;

impl<P> Default for DeskApp<P>
where
    P: Send + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for DeskApp<P>
where
    P: Send + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> DeskApp<P>
where
    P: Send + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DeskAppInner {
                registry: RwLock::new(ServiceRegistry::new()),
                global_hooks: RwLock::new(ServiceHooks::new()),
                service_hooks: RwLock::new(HashMap::new()),
                config: RwLock::new(DeskConfig::new()),
            }),
        }
    }

    pub fn register_service<S>(&self, name: S, service: Arc<dyn ResourceService<P>>)
    where
        S: Into<String>,
    {
        self.inner
            .registry
            .write()
            .unwrap()
            .register(name, service);
    }

    /// Register hooks that run for every service.
    pub fn hooks<F>(&self, f: F)
    where
        F: FnOnce(&mut ServiceHooks<P>),
    {
        let mut g = self.inner.global_hooks.write().unwrap();
        f(&mut g);
    }

    pub(crate) fn configure_service_hooks<F>(&self, service_name: &str, f: F)
    where
        F: FnOnce(&mut ServiceHooks<P>),
    {
        let mut map = self.inner.service_hooks.write().unwrap();
        let hooks = map.entry(service_name.to_string()).or_default();
        f(hooks);
    }

    /// Resolve a registered service by name.
    pub fn service(&self, name: &str) -> Result<ServiceHandle<P>> {
        let svc = self
            .inner
            .registry
            .read()
            .unwrap()
            .get(name)
            .ok_or_else(|| DeskError::not_found(format!("Service not found: {name}")).into_anyhow())?
            .clone();

        Ok(ServiceHandle {
            app: self.clone(),
            name: name.to_string(),
            service: svc,
        })
    }

    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.config.write().unwrap().set(key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let cfg = self.inner.config.read().unwrap();
        cfg.get(key).map(|v| v.to_string())
    }

    /// Overlay `DESK__`-style environment variables onto the config.
    pub fn load_env(&self, prefix: &str) {
        self.inner.config.write().unwrap().load_env(prefix);
    }

    pub fn config_snapshot(&self) -> DeskConfigSnapshot {
        let cfg = self.inner.config.read().unwrap();
        cfg.snapshot()
    }
}

/// A named service resolved from the app, with its hook pipeline.
pub struct ServiceHandle<P>
where
    P: Send + Clone + 'static,
{
    app: DeskApp<P>,
    name: String,
    service: Arc<dyn ResourceService<P>>,
}

impl<P> std::fmt::Debug for ServiceHandle<P>
where
    P: Send + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("name", &self.name)
            .finish()
    }
}

impl<P> ServiceHandle<P>
where
    P: Send + Clone + 'static,
{
    /// Register hooks scoped to this service.
    pub fn hooks<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut ServiceHooks<P>),
    {
        self.app.configure_service_hooks(&self.name, f);
        self
    }

    pub fn inner(&self) -> &Arc<dyn ResourceService<P>> {
        &self.service
    }

    /// Global hooks first, then service hooks.
    fn collect_hooks_for_method(&self, method: &ServiceMethodKind) -> HooksForMethod<P> {
        let g = self.app.inner.global_hooks.read().unwrap();
        let map = self.app.inner.service_hooks.read().unwrap();
        let s = map.get(&self.name);

        let mut before = collect_method_hooks(&g.before_all, &g.before_by_method, method);
        let mut after = collect_method_hooks(&g.after_all, &g.after_by_method, method);
        let mut error = collect_method_hooks(&g.error_all, &g.error_by_method, method);

        if let Some(h) = s {
            before.extend(collect_method_hooks(&h.before_all, &h.before_by_method, method));
            after.extend(collect_method_hooks(&h.after_all, &h.after_by_method, method));
            error.extend(collect_method_hooks(&h.error_all, &h.error_by_method, method));
        }

        (before, after, error)
    }

    /// Pipeline: before → service call → after; error hooks on failure.
    ///
    /// An error hook may clear `ctx.error` to recover the call.
    async fn run_pipeline(
        &self,
        method: ServiceMethodKind,
        mut ctx: HookContext<P>,
        service_call: ServiceCall<P>,
    ) -> Result<HookContext<P>> {
        let (before, after, error) = self.collect_hooks_for_method(&method);
        let svc = self.service.clone();

        let res: Result<()> = async {
            for h in &before {
                h.run(&mut ctx).await?;
            }

            // sets ctx.result
            (service_call)(svc, &mut ctx).await?;

            for h in after.iter().rev() {
                h.run(&mut ctx).await?;
            }

            Ok(())
        }
        .await;

        if let Err(e) = res {
            ctx.error = Some(e);

            for h in &error {
                let _ = h.run(&mut ctx).await;
            }

            if let Some(err) = ctx.error.take() {
                return Err(err);
            }
        }

        Ok(ctx)
    }

    fn context(&self, actor: ActorContext, method: ServiceMethodKind, params: P) -> HookContext<P> {
        HookContext::new(
            actor,
            self.name.clone(),
            method,
            params,
            self.app.config_snapshot(),
        )
    }

    pub async fn find(&self, actor: ActorContext, params: P) -> Result<Page<Value>> {
        let method = ServiceMethodKind::Find;
        let ctx = self.context(actor, method.clone(), params);

        let ctx = self
            .run_pipeline(
                method,
                ctx,
                Arc::new(|svc, ctx| {
                    Box::pin(async move {
                        let page = svc.find(&ctx.actor, ctx.params.clone()).await?;
                        ctx.result = Some(HookResult::Page(page));
                        Ok(())
                    })
                }),
            )
            .await?;

        match ctx.result {
            Some(HookResult::Page(page)) => Ok(page),
            Some(HookResult::One(_)) => {
                Err(anyhow::anyhow!("find() produced HookResult::One unexpectedly"))
            }
            None => Ok(Page::empty(&crate::ListQuery::default())),
        }
    }

    pub async fn get(&self, actor: ActorContext, id: &str, params: P) -> Result<Value> {
        let method = ServiceMethodKind::Get;
        let ctx = self.context(actor, method.clone(), params);
        let id = id.to_string();

        let ctx = self
            .run_pipeline(
                method,
                ctx,
                Arc::new(move |svc, ctx| {
                    let id = id.clone();
                    Box::pin(async move {
                        let record = svc.get(&ctx.actor, &id, ctx.params.clone()).await?;
                        ctx.result = Some(HookResult::One(record));
                        Ok(())
                    })
                }),
            )
            .await?;

        expect_one(ctx, "get")
    }

    pub async fn create(&self, actor: ActorContext, data: Value, params: P) -> Result<Value> {
        let method = ServiceMethodKind::Create;
        let mut ctx = self.context(actor, method.clone(), params);
        ctx.data = Some(data);

        let ctx = self
            .run_pipeline(
                method,
                ctx,
                Arc::new(|svc, ctx| {
                    Box::pin(async move {
                        let data = ctx
                            .data
                            .take()
                            .ok_or_else(|| anyhow::anyhow!("create() requires ctx.data"))?;

                        let created = svc.create(&ctx.actor, data, ctx.params.clone()).await?;
                        ctx.result = Some(HookResult::One(created));
                        Ok(())
                    })
                }),
            )
            .await?;

        expect_one(ctx, "create")
    }

    pub async fn update(&self, actor: ActorContext, id: &str, data: Value, params: P) -> Result<Value> {
        let method = ServiceMethodKind::Update;
        let mut ctx = self.context(actor, method.clone(), params);
        ctx.data = Some(data);
        let id = id.to_string();

        let ctx = self
            .run_pipeline(
                method,
                ctx,
                Arc::new(move |svc, ctx| {
                    let id = id.clone();
                    Box::pin(async move {
                        let data = ctx
                            .data
                            .take()
                            .ok_or_else(|| anyhow::anyhow!("update() requires ctx.data"))?;

                        let updated = svc.update(&ctx.actor, &id, data, ctx.params.clone()).await?;
                        ctx.result = Some(HookResult::One(updated));
                        Ok(())
                    })
                }),
            )
            .await?;

        expect_one(ctx, "update")
    }

    pub async fn patch(
        &self,
        actor: ActorContext,
        id: Option<&str>,
        data: Value,
        params: P,
    ) -> Result<Value> {
        let method = ServiceMethodKind::Patch;
        let mut ctx = self.context(actor, method.clone(), params);
        ctx.data = Some(data);
        let id: Option<String> = id.map(|s| s.to_string());

        let ctx = self
            .run_pipeline(
                method,
                ctx,
                Arc::new(move |svc, ctx| {
                    let id = id.clone();
                    Box::pin(async move {
                        let data = ctx
                            .data
                            .take()
                            .ok_or_else(|| anyhow::anyhow!("patch() requires ctx.data"))?;

                        let patched = svc
                            .patch(&ctx.actor, id.as_deref(), data, ctx.params.clone())
                            .await?;
                        ctx.result = Some(HookResult::One(patched));
                        Ok(())
                    })
                }),
            )
            .await?;

        expect_one(ctx, "patch")
    }

    pub async fn remove(&self, actor: ActorContext, id: Option<&str>, params: P) -> Result<Value> {
        let method = ServiceMethodKind::Remove;
        let ctx = self.context(actor, method.clone(), params);
        let id: Option<String> = id.map(|s| s.to_string());

        let ctx = self
            .run_pipeline(
                method,
                ctx,
                Arc::new(move |svc, ctx| {
                    let id = id.clone();
                    Box::pin(async move {
                        let removed = svc
                            .remove(&ctx.actor, id.as_deref(), ctx.params.clone())
                            .await?;
                        ctx.result = Some(HookResult::One(removed));
                        Ok(())
                    })
                }),
            )
            .await?;

        expect_one(ctx, "remove")
    }
}

fn expect_one<P>(ctx: HookContext<P>, method: &str) -> Result<Value> {
    match ctx.result {
        Some(HookResult::One(v)) => Ok(v),
        Some(HookResult::Page(_)) => Err(anyhow::anyhow!(
            "{method}() produced HookResult::Page unexpectedly"
        )),
        None => Err(anyhow::anyhow!("{method}() produced no result")),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::capability::CapabilitySet;
    use crate::hooks::BeforeHook;

    struct Echo;

    #[async_trait]
    impl ResourceService<()> for Echo {
        async fn create(&self, _ctx: &ActorContext, data: Value, _params: ()) -> Result<Value> {
            Ok(data)
        }
    }

    struct StampTag;

    #[async_trait]
    impl BeforeHook<()> for StampTag {
        async fn run(&self, ctx: &mut HookContext<()>) -> Result<()> {
            if let Some(Value::Object(map)) = ctx.data.as_mut() {
                map.insert("tag".to_string(), json!("hooked"));
            }
            Ok(())
        }
    }

    fn actor() -> ActorContext {
        ActorContext::new("user-1", "tenant-1", CapabilitySet::new())
    }

    #[tokio::test]
    async fn before_hooks_rewrite_create_data() {
        let app: DeskApp<()> = DeskApp::new();
        app.register_service("echo", Arc::new(Echo));
        app.service("echo")
            .unwrap()
            .hooks(|h| {
                h.before(ServiceMethodKind::Create, Arc::new(StampTag));
            });

        let created = app
            .service("echo")
            .unwrap()
            .create(actor(), json!({"a": 1}), ())
            .await
            .unwrap();

        assert_eq!(created["tag"], "hooked");
    }

    #[tokio::test]
    async fn unknown_service_is_not_found() {
        let app: DeskApp<()> = DeskApp::new();
        let err = app.service("missing").unwrap_err();
        let desk = DeskError::from_anyhow(&err).unwrap();
        assert_eq!(desk.code(), 404);
    }
}
