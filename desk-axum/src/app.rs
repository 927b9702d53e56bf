use std::sync::Arc;

use axum::handler::Handler;
use axum::routing::get;
use axum::Router;
use desk_core::{DeskApp, ResourceService};
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::params::FromRestParams;
use crate::rest::{self, ServiceRoute};
use crate::DeskAxumState;

pub struct AxumApp<P = ()>
where
    P: Send + Sync + Clone + 'static,
{
    pub app: Arc<DeskApp<P>>,
    pub router: Router<()>,
}

impl<P> Clone for AxumApp<P>
where
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            router: self.router.clone(),
        }
    }
}

impl<P> AxumApp<P>
where
    P: Send + Sync + Clone + 'static,
{
    pub fn new(app: DeskApp<P>) -> Self {
        let app = Arc::new(app);
        let state = DeskAxumState {
            app: Arc::clone(&app),
        };
        Self {
            app,
            router: Router::new().with_state(state),
        }
    }

    pub fn use_router(mut self, path: &str, router: Router<()>) -> Self {
        self.router = self.router.nest(path, router);
        self
    }

    pub fn use_get<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        let router = Router::new().route("/", get(handler));
        self.use_router(path, router)
    }

    /// Register a service and mount its page-protocol routes at
    /// `/<route.name>`.
    pub fn use_service(mut self, route: ServiceRoute, service: Arc<dyn ResourceService<P>>) -> Self
    where
        P: FromRestParams,
    {
        self.app.register_service(route.name, service);

        let router = rest::service_router(route, Arc::clone(&self.app));
        self.router = self.router.nest(&format!("/{}", route.name), router);
        self
    }

    /// Request-id + trace layers. Call once, after all routes are
    /// mounted, so the layers wrap everything.
    pub fn with_http_layers(mut self) -> Self {
        self.router = self.router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        );
        self
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

pub fn axum<P>(app: DeskApp<P>) -> AxumApp<P>
where
    P: Send + Sync + Clone + 'static,
{
    AxumApp::new(app)
}
