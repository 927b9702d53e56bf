use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{OriginalUri, Path, Query, State},
    http::HeaderMap,
    routing, Json, Router,
};
use desk_core::errors::DeskError;
use desk_core::query::ListQuery;
use desk_core::DeskApp;
use serde_json::json;

use crate::{
    page::{Flash, PageResponse},
    params::{actor_from_headers, FromRestParams, RestParams},
    DeskAxumError, DeskAxumState,
};

/// How one service mounts into the page protocol.
#[derive(Debug, Clone, Copy)]
pub struct ServiceRoute {
    /// Registered service name; also the redirect base (`/<name>`).
    pub name: &'static str,
    /// Component namespace for renders (`<component>/index`, `/show`).
    pub component: &'static str,
    /// Human label for flash messages.
    pub label: &'static str,
}

impl ServiceRoute {
    pub fn new(name: &'static str, component: &'static str, label: &'static str) -> Self {
        Self {
            name,
            component,
            label,
        }
    }

    fn redirect_to(&self) -> String {
        format!("/{}", self.name)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> DeskAxumError {
    DeskError::bad_request("Failed to parse the request body as JSON")
        .with_errors(json!({"_schema": [rejection.to_string()]}))
        .into_anyhow()
        .into()
}

/// Convert a mutation outcome into the page protocol: success flash on
/// Ok, error flash for user-facing failures, real status otherwise.
fn mutation_response(
    route: &ServiceRoute,
    verb: &str,
    res: anyhow::Result<serde_json::Value>,
) -> Result<Json<PageResponse>, DeskAxumError> {
    let location = route.redirect_to();
    match res {
        Ok(_) => Ok(Json(PageResponse::redirect(
            location,
            Flash::success(format!("{} {verb}.", route.label)),
        ))),
        Err(e) => match PageResponse::recover_error(&location, &e) {
            Some(page) => Ok(Json(page)),
            None => Err(e.into()),
        },
    }
}

pub fn service_router<P>(route: ServiceRoute, app: Arc<DeskApp<P>>) -> Router<()>
where
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let state = DeskAxumState { app };

    Router::new()
        .route(
            "/",
            routing::get({
                move |State(state): State<DeskAxumState<P>>,
                      headers: HeaderMap,
                      Query(query): Query<HashMap<String, String>>,
                      OriginalUri(uri): OriginalUri| async move {
                    let actor = actor_from_headers(&headers);
                    let filters = ListQuery::from_map(&query);

                    let params = RestParams::from_parts("rest", &headers, query, "GET", &uri);
                    let params = P::from_rest_params(params);

                    let svc = state.app.service(route.name)?;
                    let page = svc.find(actor, params).await?;

                    let res = PageResponse::render(
                        format!("{}/index", route.component),
                        json!({"data": page, "filters": filters}),
                    );
                    Ok::<_, DeskAxumError>(Json(res))
                }
            })
            .post({
                move |State(state): State<DeskAxumState<P>>,
                      headers: HeaderMap,
                      Query(query): Query<HashMap<String, String>>,
                      OriginalUri(uri): OriginalUri,
                      data: Result<Json<serde_json::Value>, JsonRejection>| async move {
                    let actor = actor_from_headers(&headers);
                    let Json(data) = data.map_err(map_json_rejection)?;

                    let params = RestParams::from_parts("rest", &headers, query, "POST", &uri);
                    let params = P::from_rest_params(params);

                    let svc = state.app.service(route.name)?;
                    let res = svc.create(actor, data, params).await;
                    mutation_response(&route, "created", res)
                }
            }),
        )
        .route(
            "/{id}",
            routing::get({
                move |State(state): State<DeskAxumState<P>>,
                      headers: HeaderMap,
                      Query(query): Query<HashMap<String, String>>,
                      OriginalUri(uri): OriginalUri,
                      Path(id): Path<String>| async move {
                    let actor = actor_from_headers(&headers);

                    let params = RestParams::from_parts("rest", &headers, query, "GET", &uri);
                    let params = P::from_rest_params(params);

                    let svc = state.app.service(route.name)?;
                    let record = svc.get(actor, &id, params).await?;

                    let res = PageResponse::render(
                        format!("{}/show", route.component),
                        json!({"record": record}),
                    );
                    Ok::<_, DeskAxumError>(Json(res))
                }
            })
            .put({
                move |State(state): State<DeskAxumState<P>>,
                      headers: HeaderMap,
                      Query(query): Query<HashMap<String, String>>,
                      OriginalUri(uri): OriginalUri,
                      Path(id): Path<String>,
                      data: Result<Json<serde_json::Value>, JsonRejection>| async move {
                    let actor = actor_from_headers(&headers);
                    let Json(data) = data.map_err(map_json_rejection)?;

                    let params = RestParams::from_parts("rest", &headers, query, "PUT", &uri);
                    let params = P::from_rest_params(params);

                    let svc = state.app.service(route.name)?;
                    let res = svc.update(actor, &id, data, params).await;
                    mutation_response(&route, "updated", res)
                }
            })
            .patch({
                move |State(state): State<DeskAxumState<P>>,
                      headers: HeaderMap,
                      Query(query): Query<HashMap<String, String>>,
                      OriginalUri(uri): OriginalUri,
                      Path(id): Path<String>,
                      data: Result<Json<serde_json::Value>, JsonRejection>| async move {
                    let actor = actor_from_headers(&headers);
                    let Json(data) = data.map_err(map_json_rejection)?;

                    let params = RestParams::from_parts("rest", &headers, query, "PATCH", &uri);
                    let params = P::from_rest_params(params);

                    let svc = state.app.service(route.name)?;
                    let res = svc.patch(actor, Some(&id), data, params).await;
                    mutation_response(&route, "updated", res)
                }
            })
            .delete({
                move |State(state): State<DeskAxumState<P>>,
                      headers: HeaderMap,
                      Query(query): Query<HashMap<String, String>>,
                      OriginalUri(uri): OriginalUri,
                      Path(id): Path<String>| async move {
                    let actor = actor_from_headers(&headers);

                    let params = RestParams::from_parts("rest", &headers, query, "DELETE", &uri);
                    let params = P::from_rest_params(params);

                    let svc = state.app.service(route.name)?;
                    let res = svc.remove(actor, Some(&id), params).await;
                    mutation_response(&route, "deleted", res)
                }
            }),
        )
        .with_state(state)
}
