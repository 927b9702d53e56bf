use std::sync::Arc;

use axum::body::Body;
use axum::http::HeaderValue;
use axum::http::Request;
use desk_axum::axum;
use desk_core::errors::DeskError;
use desk_core::query::Page;
use desk_core::{ActorContext, DeskApp, ListQuery, ResourceService};
use desk_axum::rest::ServiceRoute;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

struct ForbiddenOnCreate;

#[async_trait::async_trait]
impl ResourceService<()> for ForbiddenOnCreate {
    async fn create(&self, _ctx: &ActorContext, _data: Value, _params: ()) -> anyhow::Result<Value> {
        Err(DeskError::forbidden("You are not allowed to create tickets").into_anyhow())
    }
}

struct BoomOnCreate;

#[async_trait::async_trait]
impl ResourceService<()> for BoomOnCreate {
    async fn create(&self, _ctx: &ActorContext, _data: Value, _params: ()) -> anyhow::Result<Value> {
        Err(anyhow::anyhow!("boom"))
    }

    async fn find(&self, _ctx: &ActorContext, _params: ()) -> anyhow::Result<Page<Value>> {
        Ok(Page::empty(&ListQuery::default()))
    }
}

fn route() -> ServiceRoute {
    ServiceRoute::new("tickets", "tickets", "Ticket")
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn malformed_json_returns_bad_request_shape() {
    let app: DeskApp<()> = DeskApp::new();
    let ax = axum(app)
        .use_service(route(), Arc::new(BoomOnCreate))
        .with_http_layers();

    let res = ax
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tickets")
                .header("content-type", "application/json")
                .body(Body::from("{\"subject\":\"x\""))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    assert!(res.headers().get("x-request-id").is_some());
    let body = json_body(res).await;
    assert_eq!(body["name"], "BadRequest");
    assert_eq!(body["code"], 400);
    assert_eq!(body["className"], "bad-request");
    assert!(body.get("errors").is_some());
}

#[tokio::test]
async fn request_id_is_preserved_when_provided() {
    let app: DeskApp<()> = DeskApp::new();
    let ax = axum(app)
        .use_service(route(), Arc::new(BoomOnCreate))
        .with_http_layers();

    let provided = HeaderValue::from_static("req-test-123");
    let res = ax
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/tickets")
                .header("x-request-id", provided.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.headers().get("x-request-id").unwrap(), &provided);
}

#[tokio::test]
async fn forbidden_mutation_recovers_into_error_flash() {
    let app: DeskApp<()> = DeskApp::new();
    let ax = axum(app)
        .use_service(route(), Arc::new(ForbiddenOnCreate))
        .with_http_layers();

    let res = ax
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tickets")
                .header("content-type", "application/json")
                .body(Body::from("{\"subject\":\"x\"}"))
                .unwrap(),
        )
        .await
        .unwrap();

    // the flash convention keeps mutations navigable: 200 + redirect
    assert_eq!(res.status().as_u16(), 200);
    let body = json_body(res).await;
    assert_eq!(body["redirect"], "/tickets");
    assert_eq!(body["flash"]["kind"], "error");
    assert!(body["flash"]["message"]
        .as_str()
        .unwrap()
        .contains("not allowed"));
}

#[tokio::test]
async fn plain_faults_keep_their_status() {
    let app: DeskApp<()> = DeskApp::new();
    let ax = axum(app)
        .use_service(route(), Arc::new(BoomOnCreate))
        .with_http_layers();

    let res = ax
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tickets")
                .header("content-type", "application/json")
                .body(Body::from("{\"subject\":\"x\"}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 500);
    let body = json_body(res).await;
    assert_eq!(body["name"], "GeneralError");
    assert!(body["message"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn index_renders_component_with_data_and_filters() {
    let app: DeskApp<()> = DeskApp::new();
    let ax = axum(app)
        .use_service(route(), Arc::new(BoomOnCreate))
        .with_http_layers();

    let res = ax
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/tickets?search=alice&page=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let body = json_body(res).await;
    assert_eq!(body["component"], "tickets/index");
    assert_eq!(body["props"]["filters"]["search"], "alice");
    assert_eq!(body["props"]["filters"]["page"], 2);
    assert!(body["props"]["data"]["data"].is_array());
}
