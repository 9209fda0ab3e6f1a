//! Pandamonium persistence API
//!
//! Serves the record CRUD protocol for proofs and definitions over HTTP.
//! Routes are declared explicitly in [`create_router`]; the protocol itself
//! lives in [`controller`] and knows nothing about Axum.

pub mod controller;
pub mod handlers;
pub mod middleware;

use axum::{
    extract::FromRef,
    routing::get,
    Router,
};
use pandamonium_common::{db::Stores, Definition, Proof};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use controller::RecordController;

/// Application state shared across handlers
#[derive(Clone, FromRef)]
pub struct AppState {
    pub proofs: RecordController<Proof>,
    pub definitions: RecordController<Definition>,
}

impl AppState {
    pub fn new(stores: Stores) -> Self {
        Self {
            proofs: RecordController::new(stores.proofs),
            definitions: RecordController::new(stores.definitions),
        }
    }
}

/// Build the route table
pub fn create_router(state: AppState) -> Router {
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    Router::new()
        // Health checks
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Proofs
        .route(
            "/proofs",
            get(handlers::records::list::<Proof>).post(handlers::records::create::<Proof>),
        )
        .route(
            "/proofs/",
            get(handlers::records::list::<Proof>).post(handlers::records::create::<Proof>),
        )
        .route("/proofs/id", get(handlers::records::get_by_query::<Proof>))
        .route("/proofs/branch", get(handlers::proofs::find_by_branch))
        .route("/proofs/theorem_name", get(handlers::proofs::find_by_theorem_name))
        .route(
            "/proofs/{id}",
            get(handlers::records::get_by_path::<Proof>)
                .patch(handlers::records::update::<Proof>)
                .delete(handlers::records::delete::<Proof>),
        )
        // Definitions
        .route(
            "/definitions",
            get(handlers::records::list::<Definition>)
                .post(handlers::records::create::<Definition>),
        )
        .route(
            "/definitions/",
            get(handlers::records::list::<Definition>)
                .post(handlers::records::create::<Definition>),
        )
        .route("/definitions/id", get(handlers::records::get_by_query::<Definition>))
        .route(
            "/definitions/{id}",
            get(handlers::records::get_by_path::<Definition>)
                .patch(handlers::records::update::<Definition>)
                .delete(handlers::records::delete::<Definition>),
        )
        .route_layer(axum::middleware::from_fn(middleware::metrics::track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_id)
        // Outermost, so the id is set before propagation reads it
        .layer(request_id)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use pandamonium_common::MemoryStore;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState::new(Stores::in_memory()))
    }

    fn app_with_definitions(records: Vec<Definition>) -> Router {
        create_router(AppState::new(Stores {
            proofs: Arc::new(MemoryStore::<Proof>::new()),
            definitions: Arc::new(MemoryStore::with_records(records)),
        }))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn pythagorean() -> Value {
        json!({"name": "Pythagorean theorem", "definition": ["a^2+b^2=c^2"]})
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_with_memory_stores() {
        let (status, body) = send(&app(), Method::GET, "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["checks"]["proofs"]["status"], "up");
    }

    #[tokio::test]
    async fn test_create_definition() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/definitions", Some(pythagorean())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["id"].as_i64().unwrap() > 0);
        assert_eq!(body["version"], 0);
        assert_eq!(body["name"], "Pythagorean theorem");
        assert!(body.get("notation").is_none());
    }

    #[tokio::test]
    async fn test_trailing_slash_routes() {
        let app = app();
        let (status, _) = send(&app, Method::POST, "/definitions/", Some(pythagorean())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, Method::GET, "/definitions/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_validation_failure() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/definitions",
            Some(json!({"name": "   ", "definition": []})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
        assert!(body["error"]["details"]["name"].is_array());
        assert!(body["error"]["details"]["definition"].is_array());
    }

    #[tokio::test]
    async fn test_create_null_body() {
        let (status, body) = send(&app(), Method::POST, "/proofs", Some(Value::Null)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_get_by_id_query_and_path() {
        let app = app();
        let (_, created) = send(&app, Method::POST, "/definitions", Some(pythagorean())).await;
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(&app, Method::GET, &format!("/definitions/id?id={}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, created);

        let (status, body) = send(&app, Method::GET, &format!("/definitions/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, created);
    }

    #[tokio::test]
    async fn test_get_by_id_missing_and_null() {
        let app = app();
        let (status, _) = send(&app, Method::GET, "/proofs/id?id=7", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::GET, "/proofs/id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_update_merges_partial_record() {
        let app = app_with_definitions(vec![Definition {
            id: 5,
            version: 2,
            name: "Original name".into(),
            definition: vec!["original statement".into()],
            notation: Some(vec!["o".into()]),
        }]);

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/definitions/5",
            Some(json!({"name": "Updated name"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 5);
        assert_eq!(body["version"], 3);
        assert_eq!(body["name"], "Updated name");
        assert_eq!(body["definition"], json!(["original statement"]));
        assert_eq!(body["notation"], json!(["o"]));
    }

    #[tokio::test]
    async fn test_update_missing_record_and_bad_payloads() {
        let app = app();

        let (status, _) = send(&app, Method::PATCH, "/proofs/3", Some(json!({"branch": "algebra"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::PATCH, "/proofs/3", Some(Value::Null)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/proofs/3",
            Some(json!({"branch": "b".repeat(513)})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let app = app();

        let (status, _) = send(&app, Method::GET, "/definitions/id?id=99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::DELETE, "/definitions/99", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, Method::GET, "/definitions/id?id=99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let app = app();
        let (_, created) = send(&app, Method::POST, "/definitions", Some(pythagorean())).await;
        let uri = format!("/definitions/{}", created["id"]);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_proof_filters() {
        let app = app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/proofs",
            Some(json!({
                "theoremName": "Cantor's theorem",
                "branch": "set theory",
                "proof": ["diagonal argument"],
                "referencedDefinitions": ["power set"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        for uri in [
            "/proofs/branch?branch=set_theory",
            "/proofs/branch?branch=set-theory",
            "/proofs/branch?branch=set%20theory",
            "/proofs/theorem_name?theorem_name=Cantor's_theorem",
        ] {
            let (status, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(body[0]["referencedDefinitions"], json!(["power set"]));
        }

        let (status, _) = send(&app, Method::GET, "/proofs/branch", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // Empty full list is 200 while an empty filtered list is 404
    #[tokio::test]
    async fn test_empty_list_and_empty_filter_differ() {
        let app = app();

        let (status, body) = send(&app, Method::GET, "/proofs", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, _) = send(&app, Method::GET, "/proofs/branch?branch=topology", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_path_id() {
        let (status, body) = send(&app(), Method::DELETE, "/proofs/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_caller_request_id_is_echoed() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/proofs")
                    .header("x-request-id", "trace-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "trace-42");
    }

    struct UnreachableStore;

    #[async_trait::async_trait]
    impl pandamonium_common::RecordStore<Proof> for UnreachableStore {
        async fn get(&self, _id: i32) -> pandamonium_common::Result<Option<Proof>> {
            Err(unreachable_error())
        }

        async fn list(&self) -> pandamonium_common::Result<Vec<Proof>> {
            Err(unreachable_error())
        }

        async fn find_by(&self, _filter: &pandamonium_common::ProofFilter) -> pandamonium_common::Result<Vec<Proof>> {
            Err(unreachable_error())
        }

        async fn save(&self, _record: Proof) -> pandamonium_common::Result<Proof> {
            Err(unreachable_error())
        }

        async fn delete(&self, _id: i32) -> pandamonium_common::Result<()> {
            Err(unreachable_error())
        }

        async fn ping(&self) -> pandamonium_common::Result<()> {
            Err(unreachable_error())
        }
    }

    fn unreachable_error() -> pandamonium_common::AppError {
        pandamonium_common::AppError::DatabaseConnection {
            message: "connection refused".into(),
        }
    }

    fn app_with_broken_proofs() -> Router {
        create_router(AppState::new(Stores {
            proofs: Arc::new(UnreachableStore),
            definitions: Arc::new(MemoryStore::<Definition>::new()),
        }))
    }

    #[tokio::test]
    async fn test_store_failure_is_server_error() {
        let (status, body) = send(&app_with_broken_proofs(), Method::GET, "/proofs", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "CONNECTION_ERROR");
    }

    #[tokio::test]
    async fn test_ready_reports_down_store() {
        let (status, body) = send(&app_with_broken_proofs(), Method::GET, "/ready", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not_ready");
        assert_eq!(body["checks"]["proofs"]["status"], "down");
        assert_eq!(body["checks"]["definitions"]["status"], "up");
    }
}
