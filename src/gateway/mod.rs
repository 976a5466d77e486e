//! HTTP Gateway
//!
//! axum router over [`TransferService`](crate::transfer::TransferService).
//!
//! ```text
//! GET    /transfers                 list
//! POST   /transfers                 create (object or array)
//! POST   /transfers/batch           create (alias)
//! GET    /transfers/{id}            get
//! DELETE /transfers/{id}            delete pending
//! GET    /transfers/{id}/events     audit events
//! POST   /transfers/{id}/failed     acknowledged no-op
//! POST   /transfers/{id}/files      placeholder
//! GET    /health
//! ```

pub mod context;
pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::transfer::IdempotencyStore;
use state::AppState;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let transfer_routes = Router::new()
        .route(
            "/",
            get(handlers::list_transfers).post(handlers::create_transfers),
        )
        .route("/batch", post(handlers::create_transfers_batch))
        .route(
            "/{id}",
            get(handlers::get_transfer).delete(handlers::delete_transfer),
        )
        .route("/{id}/events", get(handlers::get_transfer_events))
        .route("/{id}/failed", post(handlers::transfer_failed))
        .route("/{id}/files", post(handlers::transfer_files));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/transfers", transfer_routes)
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Periodically drop expired idempotency keys
pub fn spawn_idempotency_sweeper(store: Arc<IdempotencyStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let purged = store.purge_expired(Instant::now());
            if purged > 0 {
                debug!(purged, remaining = store.len(), "Idempotency keys purged");
            }
        }
    })
}

/// Start HTTP Gateway server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) {
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("❌ FATAL: Failed to bind to {}: {}", addr, e);
            eprintln!(
                "   Hint: Port {} may already be in use. Check with: lsof -i :{}",
                port, port
            );
            std::process::exit(1);
        }
    };

    info!("Gateway listening on http://{}", addr);
    println!("🚀 Gateway listening on http://{}", addr);
    println!("📖 API Docs: http://{}/docs", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("❌ FATAL: Server error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::transfer::testing::{Harness, sample_body};

    fn app(h: &Harness) -> Router {
        router(Arc::new(AppState::new(h.service.clone(), None)))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn post_transfers(user: &str, key: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/transfers")
            .header("content-type", "application/json")
            .header("x-user-id", user)
            .header("x-request-id", "req-1");
        if let Some(key) = key {
            builder = builder.header("x-idempotency-key", key);
        }
        builder
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let h = Harness::new("u1");
        let (status, body) = send(app(&h), post_transfers("u1", Some("k1"), sample_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 0);
        let id = body["data"][0]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"][0]["status"], "pending");
        assert_eq!(body["data"][0]["amount"], "USD 125.00");

        let req = Request::builder()
            .uri(format!("/transfers/{id}"))
            .header("x-user-id", "u1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(&h), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], id.as_str());
    }

    #[tokio::test]
    async fn test_replay_returns_412() {
        let h = Harness::new("u1");
        let (status, _) = send(app(&h), post_transfers("u1", Some("k1"), sample_body())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(app(&h), post_transfers("u1", Some("k1"), sample_body())).await;
        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(body["code"], "SEEN_BEFORE");
        assert_eq!(body["requestId"], "req-1");
        assert_eq!(h.files.create_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_user_id_is_401() {
        let h = Harness::new("u1");
        let req = Request::builder()
            .uri("/transfers")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(&h), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "MISSING_USER_ID");
        assert!(body["requestId"].as_str().is_some_and(|s| !s.is_empty()));
    }

    #[tokio::test]
    async fn test_missing_fields_problem_payload() {
        let h = Harness::new("u1");
        let (status, body) = send(app(&h), post_transfers("u1", None, json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MISSING_FIELDS");
        assert_eq!(body["error"], "validation");
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("amount"));
        assert!(message.contains("customerDepository"));
    }

    #[tokio::test]
    async fn test_batch_alias_and_list() {
        let h = Harness::new("u1");
        let req = Request::builder()
            .method("POST")
            .uri("/transfers/batch")
            .header("x-user-id", "u1")
            .body(Body::from(
                serde_json::to_vec(&json!([sample_body(), sample_body()])).unwrap(),
            ))
            .unwrap();
        let (status, body) = send(app(&h), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let req = Request::builder()
            .uri("/transfers")
            .header("x-user-id", "u1")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(app(&h), req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        // Another user sees nothing
        let req = Request::builder()
            .uri("/transfers")
            .header("x-user-id", "u2")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(app(&h), req).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_and_events() {
        let h = Harness::new("u1");
        let (_, body) = send(app(&h), post_transfers("u1", None, sample_body())).await;
        let id = body["data"][0]["id"].as_str().unwrap().to_string();

        let req = Request::builder()
            .uri(format!("/transfers/{id}/events"))
            .header("x-user-id", "u1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(&h), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["transferId"], id.as_str());

        let req = Request::builder()
            .method("DELETE")
            .uri(format!("/transfers/{id}"))
            .header("x-user-id", "u1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(&h), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], id.as_str());

        let req = Request::builder()
            .uri(format!("/transfers/{id}"))
            .header("x-user-id", "u1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(&h), req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_failed_and_files_placeholders() {
        let h = Harness::new("u1");
        let req = Request::builder()
            .method("POST")
            .uri("/transfers/t1/failed")
            .header("x-user-id", "u1")
            .body(Body::empty())
            .unwrap();
        let resp = app(&h).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let req = Request::builder()
            .method("POST")
            .uri("/transfers/t1/files")
            .header("x-user-id", "u1")
            .body(Body::empty())
            .unwrap();
        let resp = app(&h).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("t1"));
    }

    #[tokio::test]
    async fn test_health_without_database() {
        let h = Harness::new("u1");
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(&h), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_sweeper_purges_expired_keys() {
        let store = Arc::new(IdempotencyStore::new(Duration::from_millis(10)));
        store.check_and_mark(&"u1".into(), "k1");
        let handle = spawn_idempotency_sweeper(store.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(80)).await;
        handle.abort();
        assert!(store.is_empty());
    }
}
