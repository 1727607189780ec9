//! Axum router configuration

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

use super::handlers::{health_check, start_titling, stop_titling, version_check};

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health and version endpoints
        .route("/health", get(health_check))
        .route("/version", get(version_check))
        // Titling control
        .route("/titling", post(start_titling))
        .route("/titling/stop", post(stop_titling).delete(stop_titling))
        // Middleware
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::scheduler::TitleSink;

    struct NullSink;

    impl TitleSink for NullSink {
        fn show_title(&self, _lines: &[String]) {}
        fn clear_title(&self) {}
    }

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(ServerConfig::default(), Arc::new(NullSink)))
    }

    #[test]
    fn test_create_router() {
        let _router = create_router(state());
        // Router creation successful
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use tower::util::ServiceExt; // Use tower::util::ServiceExt for oneshot

        let app = create_router(state());
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_titling_requires_vtt_path() {
        use axum::body::Body;
        use axum::http::{header, Method, Request, StatusCode};
        use tower::util::ServiceExt;

        let app = create_router(state());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/titling")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stop_accepts_post_and_delete() {
        use axum::body::Body;
        use axum::http::{Method, Request, StatusCode};
        use tower::util::ServiceExt;

        for method in [Method::POST, Method::DELETE] {
            let app = create_router(state());
            let request = Request::builder()
                .method(method.clone())
                .uri("/titling/stop")
                .body(Body::empty())
                .unwrap();
            let response = app.oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{method}");
        }
    }
}
