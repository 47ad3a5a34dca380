/// Application routes configuration
use crate::handlers::{get_apod, get_rover, health, not_found, AppState};
use axum::{http::Method, routing::get, Router};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health))
        // Proxy endpoints
        .route("/apod", get(get_apod))
        .route("/rover", get(get_rover))
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::NasaClient;
    use crate::config::Environment;
    use crate::errors::ErrorResponder;
    use crate::services::ProxyService;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Serve the router on an ephemeral port, returning its base URL
    async fn spawn_proxy(upstream: &MockServer, environment: Environment) -> String {
        let nasa = NasaClient::new(
            upstream.uri(),
            "test-key".to_string(),
            900,
            Duration::from_secs(5),
        )
        .unwrap();
        let state = AppState {
            proxy: Arc::new(ProxyService::new(nasa)),
            responder: ErrorResponder::new(environment.exposes_error_detail()),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn get_json(url: String) -> (u16, Value) {
        let resp = reqwest::get(url).await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_apod_wraps_payload_in_image() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/planetary/apod"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "date": "2024-03-01",
                "media_type": "image",
                "url": "x.jpg"
            })))
            .mount(&upstream)
            .await;

        let base = spawn_proxy(&upstream, Environment::Development).await;
        let (status, body) = get_json(format!("{}/apod", base)).await;

        assert_eq!(status, 200);
        assert_eq!(body["image"]["url"], "x.jpg");
    }

    #[tokio::test]
    async fn test_rover_wraps_payload_in_data() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mars-photos/api/v1/rovers/opportunity/photos"))
            .and(query_param("sol", "900"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "photos": [{"img_src": "o.jpg", "earth_date": "2006-12-01",
                            "rover": {"name": "Opportunity"}}]
            })))
            .expect(1)
            .mount(&upstream)
            .await;

        let base = spawn_proxy(&upstream, Environment::Development).await;
        let (status, body) = get_json(format!("{}/rover?rover=Opportunity", base)).await;

        assert_eq!(status, 200);
        assert_eq!(body["data"]["photos"][0]["img_src"], "o.jpg");
    }

    #[tokio::test]
    async fn test_rover_without_query_is_bad_request() {
        let upstream = MockServer::start().await;
        let base = spawn_proxy(&upstream, Environment::Development).await;

        let (status, body) = get_json(format!("{}/rover", base)).await;

        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let upstream = MockServer::start().await;
        let base = spawn_proxy(&upstream, Environment::Test).await;

        let (status, body) = get_json(format!("{}/nope", base)).await;

        assert_eq!(status, 404);
        assert_eq!(body["message"], "Not Found");
        assert_eq!(body["error"], Value::Null);
    }

    #[tokio::test]
    async fn test_upstream_failure_exposes_detail_outside_test_mode() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/planetary/apod"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&upstream)
            .await;

        let base = spawn_proxy(&upstream, Environment::Development).await;
        let (status, body) = get_json(format!("{}/apod", base)).await;

        assert_eq!(status, 502);
        assert_eq!(body["error"]["code"], "UPSTREAM_5XX");
        assert!(body["message"].as_str().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_upstream_failure_hides_detail_in_test_mode() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/planetary/apod"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&upstream)
            .await;

        let base = spawn_proxy(&upstream, Environment::Test).await;
        let (status, body) = get_json(format!("{}/apod", base)).await;

        assert_eq!(status, 502);
        assert_eq!(body["error"], Value::Null);
    }

    #[tokio::test]
    async fn test_health() {
        let upstream = MockServer::start().await;
        let base = spawn_proxy(&upstream, Environment::Development).await;

        let (status, body) = get_json(format!("{}/health", base)).await;

        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
    }
}
