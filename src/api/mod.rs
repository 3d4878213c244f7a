// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::require_auth,
    models::{
        CreateUserRequest, CreateUserResponse, MetricPoint, PostMetricRequest,
        PostMetricResponse, UserResponse,
    },
    state::AppState,
};

pub mod health;
pub mod metrics;
pub mod root;
pub mod users;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/users", post(users::create_user))
        .route("/users/{email}", get(users::get_user))
        .route("/metrics", post(metrics::post_metric))
        .route("/metrics/{metric_id}", get(metrics::get_metrics))
        .route_layer(from_fn_with_state(state.auth.clone(), require_auth));

    let app = protected
        .route("/", get(root::index))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .merge(app)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        root::index,
        health::health,
        health::liveness,
        users::get_user,
        users::create_user,
        metrics::post_metric,
        metrics::get_metrics
    ),
    components(
        schemas(
            CreateUserRequest,
            CreateUserResponse,
            UserResponse,
            PostMetricRequest,
            PostMetricResponse,
            MetricPoint,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Users", description = "User profiles keyed by email"),
        (name = "Metrics", description = "Heart-rate samples keyed by device and email"),
        (name = "Health", description = "Banner and probes")
    )
)]
struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_keys;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::for_tests())
    }

    fn bearer() -> String {
        format!("Bearer {}", test_keys::token_for("auth0|integration"))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(AUTHORIZATION, bearer())
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(AUTHORIZATION, bearer())
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn root_returns_banner_without_auth() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], root::GREETING.as_bytes());
    }

    #[tokio::test]
    async fn create_then_lookup_user() {
        let app = app();
        let (status, body) = send(
            &app,
            post_json(
                "/users",
                json!({"first_name": "Ada", "last_name": "Lovelace", "email": "ada@example.com"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"first_name": "Ada", "last_name": "Lovelace", "email": "ada@example.com"})
        );

        let (status, body) = send(&app, get_request("/users/ada@example.com")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["first_name"], "Ada");
        assert_eq!(body["last_name"], "Lovelace");
        assert_eq!(body["email"], "ada@example.com");
        assert_eq!(body["deviceId"], "");
    }

    #[tokio::test]
    async fn second_create_overwrites_last_name() {
        let app = app();
        for last in ["Lovelace", "King"] {
            let (status, _) = send(
                &app,
                post_json(
                    "/users",
                    json!({"first_name": "Ada", "last_name": last, "email": "ada@example.com"}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, body) = send(&app, get_request("/users/ada@example.com")).await;
        assert_eq!(body["last_name"], "King");
    }

    #[tokio::test]
    async fn create_user_without_email_is_rejected_and_not_stored() {
        let state = AppState::for_tests();
        let app = router(state.clone());
        let (status, body) = send(
            &app,
            post_json(
                "/users",
                json!({"first_name": "Ada", "last_name": "Lovelace", "email": ""}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": users::USER_FIELDS_REQUIRED}));
        assert!(state.store.get_user("").unwrap().is_none());
        assert!(state.store.get_user("ada@example.com").unwrap().is_none());

        let (status, _) = send(
            &app,
            post_json("/users", json!({"first_name": "Ada", "last_name": "Lovelace"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_user_is_404() {
        let (status, body) = send(&app(), get_request("/users/nonexistent@x.com")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "User does not exist"}));
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/users")
            .header(AUTHORIZATION, bearer())
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn numeric_field_is_400() {
        let (status, _) = send(
            &app(),
            post_json(
                "/users",
                json!({"first_name": "Ada", "last_name": "L", "email": "a@b.com", "age": 36}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_400() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/metrics")
            .header(AUTHORIZATION, bearer())
            .body(Body::from(r#"{"deviceId":"d1"}"#))
            .unwrap();

        let (status, _) = send(&app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn post_metric_then_query_latest() {
        let app = app();
        let (status, body) = send(
            &app,
            post_json(
                "/metrics",
                json!({
                    "deviceId": "d1",
                    "email": "a@b.com",
                    "datetime": "2023-01-01T00:00:00Z",
                    "heart_rate": "72"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"metricId": "d1-a@b.com", "datetime": "2023-01-01T00:00:00Z", "heart_rate": "72"})
        );

        let (status, body) = send(&app, get_request("/metrics/d1-a@b.com")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{"datetime": "2023-01-01T00:00:00Z", "heart_rate": "72"}])
        );
    }

    #[tokio::test]
    async fn range_excluding_everything_is_empty() {
        let app = app();
        send(
            &app,
            post_json(
                "/metrics",
                json!({"deviceId": "d1", "email": "a@b.com", "datetime": "2023-01-01T00:00:00Z"}),
            ),
        )
        .await;

        let (status, body) = send(
            &app,
            get_request("/metrics/d1-a@b.com?from=2024-01-01&to=2024-12-31"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn repeated_range_key_falls_back_to_latest() {
        let app = app();
        for (datetime, rate) in [("2023-01-01", "70"), ("2023-01-02", "72")] {
            send(
                &app,
                post_json(
                    "/metrics",
                    json!({"deviceId": "d1", "email": "a@b.com", "datetime": datetime, "heart_rate": rate}),
                ),
            )
            .await;
        }

        let (status, body) = send(
            &app,
            get_request("/metrics/d1-a@b.com?from=a&from=b&to=c"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"datetime": "2023-01-02", "heart_rate": "72"}]));
    }

    #[tokio::test]
    async fn non_utf8_path_segment_is_json_400() {
        let app = app();
        for uri in ["/users/%FF", "/metrics/%FF"] {
            let response = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                response.headers()[CONTENT_TYPE],
                "application/json"
            );

            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert!(!body["error"].as_str().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn post_metric_without_device_is_400() {
        let (status, body) = send(
            &app(),
            post_json(
                "/metrics",
                json!({"email": "a@b.com", "datetime": "2023-01-01T00:00:00Z"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": metrics::METRIC_FIELDS_REQUIRED}));
    }

    #[tokio::test]
    async fn missing_authorization_is_401() {
        let request = Request::builder()
            .uri("/users/ada@example.com")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "authorization_header_missing");
        assert!(!body["description"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn basic_scheme_is_invalid_header() {
        let request = Request::builder()
            .uri("/metrics/d1-a@b.com")
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "invalid_header");
    }

    #[tokio::test]
    async fn expired_token_is_401() {
        let mut claims = test_keys::valid_claims("auth0|integration");
        claims["exp"] = 1_000_000.into();
        let request = Request::builder()
            .uri("/users/ada@example.com")
            .header(
                AUTHORIZATION,
                format!("Bearer {}", test_keys::sign(&claims, Some(test_keys::KID))),
            )
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "token_expired");
    }

    #[tokio::test]
    async fn wrong_audience_is_401() {
        let mut claims = test_keys::valid_claims("auth0|integration");
        claims["aud"] = "https://other.example.com".into();
        let request = Request::builder()
            .uri("/users/ada@example.com")
            .header(
                AUTHORIZATION,
                format!("Bearer {}", test_keys::sign(&claims, Some(test_keys::KID))),
            )
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "invalid_claims");
    }

    #[tokio::test]
    async fn unknown_kid_is_401() {
        let token = test_keys::sign(&test_keys::valid_claims("auth0|integration"), Some("old"));
        let request = Request::builder()
            .uri("/users/ada@example.com")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "invalid_header");
        assert_eq!(body["description"], "Unable to find appropriate key");
    }

    #[tokio::test]
    async fn cors_preflight_needs_no_token() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/users")
            .header("origin", "https://app.example.com")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "authorization,content-type")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }

    #[tokio::test]
    async fn health_endpoints_need_no_token() {
        let app = app();
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["store"], "ok");

        let request = Request::builder()
            .uri("/health/live")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn openapi_document_lists_record_paths() {
        let request = Request::builder()
            .uri("/api-doc/openapi.json")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/users/{email}"].is_object());
        assert!(body["paths"]["/metrics/{metric_id}"].is_object());
        assert!(body["components"]["securitySchemes"]["bearer"].is_object());
    }
}
