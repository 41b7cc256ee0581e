use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method,
    },
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::health;
use super::state::AppState;
use super::users;

/// CORS policy open to any origin, as browser clients call the API directly
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
}

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .nest("/api/users", users::create_users_router())
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::infrastructure::auth::{SigningSecret, TokenIssuer};
    use crate::infrastructure::user::{Argon2Hasher, AuthService, InMemoryCredentialStore};

    fn test_issuer() -> Arc<TokenIssuer> {
        Arc::new(TokenIssuer::new(
            &SigningSecret::new("router-test-secret").unwrap(),
        ))
    }

    fn create_app() -> Router {
        let service = AuthService::new(
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(Argon2Hasher::new()),
            test_issuer(),
        );

        create_router(AppState::new(Arc::new(service)))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
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

    fn registration() -> Value {
        json!({
            "username": "ana",
            "email": "ana@example.com",
            "phone": "5512345678",
            "password": "Password@23"
        })
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = create_app();

        let (status, body) = send(
            &app,
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, _) = send(
            &app,
            Request::builder().uri("/live").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let app = create_app();

        let (status, body) = send(&app, post_json("/api/users/register", registration())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], users::REGISTERED_MESSAGE);

        let (status, body) = send(
            &app,
            post_json(
                "/api/users/login",
                json!({ "emailOrUsername": "ana@example.com", "password": "Password@23" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let token = body["token"].as_str().unwrap();
        let claims = test_issuer().verify(token).unwrap();
        assert_eq!(claims.sub, "ana");
        assert!(body["expires_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let app = create_app();

        let (status, _) = send(&app, post_json("/api/users/register", registration())).await;
        assert_eq!(status, StatusCode::OK);

        let mut duplicate = registration();
        duplicate["username"] = json!("other");
        duplicate["email"] = json!("other@example.com");

        let (status, body) = send(&app, post_json("/api/users/register", duplicate)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "already_registered");
    }

    #[tokio::test]
    async fn test_missing_fields_are_listed() {
        let app = create_app();

        let (status, body) = send(
            &app,
            post_json("/api/users/register", json!({ "username": "ana" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "missing_fields");
        let fields: Vec<&str> = body["error"]["errors"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["field"].as_str())
            .collect();
        assert_eq!(fields, vec!["email", "phone", "password"]);
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let app = create_app();
        let mut request = registration();
        request["password"] = json!("password");

        let (status, body) = send(&app, post_json("/api/users/register", request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_failed");
    }

    #[tokio::test]
    async fn test_login_failures_look_identical() {
        let app = create_app();
        send(&app, post_json("/api/users/register", registration())).await;

        let (wrong_status, wrong_body) = send(
            &app,
            post_json(
                "/api/users/login",
                json!({ "emailOrUsername": "ana", "password": "Wrong@123" }),
            ),
        )
        .await;
        let (unknown_status, unknown_body) = send(
            &app,
            post_json(
                "/api/users/login",
                json!({ "emailOrUsername": "nobody", "password": "Password@23" }),
            ),
        )
        .await;

        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_body, unknown_body);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = create_app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/users/login")
            .header("content-type", "application/json")
            .body(Body::from("{oops"))
            .unwrap();

        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let app = create_app();
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/users/login")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }
}
