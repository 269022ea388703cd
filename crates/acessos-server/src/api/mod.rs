//! REST API under `/api`

pub mod auth;
pub mod error;
pub mod rate_limit;
pub mod routes;

use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use acessos_core::Vault;
use rate_limit::RateLimiter;

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub vault: Arc<Vault>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(vault: Arc<Vault>) -> Self {
        let limiter = Arc::new(RateLimiter::new(vault.settings().rate_limit_per_minute));
        Self { vault, limiter }
    }
}

/// Health check endpoint
async fn health() -> &'static str {
    "OK"
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/registrar", post(routes::auth::register))
        .route(
            "/api/acessos",
            get(routes::acessos::list).post(routes::acessos::create),
        )
        .route(
            "/api/acessos/compartilhados",
            get(routes::acessos::list_shared),
        )
        .route("/api/acessos/pessoais", get(routes::acessos::list_personal))
        .route("/api/acessos/buscar", get(routes::acessos::search))
        .route(
            "/api/acessos/:id",
            get(routes::acessos::get)
                .put(routes::acessos::update)
                .delete(routes::acessos::delete),
        )
        .route("/api/acessos/:id/revelar", get(routes::acessos::reveal))
        .route(
            "/api/notificacoes",
            get(routes::notificacoes::list).delete(routes::notificacoes::clear),
        )
        .route(
            "/api/notificacoes/:id",
            delete(routes::notificacoes::dismiss),
        )
        .route("/api/usuarios", get(routes::usuarios::list))
        .route("/api/usuarios/:id", get(routes::usuarios::get))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use acessos_core::{BootstrapAdmin, Settings, SystemClock};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app(rate_limit_per_minute: u32) -> Router {
        let settings = Settings {
            token_secret: Some(BASE64.encode([7u8; 32])),
            rate_limit_per_minute,
            bootstrap_admin: BootstrapAdmin {
                nome: "Root".to_string(),
                email: "root@example.com".to_string(),
                senha: Some("root-password".to_string()),
            },
            ..Settings::default()
        };
        let vault = Vault::in_memory(settings, Arc::new(SystemClock)).await.unwrap();
        vault.ensure_admin().await.unwrap();
        router(AppState::new(Arc::new(vault)))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn login(app: &Router, email: &str, senha: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": email, "senha": senha})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["token"].as_str().unwrap().to_string()
    }

    fn acesso_json(titulo: &str, visibilidade: &str) -> Value {
        json!({
            "titulo": titulo,
            "url": "https://db.internal",
            "login": "root",
            "senha": "s3cret",
            "tipoVisibilidade": visibilidade,
        })
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(0).await;
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_failure_has_error_body() {
        let app = test_app(0).await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "root@example.com", "senha": "nope"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], 401);
        assert_eq!(body["mensagem"], "Invalid email or password");
        assert!(body.get("token").is_none());
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_login_response_shape() {
        let app = test_app(0).await;
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "root@example.com", "senha": "root-password"})),
        )
        .await;

        assert_eq!(body["nome"], "Root");
        assert_eq!(body["email"], "root@example.com");
        assert_eq!(body["role"], "ROLE_ADMIN");
    }

    #[tokio::test]
    async fn test_requires_bearer_token() {
        let app = test_app(0).await;
        let (status, _) = send(&app, Method::GET, "/api/acessos", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::GET, "/api/acessos", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_credential_lifecycle() {
        let app = test_app(0).await;
        let admin = login(&app, "root@example.com", "root-password").await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/registrar",
            Some(&admin),
            Some(json!({"nome": "Ana", "email": "ana@example.com", "senha": "password123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let ana = login(&app, "ana@example.com", "password123").await;

        // Standard users cannot create shared credentials
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/acessos",
            Some(&ana),
            Some(acesso_json("Shared", "COMPARTILHADA")),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["erro"], "Forbidden");

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/acessos",
            Some(&ana),
            Some(acesso_json("Mine", "PRIVADA")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["proprietarioNome"], "Ana");
        assert_eq!(created["status"], "ACTIVE");
        assert!(created.get("senha").is_none());
        let id = created["id"].as_u64().unwrap();

        // The administrator does not see another user's private credential
        let (_, listed) = send(&app, Method::GET, "/api/acessos", Some(&admin), None).await;
        assert_eq!(listed.as_array().unwrap().len(), 0);
        let uri = format!("/api/acessos/{}/revelar", id);
        let (status, _) = send(&app, Method::GET, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, revealed) = send(&app, Method::GET, &uri, Some(&ana), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(revealed["senha"], "s3cret");
        assert!(revealed["mensagem"].is_string());

        let uri = format!("/api/acessos/{}", id);
        let (status, _) = send(&app, Method::DELETE, &uri, Some(&ana), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::GET, &uri, Some(&ana), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, listed) = send(&app, Method::GET, "/api/acessos", Some(&ana), None).await;
        assert_eq!(listed.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let app = test_app(0).await;
        let admin = login(&app, "root@example.com", "root-password").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/acessos",
            Some(&admin),
            Some(acesso_json("", "PRIVADA")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/acessos",
            Some(&admin),
            Some(json!({"titulo": "missing fields"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/registrar",
            Some(&admin),
            Some(json!({"nome": "Root", "email": "root@example.com", "senha": "password123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_malformed_path_has_error_body() {
        let app = test_app(0).await;
        let admin = login(&app, "root@example.com", "root-password").await;

        for uri in [
            "/api/acessos/abc/revelar",
            "/api/acessos/abc",
            "/api/notificacoes/abc",
            "/api/usuarios/-1",
        ] {
            let method = if uri.starts_with("/api/notificacoes") {
                Method::DELETE
            } else {
                Method::GET
            };
            let (status, body) = send(&app, method, uri, Some(&admin), None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["status"], 400);
            assert_eq!(body["erro"], "Bad Request");
            assert!(body["mensagem"].as_str().unwrap().starts_with("Invalid path parameter"));
        }
    }

    #[tokio::test]
    async fn test_search_query() {
        let app = test_app(0).await;
        let admin = login(&app, "root@example.com", "root-password").await;
        send(
            &app,
            Method::POST,
            "/api/acessos",
            Some(&admin),
            Some(acesso_json("Prod DB", "PRIVADA")),
        )
        .await;

        let (status, found) =
            send(&app, Method::GET, "/api/acessos/buscar?titulo=prod", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found.as_array().unwrap().len(), 1);

        let (status, body) =
            send(&app, Method::GET, "/api/acessos/buscar?titulo=a&titulo=b", Some(&admin), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["mensagem"].as_str().unwrap().starts_with("Invalid query string"));
    }

    #[tokio::test]
    async fn test_notifications_endpoint() {
        let app = test_app(0).await;
        let admin = login(&app, "root@example.com", "root-password").await;

        let mut body = acesso_json("VPN", "COMPARTILHADA");
        body["dataExpiracao"] = json!("2000-01-01");
        send(&app, Method::POST, "/api/acessos", Some(&admin), Some(body)).await;

        let (status, feed) = send(&app, Method::GET, "/api/notificacoes", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let entries = feed.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["tipo"], "CRITICO");

        let (_, again) = send(&app, Method::GET, "/api/notificacoes", Some(&admin), None).await;
        assert_eq!(again.as_array().unwrap().len(), 1);

        let uri = format!("/api/notificacoes/{}", entries[0]["id"]);
        let (status, _) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let app = test_app(2).await;
        let admin = login(&app, "root@example.com", "root-password").await;

        for _ in 0..2 {
            let (status, _) = send(&app, Method::GET, "/api/acessos", Some(&admin), None).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = send(&app, Method::GET, "/api/acessos", Some(&admin), None).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["status"], 429);

        // Login is exempt
        login(&app, "root@example.com", "root-password").await;
    }
}
