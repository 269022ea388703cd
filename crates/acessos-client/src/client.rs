//! REST client

use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{ClientError, Result};
use crate::session::ClientSession;
use acessos_core::{
    AcessoView, NewAcesso, NewUser, Notification, SecretString, UpdateAcesso, UserView,
};

/// How long a revealed secret stays on screen
pub const REVEAL_DISPLAY_SECS: i64 = 10;

/// A secret returned by the reveal endpoint
#[derive(Debug)]
pub struct RevealedSecret {
    pub secret: SecretString,
    pub message: String,
    pub revealed_at: DateTime<Utc>,
}

impl RevealedSecret {
    /// Whether the secret should still be displayed at `now`
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.revealed_at && now < self.revealed_at + Duration::seconds(REVEAL_DISPLAY_SECS)
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    senha: &'a str,
}

#[derive(Deserialize)]
struct RevealResponse {
    senha: String,
    mensagem: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    mensagem: String,
}

/// Client for the credential-sharing API
#[derive(Debug, Clone)]
pub struct AcessosClient {
    http: Client,
    base_url: Url,
}

impl AcessosClient {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:8080`)
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Connection(format!("Invalid base URL: {}", e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Log in and return the new session
    ///
    /// Nothing is returned on failure, so a caller that only keeps successful
    /// sessions stays logged out.
    pub async fn login(&self, email: &str, senha: &str) -> Result<ClientSession> {
        let request = self
            .builder(Method::POST, "api/auth/login", None)?
            .json(&LoginRequest { email, senha });
        let session: ClientSession = self.send_json(request).await?;

        info!("Logged in as {} ({})", session.email, session.role);
        Ok(session)
    }

    pub async fn health(&self) -> Result<()> {
        let request = self.builder(Method::GET, "health", None)?;
        self.send(request).await.map(|_| ())
    }

    pub async fn list_acessos(&self, session: &ClientSession) -> Result<Vec<AcessoView>> {
        self.get_json("api/acessos", session).await
    }

    pub async fn create_acesso(
        &self,
        session: &ClientSession,
        acesso: &NewAcesso,
    ) -> Result<AcessoView> {
        let request = self
            .builder(Method::POST, "api/acessos", Some(session))?
            .json(acesso);
        self.send_json(request).await
    }

    pub async fn get_acesso(&self, session: &ClientSession, id: u64) -> Result<AcessoView> {
        self.get_json(&format!("api/acessos/{}", id), session).await
    }

    pub async fn update_acesso(
        &self,
        session: &ClientSession,
        id: u64,
        update: &UpdateAcesso,
    ) -> Result<AcessoView> {
        let request = self
            .builder(Method::PUT, &format!("api/acessos/{}", id), Some(session))?
            .json(update);
        self.send_json(request).await
    }

    pub async fn delete_acesso(&self, session: &ClientSession, id: u64) -> Result<()> {
        let request = self.builder(Method::DELETE, &format!("api/acessos/{}", id), Some(session))?;
        self.send(request).await.map(|_| ())
    }

    /// Fetch a credential's secret. Each call is audited by the server.
    pub async fn reveal(&self, session: &ClientSession, id: u64) -> Result<RevealedSecret> {
        let response: RevealResponse = self
            .get_json(&format!("api/acessos/{}/revelar", id), session)
            .await?;

        Ok(RevealedSecret {
            secret: SecretString::new(response.senha),
            message: response.mensagem,
            revealed_at: Utc::now(),
        })
    }

    pub async fn list_shared(&self, session: &ClientSession) -> Result<Vec<AcessoView>> {
        self.get_json("api/acessos/compartilhados", session).await
    }

    pub async fn list_personal(&self, session: &ClientSession) -> Result<Vec<AcessoView>> {
        self.get_json("api/acessos/pessoais", session).await
    }

    pub async fn search(&self, session: &ClientSession, titulo: &str) -> Result<Vec<AcessoView>> {
        let request = self
            .builder(Method::GET, "api/acessos/buscar", Some(session))?
            .query(&[("titulo", titulo)]);
        self.send_json(request).await
    }

    pub async fn notifications(&self, session: &ClientSession) -> Result<Vec<Notification>> {
        self.get_json("api/notificacoes", session).await
    }

    pub async fn dismiss_notification(&self, session: &ClientSession, id: u64) -> Result<()> {
        let request = self.builder(
            Method::DELETE,
            &format!("api/notificacoes/{}", id),
            Some(session),
        )?;
        self.send(request).await.map(|_| ())
    }

    pub async fn clear_notifications(&self, session: &ClientSession) -> Result<()> {
        let request = self.builder(Method::DELETE, "api/notificacoes", Some(session))?;
        self.send(request).await.map(|_| ())
    }

    /// Register a standard user. Administrators only.
    pub async fn register_user(&self, session: &ClientSession, user: &NewUser) -> Result<UserView> {
        let request = self
            .builder(Method::POST, "api/auth/registrar", Some(session))?
            .json(user);
        self.send_json(request).await
    }

    pub async fn list_users(&self, session: &ClientSession) -> Result<Vec<UserView>> {
        self.get_json("api/usuarios", session).await
    }

    pub async fn get_user(&self, session: &ClientSession, id: u64) -> Result<UserView> {
        self.get_json(&format!("api/usuarios/{}", id), session).await
    }

    fn builder(
        &self,
        method: Method,
        path: &str,
        session: Option<&ClientSession>,
    ) -> Result<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::Connection(format!("Invalid path {}: {}", path, e)))?;

        debug!("{} {}", method, url);
        let request = self.http.request(method, url);
        Ok(match session {
            Some(session) => request.bearer_auth(&session.token),
            None => request,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, session: &ClientSession) -> Result<T> {
        let request = self.builder(Method::GET, path, Some(session))?;
        self.send_json(request).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        Ok(self.send(request).await?.json().await?)
    }

    /// Send a request and turn non-success statuses into errors
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.mensagem)
            .unwrap_or_else(|_| {
                if text.is_empty() {
                    status.to_string()
                } else {
                    text
                }
            });

        debug!("Request failed with status {}: {}", status, message);
        Err(ClientError::from_status(status, message))
    }
}
