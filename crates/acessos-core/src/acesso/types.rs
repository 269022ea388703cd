//! Credential ("acesso") type definitions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::expiration::ExpirationStatus;
use crate::crypto::SecretString;
use crate::error::{Result, VaultError};

/// Longest accepted title
pub const MAX_TITLE_LEN: usize = 100;

/// Who can see a credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    /// Owner only
    #[serde(alias = "PESSOAL")]
    Privada,
    /// Shared among administrators
    Compartilhada,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Privada => f.write_str("PRIVADA"),
            Visibility::Compartilhada => f.write_str("COMPARTILHADA"),
        }
    }
}

/// Credential metadata (safe to display)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acesso {
    pub id: u64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    pub url: String,
    pub login: String,
    #[serde(rename = "tipoVisibilidade")]
    pub visibility: Visibility,
    #[serde(rename = "proprietarioId")]
    pub owner_id: u64,
    #[serde(rename = "dataExpiracao")]
    pub expires_on: Option<NaiveDate>,
    #[serde(rename = "criadoEm")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "atualizadoEm")]
    pub updated_at: DateTime<Utc>,
}

/// Credential as persisted, with its secret sealed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAcesso {
    #[serde(flatten)]
    pub acesso: Acesso,
    /// `iv:tag:ciphertext`
    pub sealed_secret: String,
}

/// Create payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAcesso {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    pub url: String,
    pub login: String,
    #[serde(rename = "senha")]
    pub secret: String,
    #[serde(rename = "tipoVisibilidade")]
    pub visibility: Visibility,
    #[serde(rename = "dataExpiracao", default)]
    pub expires_on: Option<NaiveDate>,
}

impl NewAcesso {
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.title, &self.url, &self.login)?;
        if self.secret.trim().is_empty() {
            return Err(VaultError::validation("Password is required."));
        }
        Ok(())
    }
}

/// Update payload. A missing or blank secret keeps the current one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAcesso {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    pub url: String,
    pub login: String,
    #[serde(rename = "senha", default)]
    pub secret: Option<String>,
    #[serde(rename = "tipoVisibilidade")]
    pub visibility: Visibility,
    #[serde(rename = "dataExpiracao", default)]
    pub expires_on: Option<NaiveDate>,
}

impl UpdateAcesso {
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.title, &self.url, &self.login)
    }

    /// The replacement secret, if one was actually supplied
    pub fn new_secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|s| !s.trim().is_empty())
    }
}

fn validate_fields(title: &str, url: &str, login: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(VaultError::validation("Title is required."));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(VaultError::validation(format!(
            "Title must have at most {} characters.",
            MAX_TITLE_LEN
        )));
    }
    if !is_plausible_url(url) {
        return Err(VaultError::validation("URL is required and must be valid."));
    }
    if login.trim().is_empty() {
        return Err(VaultError::validation("Login is required."));
    }
    Ok(())
}

/// Accepts absolute URLs and bare hosts such as `db.internal:5432`
fn is_plausible_url(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() || raw.contains(char::is_whitespace) {
        return false;
    }
    url::Url::parse(raw).is_ok() || url::Url::parse(&format!("https://{}", raw)).is_ok()
}

/// Credential as returned to a requester, with its expiration status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcessoView {
    pub id: u64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    pub url: String,
    pub login: String,
    #[serde(rename = "tipoVisibilidade")]
    pub visibility: Visibility,
    #[serde(rename = "proprietarioNome")]
    pub owner_name: String,
    #[serde(rename = "dataExpiracao")]
    pub expires_on: Option<NaiveDate>,
    #[serde(rename = "expirada")]
    pub expired: bool,
    #[serde(rename = "proximaExpiracao")]
    pub near_expiry: bool,
    pub status: ExpirationStatus,
}

impl AcessoView {
    pub fn new(acesso: &Acesso, owner_name: String, status: ExpirationStatus) -> Self {
        Self {
            id: acesso.id,
            title: acesso.title.clone(),
            description: acesso.description.clone(),
            url: acesso.url.clone(),
            login: acesso.login.clone(),
            visibility: acesso.visibility,
            owner_name,
            expires_on: acesso.expires_on,
            expired: status == ExpirationStatus::Expired,
            near_expiry: status == ExpirationStatus::NearExpiry,
            status,
        }
    }
}

/// Result of a reveal
#[derive(Debug)]
pub struct RevealedSecret {
    pub secret: SecretString,
    pub message: String,
}
