//! Server settings management
//!
//! Stores configuration in a plain JSON file next to the data file.
//! Missing keys take their defaults.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::acesso::ExpirationClassifier;
use crate::error::{Result, VaultError};
use crate::session::Session;
use crate::user::NewUser;

const SETTINGS_FILE: &str = "settings.json";

/// Administrator account created at startup when absent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub nome: String,
    pub email: String,
    /// Unset means no bootstrap account is created
    #[serde(default)]
    pub senha: Option<String>,
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self {
            nome: "Administrator".to_string(),
            email: "admin@acessos.local".to_string(),
            senha: None,
        }
    }
}

impl BootstrapAdmin {
    /// Registration payload, if a password is configured
    pub fn to_new_user(&self) -> Option<NewUser> {
        self.senha.as_ref().map(|senha| NewUser {
            name: self.nome.clone(),
            email: self.email.clone(),
            password: senha.clone(),
        })
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    pub bind_address: String,
    pub port: u16,
    /// Base64 token signing secret. Also the input for the secret-sealing key.
    pub token_secret: Option<String>,
    pub token_ttl_secs: u64,
    pub expiration_alert_days: u32,
    pub sweep_interval_secs: u64,
    /// Requests per minute per client address (0 = unlimited)
    pub rate_limit_per_minute: u32,
    /// Let administrators read every private credential
    pub admin_reads_private: bool,
    pub bootstrap_admin: BootstrapAdmin,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            token_secret: None,
            token_ttl_secs: Session::DEFAULT_DURATION_SECS,
            expiration_alert_days: ExpirationClassifier::DEFAULT_ALERT_DAYS,
            sweep_interval_secs: 60 * 60,
            rate_limit_per_minute: 10,
            admin_reads_private: false,
            bootstrap_admin: BootstrapAdmin::default(),
        }
    }
}

impl Settings {
    /// Decoded token secret
    pub fn token_secret_bytes(&self) -> Result<Vec<u8>> {
        let encoded = self
            .token_secret
            .as_deref()
            .ok_or_else(|| VaultError::KeyDerivationError("No token secret configured".to_string()))?;
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| VaultError::KeyDerivationError(format!("Token secret is not base64: {}", e)))?;
        if bytes.len() < 32 {
            return Err(VaultError::KeyDerivationError(
                "Token secret must be at least 32 bytes".to_string(),
            ));
        }
        Ok(bytes)
    }
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Load settings from `dir`, falling back to defaults
    pub fn load(dir: &Path) -> Result<Self> {
        let settings_file = dir.join(SETTINGS_FILE);
        let settings = Self::load_from_file(&settings_file)?;

        Ok(Self {
            settings_file,
            settings,
        })
    }

    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> Result<()> {
        if let Some(dir) = self.settings_file.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let contents = serde_json::to_string_pretty(&self.settings)?;

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Generate and save a token secret if none is configured
    ///
    /// Returns whether a new secret was generated.
    pub async fn ensure_token_secret(&mut self) -> Result<bool> {
        if self.settings.token_secret.is_some() {
            return Ok(false);
        }

        let mut secret = [0u8; 48];
        rand::rngs::OsRng.fill_bytes(&mut secret);
        self.settings.token_secret = Some(BASE64.encode(secret));
        self.save().await?;

        info!("Generated a new token secret in {:?}", self.settings_file);
        Ok(true)
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }
}
