//! Background expiration sweep
//!
//! Refreshes every user's notification feed on a fixed interval so entries
//! appear even for users who are not polling.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use acessos_core::Vault;

/// Periodic expiration sweep
pub struct ExpirationSweepJob {
    vault: Arc<Vault>,
    interval: Duration,
}

impl ExpirationSweepJob {
    pub fn new(vault: Arc<Vault>, interval: Duration) -> Self {
        Self { vault, interval }
    }

    /// Run on a background task until `shutdown` fires
    pub fn spawn(self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Starting expiration sweep every {:?}", self.interval);
            let mut ticker = tokio::time::interval(self.interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_once().await;
                    }
                    _ = shutdown.recv() => {
                        info!("Expiration sweep stopped");
                        break;
                    }
                }
            }
        })
    }

    /// One sweep. Failures are logged and retried on the next tick.
    pub async fn run_once(&self) -> usize {
        match self.vault.sweep_expirations().await {
            Ok(added) => {
                debug!("Sweep produced {} notifications", added);
                added
            }
            Err(e) => {
                warn!("Expiration sweep failed: {}", e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acessos_core::{
        BootstrapAdmin, ManualClock, NewAcesso, Settings, Visibility,
    };
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use chrono::{Duration as ChronoDuration, NaiveDate};

    async fn vault_with_expired_credential() -> (Arc<Vault>, acessos_core::Principal) {
        let today = NaiveDate::from_ymd_opt(2026, 5, 20).unwrap();
        let settings = Settings {
            token_secret: Some(BASE64.encode([3u8; 32])),
            bootstrap_admin: BootstrapAdmin {
                nome: "Root".to_string(),
                email: "root@example.com".to_string(),
                senha: Some("root-password".to_string()),
            },
            ..Settings::default()
        };
        let vault = Vault::in_memory(settings, Arc::new(ManualClock::at_date(today)))
            .await
            .unwrap();
        vault.ensure_admin().await.unwrap();
        let root = vault
            .users
            .authenticate("root@example.com", "root-password")
            .await
            .unwrap()
            .principal();

        vault
            .acessos
            .create(
                &root,
                NewAcesso {
                    title: "VPN".to_string(),
                    description: None,
                    url: "vpn.internal".to_string(),
                    login: "ops".to_string(),
                    secret: "pw".to_string(),
                    visibility: Visibility::Compartilhada,
                    expires_on: Some(today - ChronoDuration::days(1)),
                },
            )
            .await
            .unwrap();

        (Arc::new(vault), root)
    }

    #[tokio::test]
    async fn test_run_once() {
        let (vault, root) = vault_with_expired_credential().await;
        let job = ExpirationSweepJob::new(vault.clone(), Duration::from_secs(3600));

        assert_eq!(job.run_once().await, 1);
        assert_eq!(job.run_once().await, 0);
        assert_eq!(vault.notifications(&root).await.len(), 1);
    }

    #[tokio::test]
    async fn test_spawned_job_stops_on_shutdown() {
        let (vault, _) = vault_with_expired_credential().await;
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = ExpirationSweepJob::new(vault, Duration::from_secs(3600)).spawn(shutdown_rx);
        shutdown_tx.send(()).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweep job did not stop")
            .unwrap();
    }
}
