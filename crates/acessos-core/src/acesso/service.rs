//! Credential operations: store, visibility filtering, classification and reveal

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::expiration::{ExpirationClassifier, ExpirationEvent, ExpirationStatus};
use super::types::{
    Acesso, AcessoView, NewAcesso, RevealedSecret, StoredAcesso, UpdateAcesso, Visibility,
};
use super::visibility::VisibilityPolicy;
use crate::clock::Clock;
use crate::crypto::SecretCipher;
use crate::error::{Result, VaultError};
use crate::storage::Store;
use crate::user::Principal;

const UNKNOWN_OWNER: &str = "(unknown)";

/// Credential service
pub struct AcessoService {
    store: Arc<dyn Store>,
    cipher: SecretCipher,
    policy: VisibilityPolicy,
    classifier: ExpirationClassifier,
    clock: Arc<dyn Clock>,
}

impl AcessoService {
    pub fn new(
        store: Arc<dyn Store>,
        cipher: SecretCipher,
        policy: VisibilityPolicy,
        classifier: ExpirationClassifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            cipher,
            policy,
            classifier,
            clock,
        }
    }

    pub fn policy(&self) -> VisibilityPolicy {
        self.policy
    }

    pub fn classifier(&self) -> ExpirationClassifier {
        self.classifier
    }

    /// Create a credential owned by `requester`
    pub async fn create(&self, requester: &Principal, new: NewAcesso) -> Result<AcessoView> {
        info!(
            "Creating credential '{}' ({}) for user {}",
            new.title, new.visibility, requester.user_id
        );

        new.validate()?;
        self.policy.check_create(requester, new.visibility)?;

        let now = self.clock.now();
        let record = StoredAcesso {
            acesso: Acesso {
                id: 0,
                title: new.title.trim().to_string(),
                description: new.description.filter(|d| !d.trim().is_empty()),
                url: new.url.trim().to_string(),
                login: new.login,
                visibility: new.visibility,
                owner_id: requester.user_id,
                expires_on: new.expires_on,
                created_at: now,
                updated_at: now,
            },
            sealed_secret: self.cipher.seal(&new.secret)?,
        };

        let saved = self.store.insert_acesso(record).await?;
        Ok(self.view(&saved.acesso, requester.name.clone()))
    }

    /// Every credential visible to `requester`, ordered by id
    pub async fn list_visible(&self, requester: &Principal) -> Result<Vec<AcessoView>> {
        self.list_where(requester, |_| true).await
    }

    /// Shared credentials. Administrators only.
    pub async fn list_shared(&self, requester: &Principal) -> Result<Vec<AcessoView>> {
        if !requester.is_admin() {
            return Err(VaultError::forbidden(
                "Only administrators can list shared credentials.",
            ));
        }
        self.list_where(requester, |a| a.visibility == Visibility::Compartilhada)
            .await
    }

    /// The requester's own private credentials
    pub async fn list_personal(&self, requester: &Principal) -> Result<Vec<AcessoView>> {
        let me = requester.user_id;
        self.list_where(requester, move |a| {
            a.visibility == Visibility::Privada && a.owner_id == me
        })
        .await
    }

    /// Visible credentials whose title contains `fragment`, ignoring case
    pub async fn search_by_title(
        &self,
        requester: &Principal,
        fragment: &str,
    ) -> Result<Vec<AcessoView>> {
        let needle = fragment.trim().to_lowercase();
        self.list_where(requester, move |a| a.title.to_lowercase().contains(&needle))
            .await
    }

    /// A single credential, subject to the same visibility rule as listing
    pub async fn get(&self, requester: &Principal, id: u64) -> Result<AcessoView> {
        let record = self.load(id).await?;
        self.policy.check_view(requester, &record.acesso)?;

        let owner = self.owner_name(record.acesso.owner_id).await?;
        Ok(self.view(&record.acesso, owner))
    }

    pub async fn update(
        &self,
        requester: &Principal,
        id: u64,
        update: UpdateAcesso,
    ) -> Result<AcessoView> {
        update.validate()?;

        let mut record = self.load(id).await?;
        self.policy.check_modify(requester, &record.acesso)?;
        self.policy
            .check_visibility_change(requester, record.acesso.visibility, update.visibility)?;

        if let Some(secret) = update.new_secret() {
            record.sealed_secret = self.cipher.seal(secret)?;
        }

        let acesso = &mut record.acesso;
        acesso.title = update.title.trim().to_string();
        acesso.description = update.description.filter(|d| !d.trim().is_empty());
        acesso.url = update.url.trim().to_string();
        acesso.login = update.login;
        acesso.visibility = update.visibility;
        acesso.expires_on = update.expires_on;
        acesso.updated_at = self.clock.now();

        self.store.update_acesso(record.clone()).await?;
        info!("Credential {} updated by user {}", id, requester.user_id);

        let owner = self.owner_name(record.acesso.owner_id).await?;
        Ok(self.view(&record.acesso, owner))
    }

    /// Permanently delete a credential
    pub async fn delete(&self, requester: &Principal, id: u64) -> Result<()> {
        let record = self.load(id).await?;
        self.policy.check_modify(requester, &record.acesso)?;

        if !self.store.delete_acesso(id).await? {
            // Lost a race with another delete
            return Err(not_found(id));
        }

        info!("Credential {} deleted by user {}", id, requester.user_id);
        Ok(())
    }

    /// Decrypt and return a credential's secret
    ///
    /// Each call is a separate disclosure and is written to the `audit` log target.
    pub async fn reveal(&self, requester: &Principal, id: u64) -> Result<RevealedSecret> {
        let record = self.load(id).await?;

        if let Err(e) = self.policy.check_view(requester, &record.acesso) {
            warn!(
                target: "audit",
                user_id = requester.user_id,
                email = %requester.email,
                acesso_id = id,
                "Denied secret reveal"
            );
            return Err(e);
        }

        let secret = self.cipher.open(&record.sealed_secret)?;

        warn!(
            target: "audit",
            user_id = requester.user_id,
            email = %requester.email,
            acesso_id = id,
            at = %self.clock.now().to_rfc3339(),
            "Secret revealed"
        );

        Ok(RevealedSecret {
            secret,
            message: "Password revealed (audited operation).".to_string(),
        })
    }

    /// Visible credentials that are expired or inside the alert window
    pub async fn expiration_events(&self, requester: &Principal) -> Result<Vec<ExpirationEvent>> {
        let today = self.clock.today();
        let records = self.store.list_acessos().await?;
        let owners = self.owner_names().await?;

        let events = self
            .policy
            .filter_visible(requester, records.iter().map(|r| &r.acesso))
            .into_iter()
            .filter_map(|a| {
                let expires_on = a.expires_on?;
                let status = self.classifier.classify(Some(expires_on), today);
                if status == ExpirationStatus::Active {
                    return None;
                }
                Some(ExpirationEvent {
                    acesso_id: a.id,
                    title: a.title.clone(),
                    owner_name: owner_of(&owners, a.owner_id),
                    status,
                    expires_on,
                    days_remaining: (expires_on - today).num_days(),
                })
            })
            .collect();

        Ok(events)
    }

    async fn list_where<F>(&self, requester: &Principal, keep: F) -> Result<Vec<AcessoView>>
    where
        F: Fn(&Acesso) -> bool,
    {
        let records = self.store.list_acessos().await?;
        let owners = self.owner_names().await?;

        Ok(self
            .policy
            .filter_visible(requester, records.iter().map(|r| &r.acesso))
            .into_iter()
            .filter(|a| keep(a))
            .map(|a| self.view(a, owner_of(&owners, a.owner_id)))
            .collect())
    }

    async fn load(&self, id: u64) -> Result<StoredAcesso> {
        self.store.get_acesso(id).await?.ok_or_else(|| not_found(id))
    }

    async fn owner_names(&self) -> Result<HashMap<u64, String>> {
        Ok(self
            .store
            .list_users()
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect())
    }

    async fn owner_name(&self, owner_id: u64) -> Result<String> {
        Ok(self
            .store
            .get_user(owner_id)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| UNKNOWN_OWNER.to_string()))
    }

    /// Build a view with the status as of today
    fn view(&self, acesso: &Acesso, owner_name: String) -> AcessoView {
        let status = self.classifier.classify(acesso.expires_on, self.clock.today());
        AcessoView::new(acesso, owner_name, status)
    }
}

fn owner_of(owners: &HashMap<u64, String>, id: u64) -> String {
    owners
        .get(&id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_OWNER.to_string())
}

fn not_found(id: u64) -> VaultError {
    VaultError::not_found(format!("Credential not found with id: {}", id))
}
