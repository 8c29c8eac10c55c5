// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Client
//!
//! [`ReceiptClient`] is the single entry point for the host application.
//! It holds the provider configuration and the current user, and sequences
//! the key store, signing, auth, and license calls:
//!
//! ```text
//! initialize     : key get-or-create -> address -> sign -> register (once) -> token
//! create_license : key -> terms -> sign license -> submit
//! publish        : token -> guard (fresh) -> capture upload
//! ```
//!
//! Every operation other than [`ReceiptClient::configure`] fails with a
//! precondition error (see [`SdkError::is_precondition`]) until a config
//! is set, and everything past `initialize` also needs a user. A failed
//! precondition has no side effects: no key is generated and no request is
//! sent.
//!
//! The client is caller-owned. Operations that change the session take
//! `&mut self`; callers sharing one client across tasks must serialise
//! access themselves (for example with a `tokio::sync::Mutex`).

use crate::auth::{AddressRegistration, AddressToken, AuthSession, LogoutOutcome};
use crate::capture::{ReceiptCapture, ReceiptResponse};
use crate::config::{self, Config, Endpoints};
use crate::crypto::{self, Address};
use crate::error::{SdkError, SdkResult};
use crate::http::ApiClient;
use crate::license::{
    GuardRequest, LicenseManager, LicenseRecord, LicenseRequestBuilder, LicenseUse,
};
use crate::storage::{FileStorage, KeyStore, StoragePaths, StoredKey};

/// The user an initialized client acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub user_id: String,
    pub address: Address,
}

/// Whether the client has been configured, and for which user.
#[derive(Debug, Clone)]
pub enum ClientState {
    Unconfigured,
    Configured {
        config: Config,
        user: Option<UserSession>,
    },
}

/// Receipt capture and licensing client.
pub struct ReceiptClient<C> {
    keys: KeyStore,
    auth: AuthSession,
    licenses: LicenseManager,
    capture: C,
    state: ClientState,
}

impl<C: ReceiptCapture> ReceiptClient<C> {
    pub fn new(keys: KeyStore, endpoints: &Endpoints, capture: C) -> SdkResult<Self> {
        let api = ApiClient::new(endpoints)?;
        Ok(Self {
            keys,
            auth: AuthSession::new(api.clone()),
            licenses: LicenseManager::new(api),
            capture,
            state: ClientState::Unconfigured,
        })
    }

    /// Build a client from `RECEIPT_SDK_*` environment variables.
    ///
    /// Fails early if the key storage root is not writable.
    pub fn from_env(capture: C) -> SdkResult<Self> {
        let storage = match config::data_dir_from_env() {
            Some(dir) => FileStorage::open(StoragePaths::new(dir))?,
            None => FileStorage::open_default()?,
        };
        storage.health_check()?;
        Self::new(KeyStore::new(storage), &Endpoints::from_env()?, capture)
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn config(&self) -> Option<&Config> {
        match &self.state {
            ClientState::Configured { config, .. } => Some(config),
            ClientState::Unconfigured => None,
        }
    }

    pub fn user(&self) -> Option<&UserSession> {
        match &self.state {
            ClientState::Configured { user, .. } => user.as_ref(),
            ClientState::Unconfigured => None,
        }
    }

    pub fn key_store(&self) -> &KeyStore {
        &self.keys
    }

    /// Set the provider configuration.
    ///
    /// Replacing an existing configuration ends the current user session.
    pub async fn configure(&mut self, config: Config) -> SdkResult<()> {
        config.validate()?;

        if let ClientState::Configured { user: Some(_), .. } = &self.state {
            self.logout().await;
        }
        tracing::info!(
            provider_id = %config.provider_id,
            origin = %config.origin,
            "Client configured"
        );
        self.state = ClientState::Configured { config, user: None };
        Ok(())
    }

    /// Make `user_id` the current user.
    ///
    /// Generates and registers the user's key on first use, then exchanges
    /// the signed address for a token. The user stays current even if the
    /// token exchange fails; later calls retry it.
    pub async fn initialize(&mut self, user_id: &str) -> SdkResult<Address> {
        let config = self.require_config("initialize")?.clone();
        if user_id.trim().is_empty() {
            return Err(SdkError::InvalidArgument("user id is empty".to_string()));
        }

        let stored = self.keys.get_or_create(&config.provider_id, user_id)?;
        let address = stored.address();
        let signature = crypto::sign(address.as_bytes(), &stored.key_pair);

        if !stored.metadata.registered {
            let registration = AddressRegistration {
                provider_id: config.provider_id.clone(),
                user_id: user_id.to_string(),
                address,
                public_key: stored.key_pair.public_key_base64()?,
                signature: signature.clone(),
            };
            self.auth
                .register_address(&config.public_key, &registration)
                .await?;
            self.keys.mark_registered(&config.provider_id, user_id)?;
        }

        if let ClientState::Configured { user, .. } = &mut self.state {
            *user = Some(UserSession {
                user_id: user_id.to_string(),
                address,
            });
        }
        tracing::info!(
            provider_id = %config.provider_id,
            %user_id,
            %address,
            new_key = stored.created,
            "User initialized"
        );

        self.auth
            .get_token(&config.provider_id, &signature, &config.scopes, &address)
            .await?;
        Ok(address)
    }

    /// Open the camera. `None` means the user cancelled.
    pub async fn scan(&self) -> SdkResult<Option<String>> {
        self.require_user("scan")?;
        self.capture.scan().await
    }

    /// Upload receipt images, gated on a fresh guard check.
    ///
    /// The upload is never attempted unless the guard call succeeds and
    /// reports the license as verified.
    pub async fn publish(&self, images: &[String]) -> SdkResult<Option<String>> {
        let (config, user) = self.require_user("publish")?;
        if images.is_empty() {
            return Err(SdkError::InvalidArgument("no images to publish".to_string()));
        }

        let token = self.ensure_token(config, user).await?;
        let guard = GuardRequest::new(user.user_id.clone(), vec![LicenseUse::default()]);
        let result = self.licenses.guard(&guard, &token).await.map_err(|e| {
            tracing::warn!(user_id = %user.user_id, error = %e, "Guard check failed, publish blocked");
            e
        })?;
        if let Err(e) = result.ensure_verified() {
            tracing::warn!(user_id = %user.user_id, error = %e, "Publish blocked");
            return Err(e);
        }

        let receipt_id = self.capture.publish(images, &token).await?;
        tracing::info!(
            user_id = %user.user_id,
            images = images.len(),
            receipt_id = receipt_id.as_deref().unwrap_or(""),
            "Published receipt"
        );
        Ok(receipt_id)
    }

    /// Sign and submit a license for the current user.
    pub async fn create_license(&self) -> SdkResult<LicenseRecord> {
        let (config, user) = self.require_user("create_license")?;
        let stored = self.require_key(config, user)?;

        let terms = LicenseManager::terms(
            &config.company_name,
            &config.company_jurisdiction,
            &config.tos_url,
            &config.privacy_url,
        );
        let request = LicenseRequestBuilder::new(&user.user_id, &config.origin, terms)
            .build()
            .sign(&stored.key_pair)?;
        request.verify_signer(stored.key_pair.verifying_key(), &user.address)?;

        let token = self.ensure_token(config, user).await?;
        self.licenses.create(&token, &request).await
    }

    /// Fetch a license by id.
    pub async fn license(&self, license_id: &str) -> SdkResult<LicenseRecord> {
        let (config, user) = self.require_user("license")?;
        let token = self.ensure_token(config, user).await?;
        self.licenses.get(license_id, &token).await
    }

    /// Fetch extracted data for an uploaded receipt.
    pub async fn receipt(&self, receipt_id: &str) -> SdkResult<Option<Vec<ReceiptResponse>>> {
        let (config, user) = self.require_user("receipt")?;
        if receipt_id.trim().is_empty() {
            return Err(SdkError::InvalidArgument("receipt id is empty".to_string()));
        }
        let token = self.ensure_token(config, user).await?;
        self.capture.receipt(receipt_id, &token).await
    }

    /// End the user session. The configuration and stored keys are kept.
    pub async fn logout(&mut self) -> LogoutOutcome {
        let user = match &mut self.state {
            ClientState::Configured { user, .. } => user.take(),
            ClientState::Unconfigured => None,
        };
        match user {
            Some(user) => {
                // A user whose token exchange failed has nothing to drop.
                if self.auth.is_authenticated().await {
                    self.auth.logout().await;
                }
                tracing::info!(user_id = %user.user_id, "User session closed");
                LogoutOutcome::LoggedOut {
                    address: user.address,
                }
            }
            None => self.auth.logout().await,
        }
    }

    fn require_config(&self, operation: &'static str) -> SdkResult<&Config> {
        self.config()
            .ok_or_else(|| precondition_failed(operation, SdkError::ConfigurationMissing))
    }

    fn require_user(&self, operation: &'static str) -> SdkResult<(&Config, &UserSession)> {
        match &self.state {
            ClientState::Configured {
                config,
                user: Some(user),
            } => Ok((config, user)),
            ClientState::Configured { user: None, .. } => {
                Err(precondition_failed(operation, SdkError::UserNotInitialized))
            }
            ClientState::Unconfigured => {
                Err(precondition_failed(operation, SdkError::ConfigurationMissing))
            }
        }
    }

    fn require_key(&self, config: &Config, user: &UserSession) -> SdkResult<StoredKey> {
        self.keys
            .get(&config.provider_id, &user.user_id)?
            .ok_or_else(|| {
                precondition_failed(
                    "load_key",
                    SdkError::KeyNotFound {
                        provider_id: config.provider_id.clone(),
                        user_id: user.user_id.clone(),
                    },
                )
            })
    }

    /// Cached token for the user, or a fresh one from a new signature.
    async fn ensure_token(&self, config: &Config, user: &UserSession) -> SdkResult<AddressToken> {
        if let Some(token) = self
            .auth
            .current_token(&config.provider_id, &user.address)
            .await
        {
            return Ok(token);
        }

        let stored = self.require_key(config, user)?;
        let signature = crypto::sign(user.address.as_bytes(), &stored.key_pair);
        self.auth
            .get_token(&config.provider_id, &signature, &config.scopes, &user.address)
            .await
    }
}

fn precondition_failed(operation: &'static str, error: SdkError) -> SdkError {
    tracing::warn!(operation, code = error.error_code(), "{error}");
    error
}
