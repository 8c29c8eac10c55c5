// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Address registration and token exchange.
//!
//! ```text
//! Unauthenticated --(register_address, get_token)--> Authenticated
//! Authenticated   --(logout | failed get_token)-->   Unauthenticated
//! ```

use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde::Serialize;
use tokio::sync::RwLock;

use super::token::{AddressToken, TokenResponse};
use super::{REGISTER_PATH, TOKEN_PATH};
use crate::crypto::{Address, Signature};
use crate::error::{SdkError, SdkResult};
use crate::http::ApiClient;

/// Header carrying the provider's service-side key on registration.
pub const PROVIDER_KEY_HEADER: &str = "X-Provider-Key";

/// Body of an address registration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRegistration {
    pub provider_id: String,
    pub user_id: String,
    pub address: Address,
    /// Base64 DER public key of the user
    pub public_key: String,
    /// Signature over the raw address bytes, proving key possession
    pub signature: Signature,
}

#[derive(Debug, Serialize)]
struct TokenForm<'a> {
    grant_type: &'a str,
    client_id: String,
    client_secret: String,
    scope: String,
}

/// Result of a logout call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut { address: Address },
    NoActiveSession,
}

#[derive(Debug, Clone)]
enum SessionState {
    Unauthenticated,
    Authenticated {
        provider_id: String,
        address: Address,
        token: AddressToken,
    },
}

/// Token cache and auth calls for the current user.
#[derive(Clone)]
pub struct AuthSession {
    api: ApiClient,
    state: Arc<RwLock<SessionState>>,
}

impl AuthSession {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(SessionState::Unauthenticated)),
        }
    }

    /// Tell the service about a newly minted address.
    pub async fn register_address(
        &self,
        provider_public_key: &str,
        registration: &AddressRegistration,
    ) -> SdkResult<()> {
        let request = self
            .api
            .request(Method::POST, REGISTER_PATH)?
            .header(PROVIDER_KEY_HEADER, provider_public_key)
            .json(registration);
        self.api.send_empty(request).await?;

        tracing::info!(
            provider_id = %registration.provider_id,
            user_id = %registration.user_id,
            address = %registration.address,
            "Registered user address"
        );
        Ok(())
    }

    /// Exchange a signed address for a bearer token.
    ///
    /// On any failure the session drops back to `Unauthenticated`.
    pub async fn get_token(
        &self,
        provider_id: &str,
        signature: &Signature,
        scopes: &[String],
        address: &Address,
    ) -> SdkResult<AddressToken> {
        let form = TokenForm {
            grant_type: "client_credentials",
            client_id: format!("addr:{provider_id}:{address}"),
            client_secret: signature.to_base64(),
            scope: scopes.join(" "),
        };

        let result = match self.api.post_form::<_, TokenResponse>(TOKEN_PATH, &form).await {
            Ok(response) => AddressToken::from_response(response, scopes, Utc::now()),
            Err(e) => Err(SdkError::Network(e)),
        };

        let mut state = self.state.write().await;
        match result {
            Ok(token) => {
                *state = SessionState::Authenticated {
                    provider_id: provider_id.to_string(),
                    address: *address,
                    token: token.clone(),
                };
                tracing::debug!(%provider_id, %address, scopes = ?token.scopes, "Obtained address token");
                Ok(token)
            }
            Err(e) => {
                *state = SessionState::Unauthenticated;
                tracing::warn!(%provider_id, %address, error = %e, "Token request failed");
                Err(e)
            }
        }
    }

    /// Cached token for `address`, if present and not expired.
    pub async fn current_token(&self, provider_id: &str, address: &Address) -> Option<AddressToken> {
        let state = self.state.read().await;
        match &*state {
            SessionState::Authenticated {
                provider_id: current_provider,
                address: current,
                token,
            } if current_provider == provider_id && current == address && !token.is_expired() => {
                Some(token.clone())
            }
            _ => None,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.state.read().await, SessionState::Authenticated { .. })
    }

    /// Drop the cached token. Safe to call repeatedly.
    pub async fn logout(&self) -> LogoutOutcome {
        let mut state = self.state.write().await;
        match std::mem::replace(&mut *state, SessionState::Unauthenticated) {
            SessionState::Authenticated { address, .. } => {
                tracing::info!(%address, "Logged out");
                LogoutOutcome::LoggedOut { address }
            }
            SessionState::Unauthenticated => {
                tracing::warn!("Logout requested but no user logged in");
                LogoutOutcome::NoActiveSession
            }
        }
    }
}
