// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Errors returned across the client boundary.

use crate::crypto::CryptoError;
use crate::http::HttpError;
use crate::storage::StorageError;

/// Every public client operation returns this error type.
///
/// Precondition failures (`ConfigurationMissing`, `UserNotInitialized`,
/// `KeyNotFound`) are expected in normal app flows; check
/// [`SdkError::is_precondition`] before treating an error as a fault.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    #[error("configuration has not been set")]
    ConfigurationMissing,

    #[error("no user has been initialized")]
    UserNotInitialized,

    #[error("no key found for provider {provider_id} and user {user_id}")]
    KeyNotFound { provider_id: String, user_id: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("network failure: {0}")]
    Network(#[from] HttpError),

    #[error("token issuance failed: {0}")]
    TokenIssuance(String),

    #[error("license not verified: {reason}")]
    LicenseNotVerified { reason: String },

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl SdkError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            SdkError::ConfigurationMissing => "configuration_missing",
            SdkError::UserNotInitialized => "user_not_initialized",
            SdkError::KeyNotFound { .. } => "key_not_found",
            SdkError::InvalidConfig(_) => "invalid_config",
            SdkError::InvalidArgument(_) => "invalid_argument",
            SdkError::Storage(_) => "storage_failure",
            SdkError::Network(_) => "network_failure",
            SdkError::TokenIssuance(_) => "token_issuance_failure",
            SdkError::LicenseNotVerified { .. } => "license_not_verified",
            SdkError::Crypto(_) => "crypto_failure",
        }
    }

    /// True for missing config/user/key: the call did nothing.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SdkError::ConfigurationMissing
                | SdkError::UserNotInitialized
                | SdkError::KeyNotFound { .. }
        )
    }
}

/// Result type for client operations.
pub type SdkResult<T> = Result<T, SdkError>;
