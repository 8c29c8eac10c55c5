// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer tokens issued for a signed address.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SdkError;

/// Tokens this close to expiry are treated as expired.
pub const EXPIRY_SKEW_SECS: i64 = 30;

/// OAuth-style token endpoint response.
///
/// Every field is optional so a malformed response is reported as a token
/// failure rather than a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Space-separated granted scopes
    #[serde(default)]
    pub scope: Option<String>,
}

/// A bearer token bound to one address.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressToken {
    pub token: String,
    pub token_type: String,
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl AddressToken {
    /// Build a token from a service response.
    ///
    /// A missing or blank `access_token` is a [`SdkError::TokenIssuance`].
    /// Granted scopes fall back to the requested ones when the service does
    /// not echo them.
    pub fn from_response(
        response: TokenResponse,
        requested_scopes: &[String],
        now: DateTime<Utc>,
    ) -> Result<Self, SdkError> {
        let token = response
            .access_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SdkError::TokenIssuance("response contained no access token".to_string()))?;

        let scopes = match response.scope {
            Some(scope) if !scope.trim().is_empty() => {
                scope.split_whitespace().map(str::to_string).collect()
            }
            _ => requested_scopes.to_vec(),
        };

        Ok(Self {
            token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            scopes,
            expiry: response.expires_in.and_then(|secs| expiry_after(now, secs)),
        })
    }

    /// True once the token is within the expiry skew of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => now + Duration::seconds(EXPIRY_SKEW_SECS) >= expiry,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// `now + secs`, with negative lifetimes clamped to zero.
///
/// A lifetime past the representable date range is treated as no expiry.
fn expiry_after(now: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    let expiry = Duration::try_seconds(secs.max(0))
        .and_then(|lifetime| now.checked_add_signed(lifetime));
    if expiry.is_none() {
        tracing::warn!(expires_in = secs, "Token lifetime out of range, treating as non-expiring");
    }
    expiry
}

// Never print the bearer value.
impl std::fmt::Debug for AddressToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressToken")
            .field("token_type", &self.token_type)
            .field("scopes", &self.scopes)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes() -> Vec<String> {
        vec!["trail".to_string(), "publish".to_string()]
    }

    #[test]
    fn builds_token_with_expiry() {
        let now = Utc::now();
        let token = AddressToken::from_response(
            TokenResponse {
                access_token: Some("abc".into()),
                token_type: Some("Bearer".into()),
                expires_in: Some(600),
                scope: Some("trail publish".into()),
            },
            &scopes(),
            now,
        )
        .unwrap();

        assert_eq!(token.token, "abc");
        assert_eq!(token.scopes, scopes());
        assert_eq!(token.expiry, Some(now + Duration::seconds(600)));
        assert!(!token.is_expired_at(now));
        assert!(token.is_expired_at(now + Duration::seconds(580)));
    }

    #[test]
    fn missing_token_is_issuance_failure() {
        let result = AddressToken::from_response(TokenResponse::default(), &scopes(), Utc::now());
        assert!(matches!(result, Err(SdkError::TokenIssuance(_))));

        let blank = TokenResponse {
            access_token: Some("   ".into()),
            ..Default::default()
        };
        assert!(matches!(
            AddressToken::from_response(blank, &scopes(), Utc::now()),
            Err(SdkError::TokenIssuance(_))
        ));
    }

    #[test]
    fn falls_back_to_requested_scopes() {
        let token = AddressToken::from_response(
            TokenResponse {
                access_token: Some("abc".into()),
                ..Default::default()
            },
            &scopes(),
            Utc::now(),
        )
        .unwrap();
        assert!(token.has_scope("publish"));
        assert_eq!(token.token_type, "Bearer");
        assert!(token.expiry.is_none());
        assert!(!token.is_expired());
    }

    fn with_lifetime(expires_in: i64, now: DateTime<Utc>) -> AddressToken {
        AddressToken::from_response(
            TokenResponse {
                access_token: Some("abc".into()),
                expires_in: Some(expires_in),
                ..Default::default()
            },
            &scopes(),
            now,
        )
        .unwrap()
    }

    #[test]
    fn huge_lifetime_does_not_overflow() {
        let now = Utc::now();
        for expires_in in [i64::MAX, 9_000_000_000_000] {
            let token = with_lifetime(expires_in, now);
            assert!(token.expiry.is_none());
            assert!(!token.is_expired_at(now));
        }
    }

    #[test]
    fn negative_lifetime_is_already_expired() {
        let now = Utc::now();
        for expires_in in [-5, i64::MIN] {
            let token = with_lifetime(expires_in, now);
            assert_eq!(token.expiry, Some(now));
            assert!(token.is_expired_at(now));
        }
    }

    #[test]
    fn debug_hides_bearer_value() {
        let token = AddressToken {
            token: "super-secret".into(),
            token_type: "Bearer".into(),
            scopes: scopes(),
            expiry: None,
        };
        assert!(!format!("{token:?}").contains("super-secret"));
    }
}
