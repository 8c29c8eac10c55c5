// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! License requests and their signatures.
//!
//! The signature covers the canonical JSON of [`UnsignedLicense`]:
//!
//! ```text
//! {"ptr":..,"tags":[..],"uses":[{"usecases":[..],"destinations":[..]}],
//!  "description":..,"origin":..,"expiry":"2027-01-01T00:00:00.000Z","terms":..}
//! ```
//!
//! compact, keys in exactly that order, `expiry` omitted when unset and
//! formatted as RFC 3339 UTC with millisecond precision when set.

use chrono::{DateTime, Utc};
use k256::ecdsa::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::crypto::{self, Address, CryptoError, KeyPair, Signature};

/// Tag applied to receipt licenses unless overridden.
pub const DEFAULT_TAG: &str = "purchase_history";

/// Description applied to receipt licenses unless overridden.
pub const DEFAULT_DESCRIPTION: &str =
    "Receipt data captured in-app, licensed for attribution and analytics.";

/// One permitted use: what the data is for and where it may go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseUse {
    pub usecases: Vec<String>,
    pub destinations: Vec<String>,
}

impl LicenseUse {
    pub fn new<U, D>(usecases: U, destinations: D) -> Self
    where
        U: IntoIterator,
        U::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            usecases: usecases.into_iter().map(Into::into).collect(),
            destinations: destinations.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for LicenseUse {
    /// Attribution to any destination.
    fn default() -> Self {
        Self::new(["attribution"], ["*"])
    }
}

/// The signed portion of a license request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedLicense {
    /// Pointer to the data subject (the user id)
    pub ptr: String,
    pub tags: Vec<String>,
    pub uses: Vec<LicenseUse>,
    pub description: String,
    /// Application id the license originates from
    pub origin: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "millis_rfc3339"
    )]
    pub expiry: Option<DateTime<Utc>>,
    pub terms: String,
}

impl UnsignedLicense {
    /// The exact bytes the signature covers.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        crypto::canonical_json(self)
    }

    pub fn sign(self, key_pair: &KeyPair) -> Result<LicenseRequest, CryptoError> {
        let signature = crypto::sign_json(&self, key_pair)?;
        Ok(LicenseRequest {
            license: self,
            signature,
        })
    }
}

/// A signed license request, as submitted to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRequest {
    #[serde(flatten)]
    pub license: UnsignedLicense,
    pub signature: Signature,
}

impl LicenseRequest {
    /// Check the signature against a public key.
    pub fn verify(&self, verifying_key: &VerifyingKey) -> Result<(), CryptoError> {
        let bytes = self.license.canonical_bytes()?;
        crypto::verify(&bytes, &self.signature, verifying_key)
    }

    /// Check the signature was made by the key behind `address`.
    pub fn verify_signer(
        &self,
        verifying_key: &VerifyingKey,
        address: &Address,
    ) -> Result<(), CryptoError> {
        let point = verifying_key.to_encoded_point(false);
        let derived = Address::from_public_key_sec1(point.as_bytes());
        if &derived != address {
            return Err(CryptoError::InvalidAddress(format!(
                "key address {derived} does not match {address}"
            )));
        }
        self.verify(verifying_key)
    }
}

/// Builder for [`UnsignedLicense`] with receipt defaults.
#[derive(Debug, Clone)]
pub struct LicenseRequestBuilder {
    license: UnsignedLicense,
}

impl LicenseRequestBuilder {
    pub fn new(ptr: impl Into<String>, origin: impl Into<String>, terms: impl Into<String>) -> Self {
        Self {
            license: UnsignedLicense {
                ptr: ptr.into(),
                tags: vec![DEFAULT_TAG.to_string()],
                uses: vec![LicenseUse::default()],
                description: DEFAULT_DESCRIPTION.to_string(),
                origin: origin.into(),
                expiry: None,
                terms: terms.into(),
            },
        }
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.license.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn uses(mut self, uses: Vec<LicenseUse>) -> Self {
        self.license.uses = uses;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.license.description = description.into();
        self
    }

    pub fn expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.license.expiry = Some(expiry);
        self
    }

    pub fn build(self) -> UnsignedLicense {
        self.license
    }
}

mod millis_rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}
