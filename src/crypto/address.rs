// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Address derivation.
//!
//! An address is derived by:
//! 1. Taking the uncompressed public key (65 bytes: 0x04 || x || y)
//! 2. Hashing it with SHA-256
//! 3. Using all 32 digest bytes as the address
//!
//! The transport form is base64url without padding (43 characters).

use std::fmt;

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{CryptoError, KeyPair};

/// Length in bytes of a derived address.
pub const ADDRESS_LEN: usize = 32;

/// A user address derived from a public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Address([u8; ADDRESS_LEN]);

/// Derive the address of a key pair.
pub fn derive(key_pair: &KeyPair) -> Address {
    Address::from_public_key_sec1(&key_pair.public_key_sec1())
}

impl Address {
    /// Hash an uncompressed SEC1 public point into an address.
    pub fn from_public_key_sec1(point: &[u8]) -> Self {
        Self(Sha256::digest(point).into())
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// base64url, no padding.
    pub fn encode(&self) -> String {
        Base64UrlUnpadded::encode_string(&self.0)
    }

    pub fn decode(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = Base64UrlUnpadded::decode_vec(encoded)
            .map_err(|e| CryptoError::InvalidAddress(format!("Invalid base64url: {e}")))?;
        let bytes: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            CryptoError::InvalidAddress(format!("expected {ADDRESS_LEN} bytes, got {}", b.len()))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.encode()
    }
}

impl TryFrom<String> for Address {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::decode(&value)
    }
}
