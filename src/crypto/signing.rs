// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ECDSA signing over secp256k1 with SHA-256.
//!
//! Nonces follow RFC 6979, so signing the same message with the same key
//! always yields the same signature. Signatures are low-S normalised and
//! travel as the 64-byte compact `r || s` form in standard padded base64.
//!
//! ## Canonical JSON
//!
//! Structured payloads are signed over their `serde_json` compact output:
//! no whitespace, object keys in struct declaration order, skipped `None`
//! fields absent, and `serde_json`'s default escaping (only `"`, `\` and
//! control characters are escaped; non-ASCII is emitted as raw UTF-8). The
//! verifying side must rebuild exactly these bytes.

use std::fmt;

use base64ct::{Base64, Encoding};
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::VerifyingKey;
use serde::{Deserialize, Serialize};

use super::{CryptoError, KeyPair};

/// Length in bytes of a compact signature.
pub const SIGNATURE_LEN: usize = 64;

/// A compact ECDSA signature.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Signature(k256::ecdsa::Signature);

impl Signature {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        k256::ecdsa::Signature::from_slice(bytes)
            .map(Self)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    pub fn to_base64(&self) -> String {
        Base64::encode_string(&self.to_bytes())
    }

    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = Base64::decode_vec(encoded)
            .map_err(|e| CryptoError::InvalidSignature(format!("Invalid base64: {e}")))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_base64())
    }
}

impl From<Signature> for String {
    fn from(signature: Signature) -> Self {
        signature.to_base64()
    }
}

impl TryFrom<String> for Signature {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Signature::from_base64(&value)
    }
}

/// Sign raw message bytes.
pub fn sign(message: &[u8], key_pair: &KeyPair) -> Signature {
    Signature(key_pair.signing_key().sign(message))
}

/// Verify a signature against a public key.
pub fn verify(
    message: &[u8],
    signature: &Signature,
    verifying_key: &VerifyingKey,
) -> Result<(), CryptoError> {
    verifying_key
        .verify(message, &signature.0)
        .map_err(|_| CryptoError::VerificationFailed)
}

/// The exact bytes that get signed for a structured payload.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CryptoError> {
    Ok(serde_json::to_vec(value)?)
}

/// Sign the canonical JSON form of `value`.
pub fn sign_json<T: Serialize + ?Sized>(
    value: &T,
    key_pair: &KeyPair,
) -> Result<Signature, CryptoError> {
    let bytes = canonical_json(value)?;
    Ok(sign(&bytes, key_pair))
}
