// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! secp256k1 key pairs for user identities.
//!
//! Keys are generated with the OS RNG and persisted by the key store as
//! PKCS#8 PEM. The public half is shared with the service as a base64
//! DER `SubjectPublicKeyInfo`.

use base64ct::{Base64, Encoding};
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::zeroize::Zeroizing;
use k256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;

use super::CryptoError;

/// Algorithm label recorded next to every stored key.
pub const KEY_ALGORITHM: &str = "ecdsa-secp256k1-sha256";

/// An asymmetric signing key pair.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a fresh random key pair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Restore a key pair from a PKCS#8 PEM private key.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, CryptoError> {
        let signing_key = SigningKey::from_pkcs8_pem(pem)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// Encode the private key as PKCS#8 PEM (LF line endings).
    pub fn to_pkcs8_pem(&self) -> Result<Zeroizing<String>, CryptoError> {
        self.signing_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::Encoding(e.to_string()))
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Uncompressed SEC1 public point (65 bytes: 0x04 || x || y).
    pub fn public_key_sec1(&self) -> Vec<u8> {
        self.verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }

    /// DER `SubjectPublicKeyInfo` encoding of the public key.
    pub fn public_key_der(&self) -> Result<Vec<u8>, CryptoError> {
        let document = self
            .verifying_key()
            .to_public_key_der()
            .map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Ok(document.as_bytes().to_vec())
    }

    /// Standard base64 of [`public_key_der`](Self::public_key_der).
    pub fn public_key_base64(&self) -> Result<String, CryptoError> {
        Ok(Base64::encode_string(&self.public_key_der()?))
    }
}

/// Parse a base64 DER `SubjectPublicKeyInfo` back into a verifying key.
pub fn decode_public_key(encoded: &str) -> Result<VerifyingKey, CryptoError> {
    let der = Base64::decode_vec(encoded)
        .map_err(|e| CryptoError::InvalidPublicKey(format!("Invalid base64: {e}")))?;
    VerifyingKey::from_public_key_der(&der).map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.signing_key == other.signing_key
    }
}

impl Eq for KeyPair {}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &KEY_ALGORITHM)
            .field("public_key", &Base64::encode_string(&self.public_key_sec1()))
            .finish_non_exhaustive()
    }
}
