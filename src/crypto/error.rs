// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Errors raised by key handling and signing.

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),

    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("key encoding failed: {0}")]
    Encoding(String),

    #[error("canonical serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
