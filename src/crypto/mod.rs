// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! On-device identity cryptography.
//!
//! - `keypair` - secp256k1 key generation and PKCS#8 PEM encoding
//! - `address` - address derivation from the public key
//! - `signing` - ECDSA signatures and canonical JSON signing
//!
//! Private keys never leave this module except as PEM for the key store.

pub mod address;
pub mod error;
pub mod keypair;
pub mod signing;

pub use address::{derive, Address};
pub use error::CryptoError;
pub use keypair::{decode_public_key, KeyPair, KEY_ALGORITHM};
pub use signing::{canonical_json, sign, sign_json, verify, Signature};
