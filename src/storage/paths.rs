// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the on-device key storage layout.
//!
//! Provider and user identifiers are NFC-normalised and base64url-encoded
//! before they become path components, so two different identifier pairs
//! can never map to the same directory and no identifier can walk out of
//! the storage root.

use std::path::{Path, PathBuf};

use base64ct::{Base64UrlUnpadded, Encoding};
use unicode_normalization::UnicodeNormalization;

/// Directory name appended to the platform data directory.
pub const DATA_DIR_NAME: &str = "receipt-capture-sdk";

/// Fallback root when the platform exposes no local data directory.
pub const FALLBACK_DATA_ROOT: &str = ".receipt-capture-sdk";

/// Storage path utilities for the key store.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        let root = dirs::data_local_dir()
            .map(|dir| dir.join(DATA_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_ROOT));
        Self::new(root)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all SDK data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Key Paths ==========

    /// Directory containing all provider key directories.
    pub fn keys_dir(&self) -> PathBuf {
        self.root.join("keys")
    }

    /// Directory holding the keys of every user of one provider.
    pub fn provider_dir(&self, provider_id: &str) -> PathBuf {
        self.keys_dir().join(path_component(provider_id))
    }

    /// Directory for a specific (provider, user) key record.
    pub fn key_dir(&self, provider_id: &str, user_id: &str) -> PathBuf {
        self.provider_dir(provider_id).join(path_component(user_id))
    }

    /// Path to the key metadata file.
    pub fn key_meta(&self, provider_id: &str, user_id: &str) -> PathBuf {
        self.key_dir(provider_id, user_id).join("meta.json")
    }

    /// Path to the PKCS#8 PEM private key file.
    pub fn key_pem(&self, provider_id: &str, user_id: &str) -> PathBuf {
        self.key_dir(provider_id, user_id).join("key.pem")
    }
}

/// Encode an identifier as a single, collision-free path component.
pub fn path_component(id: &str) -> String {
    let normalized: String = id.nfc().collect();
    Base64UrlUnpadded::encode_string(normalized.as_bytes())
}
