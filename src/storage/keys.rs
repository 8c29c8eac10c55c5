// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key store: one key pair per (provider, user).
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/keys/{provider}/{user}/
//!   meta.json       # Key metadata (ids, address, registration state)
//!   key.pem         # Private key (PKCS#8 PEM format, 0600)
//! ```
//!
//! A key is generated on the first `get_or_create` for a pair and written to
//! disk before it is handed out. After that it is only ever read back; the
//! metadata's `registered` flag is the single field that changes.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use super::{FileStorage, StorageError, StorageResult};
use crate::crypto::{self, Address, KeyPair, KEY_ALGORITHM};

/// Composite lookup key for a stored key pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyId {
    pub provider_id: String,
    pub user_id: String,
}

impl KeyId {
    /// Build a key id, rejecting empty identifiers.
    pub fn new(provider_id: &str, user_id: &str) -> StorageResult<Self> {
        if provider_id.trim().is_empty() {
            return Err(StorageError::InvalidKeyId("provider id is empty".to_string()));
        }
        if user_id.trim().is_empty() {
            return Err(StorageError::InvalidKeyId("user id is empty".to_string()));
        }
        Ok(Self {
            provider_id: provider_id.nfc().collect(),
            user_id: user_id.nfc().collect(),
        })
    }
}

/// Key metadata stored in meta.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    pub provider_id: String,
    pub user_id: String,
    /// Address derived from the public key at creation time
    pub address: Address,
    pub algorithm: String,
    pub created_at: DateTime<Utc>,
    /// Whether the address has been registered with the service
    #[serde(default)]
    pub registered: bool,
}

/// A key pair together with its metadata.
#[derive(Debug, Clone)]
pub struct StoredKey {
    pub key_pair: KeyPair,
    pub metadata: KeyMetadata,
    /// True only for the call that generated the key
    pub created: bool,
}

impl StoredKey {
    pub fn address(&self) -> Address {
        crypto::derive(&self.key_pair)
    }
}

/// Durable key store with an in-memory read cache.
pub struct KeyStore {
    storage: FileStorage,
    cache: RwLock<HashMap<KeyId, (KeyPair, KeyMetadata)>>,
}

impl KeyStore {
    pub fn new(storage: FileStorage) -> Self {
        Self {
            storage,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Get the key for a pair, generating and persisting one if absent.
    pub fn get_or_create(&self, provider_id: &str, user_id: &str) -> StorageResult<StoredKey> {
        let id = KeyId::new(provider_id, user_id)?;
        if let Some(existing) = self.load(&id)? {
            return Ok(existing);
        }

        let key_pair = KeyPair::generate();
        let metadata = KeyMetadata {
            provider_id: id.provider_id.clone(),
            user_id: id.user_id.clone(),
            address: crypto::derive(&key_pair),
            algorithm: KEY_ALGORITHM.to_string(),
            created_at: Utc::now(),
            registered: false,
        };

        let pem = key_pair
            .to_pkcs8_pem()
            .map_err(|e| StorageError::Corrupted(e.to_string()))?;

        // Key first: a metadata file never points at a missing key. An
        // existing key file is never replaced.
        let paths = self.storage.paths();
        self.storage
            .write_secret_new(paths.key_pem(&id.provider_id, &id.user_id), pem.as_bytes())?;
        self.storage
            .write_json(paths.key_meta(&id.provider_id, &id.user_id), &metadata)?;

        tracing::info!(
            provider_id = %id.provider_id,
            user_id = %id.user_id,
            address = %metadata.address,
            "Generated new user key pair"
        );

        self.cache_insert(id, &key_pair, &metadata);
        Ok(StoredKey {
            key_pair,
            metadata,
            created: true,
        })
    }

    /// Get the key for a pair if one has been created.
    pub fn get(&self, provider_id: &str, user_id: &str) -> StorageResult<Option<StoredKey>> {
        let id = KeyId::new(provider_id, user_id)?;
        self.load(&id)
    }

    /// Record that the pair's address is registered with the service.
    pub fn mark_registered(&self, provider_id: &str, user_id: &str) -> StorageResult<()> {
        let id = KeyId::new(provider_id, user_id)?;
        let mut stored = self
            .load(&id)?
            .ok_or_else(|| StorageError::NotFound(format!("Key {provider_id}/{user_id}")))?;

        if stored.metadata.registered {
            return Ok(());
        }
        stored.metadata.registered = true;
        self.storage.write_json(
            self.storage.paths().key_meta(&id.provider_id, &id.user_id),
            &stored.metadata,
        )?;
        self.cache_insert(id, &stored.key_pair, &stored.metadata);
        Ok(())
    }

    /// Permanently delete a pair's key material.
    ///
    /// **Warning**: a deleted key cannot be recovered; licenses signed with it
    /// stay attributed to the old address.
    pub fn delete(&self, provider_id: &str, user_id: &str) -> StorageResult<()> {
        let id = KeyId::new(provider_id, user_id)?;
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(&id);
        }
        self.storage
            .delete_dir(self.storage.paths().key_dir(&id.provider_id, &id.user_id))
    }

    fn load(&self, id: &KeyId) -> StorageResult<Option<StoredKey>> {
        if let Ok(cache) = self.cache.read() {
            if let Some((key_pair, metadata)) = cache.get(id) {
                return Ok(Some(StoredKey {
                    key_pair: key_pair.clone(),
                    metadata: metadata.clone(),
                    created: false,
                }));
            }
        }

        let paths = self.storage.paths();
        let pem_path = paths.key_pem(&id.provider_id, &id.user_id);
        if !self.storage.exists(&pem_path)? {
            return Ok(None);
        }

        let pem_bytes = self.storage.read_raw(&pem_path)?;
        let pem = std::str::from_utf8(&pem_bytes)
            .map_err(|e| StorageError::Corrupted(format!("Invalid UTF-8 in key file: {e}")))?;
        let key_pair =
            KeyPair::from_pkcs8_pem(pem).map_err(|e| StorageError::Corrupted(e.to_string()))?;

        let address = crypto::derive(&key_pair);
        let meta_path = paths.key_meta(&id.provider_id, &id.user_id);
        let metadata = match self.storage.read_json::<KeyMetadata>(&meta_path) {
            Ok(metadata) if metadata.address == address => metadata,
            Ok(metadata) => {
                return Err(StorageError::Corrupted(format!(
                    "metadata address {} does not match key address {address}",
                    metadata.address
                )));
            }
            // Crash between the key and metadata writes; rebuild it.
            Err(StorageError::NotFound(_)) => {
                tracing::warn!(
                    provider_id = %id.provider_id,
                    user_id = %id.user_id,
                    "Key metadata missing, rebuilding"
                );
                let metadata = KeyMetadata {
                    provider_id: id.provider_id.clone(),
                    user_id: id.user_id.clone(),
                    address,
                    algorithm: KEY_ALGORITHM.to_string(),
                    created_at: Utc::now(),
                    registered: false,
                };
                self.storage.write_json(&meta_path, &metadata)?;
                metadata
            }
            Err(e) => return Err(e),
        };

        self.cache_insert(id.clone(), &key_pair, &metadata);
        Ok(Some(StoredKey {
            key_pair,
            metadata,
            created: false,
        }))
    }

    fn cache_insert(&self, id: KeyId, key_pair: &KeyPair, metadata: &KeyMetadata) {
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(id, (key_pair.clone(), metadata.clone()));
        }
    }
}
