// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Durable Key Storage
//!
//! This module persists user key pairs on the device so they survive
//! process restarts.
//!
//! ## Storage Layout
//!
//! ```text
//! {data_dir}/
//!   keys/{b64url(provider_id)}/{b64url(user_id)}/
//!     meta.json       # Key metadata (provider, user, address, registered)
//!     key.pem         # Private key (NEVER sent over the network)
//! ```
//!
//! ## Important Notes
//!
//! - Private keys are written with owner-only permissions on unix
//! - Writes are atomic (temp file + rename)
//! - Storage failures are returned to the caller, never swallowed

pub mod fs;
pub mod keys;
pub mod paths;

pub use fs::{FileStorage, StorageError, StorageResult};
pub use keys::{KeyId, KeyMetadata, KeyStore, StoredKey};
pub use paths::StoragePaths;
