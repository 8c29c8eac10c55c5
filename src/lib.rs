// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Receipt Capture SDK - on-device identity and data licensing
//!
//! This crate lets a host application give each user a device-held
//! secp256k1 identity, authenticate it against the receipt service, sign
//! data-usage licenses, and upload receipts only while a license is active.
//!
//! ## Modules
//!
//! - `client` - Entry point sequencing everything below
//! - `auth` - Address registration and bearer tokens
//! - `license` - License signing, submission, and guard checks
//! - `crypto` - Key pairs, addresses, signatures
//! - `storage` - Durable per-user key storage
//! - `capture` - Camera and upload backend supplied by the host
//! - `http` - Service request helper

pub mod auth;
pub mod capture;
pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod http;
pub mod license;
pub mod logging;
pub mod storage;

pub use auth::{AddressToken, LogoutOutcome};
pub use capture::{ReceiptCapture, ReceiptItem, ReceiptResponse};
pub use client::{ClientState, ReceiptClient, UserSession};
pub use config::{Config, Endpoints};
pub use crypto::{Address, KeyPair, Signature};
pub use error::{SdkError, SdkResult};
pub use license::{GuardResult, LicenseRecord, LicenseRequest};
pub use storage::{FileStorage, KeyStore, StoragePaths};
