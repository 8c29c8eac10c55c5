// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Users authenticate with their on-device key, never with a password.
//!
//! ## Auth Flow
//!
//! 1. On first use the client registers the user's address (public key
//!    digest) under the provider, authorised by the provider's public key
//! 2. The client signs the raw address bytes with the user's private key
//! 3. The signature is exchanged at the token endpoint
//!    (`client_id = addr:{provider}:{address}`, `client_secret = signature`)
//! 4. The returned bearer token is cached in memory until expiry or logout
//!
//! ## Security
//!
//! - Private keys never leave the device
//! - Tokens are held in memory only and are not logged

pub mod session;
pub mod token;

pub use session::{AddressRegistration, AuthSession, LogoutOutcome, PROVIDER_KEY_HEADER};
pub use token::{AddressToken, TokenResponse};

/// Address registration endpoint.
pub const REGISTER_PATH: &str = "api/latest/registry/addresses";

/// Token exchange endpoint.
pub const TOKEN_PATH: &str = "api/latest/auth/token";
