// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP transport for the receipt/licensing service.
//!
//! A thin request helper over `reqwest`: base URL joining, optional proxy,
//! bearer auth, request ids and JSON decoding. No retries; failures go
//! straight back to the caller.

pub mod client;

pub use client::{ApiClient, HttpError, REQUEST_ID_HEADER};
