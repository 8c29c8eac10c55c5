// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Data-usage licenses.
//!
//! A license is built on the device, signed with the user's key over its
//! canonical JSON form, and submitted to the service. Before any receipt
//! data is published the service is asked (the "guard" call) whether an
//! active license covers the intended use; anything but an explicit
//! `verified: true` blocks the publish.

pub mod manager;
pub mod record;
pub mod request;
pub mod terms;

pub use manager::LicenseManager;
pub use record::{GuardRequest, GuardResult, LicenseRecord};
pub use request::{
    LicenseRequest, LicenseRequestBuilder, LicenseUse, UnsignedLicense, DEFAULT_DESCRIPTION,
    DEFAULT_TAG,
};
pub use terms::terms;

/// License submission endpoint; `/{id}` fetches one license.
pub const LICENSE_PATH: &str = "api/latest/trail/license";

/// Guard (license verification) endpoint.
pub const GUARD_PATH: &str = "api/latest/trail/guard";
