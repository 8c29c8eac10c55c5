// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! License service calls.

use super::record::{GuardRequest, GuardResult, LicenseRecord};
use super::request::LicenseRequest;
use super::{GUARD_PATH, LICENSE_PATH};
use crate::auth::AddressToken;
use crate::error::{SdkError, SdkResult};
use crate::http::ApiClient;

/// Submits, fetches, and checks licenses for an authenticated address.
#[derive(Debug, Clone)]
pub struct LicenseManager {
    api: ApiClient,
}

impl LicenseManager {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Submit a signed license request.
    pub async fn create(
        &self,
        token: &AddressToken,
        request: &LicenseRequest,
    ) -> SdkResult<LicenseRecord> {
        let record: LicenseRecord = self
            .api
            .post_json(LICENSE_PATH, request, Some(token.token.as_str()))
            .await?;

        tracing::info!(
            license_id = %record.id,
            ptr = %record.ptr,
            origin = %record.origin,
            "Created license"
        );
        Ok(record)
    }

    /// Fetch one license by id.
    pub async fn get(&self, id: &str, token: &AddressToken) -> SdkResult<LicenseRecord> {
        validate_license_id(id)?;
        let path = format!("{LICENSE_PATH}/{id}");
        let record = self.api.get_json(&path, Some(token.token.as_str())).await?;
        Ok(record)
    }

    /// Ask the service whether an active license covers `request`.
    ///
    /// Returns the raw result; callers gating a publish should use
    /// [`GuardResult::ensure_verified`].
    pub async fn guard(&self, request: &GuardRequest, token: &AddressToken) -> SdkResult<GuardResult> {
        let result: GuardResult = self
            .api
            .post_json(GUARD_PATH, request, Some(token.token.as_str()))
            .await?;

        tracing::debug!(
            ptr = %request.ptr,
            verified = result.verified,
            reason = result.reason.as_deref().unwrap_or(""),
            "Guard check"
        );
        Ok(result)
    }

    /// Render license terms. See [`super::terms::terms`].
    pub fn terms(company_name: &str, jurisdiction: &str, tos_url: &str, privacy_url: &str) -> String {
        super::terms::terms(company_name, jurisdiction, tos_url, privacy_url)
    }
}

// Ids go straight into the URL path, so only unreserved characters pass.
fn validate_license_id(id: &str) -> SdkResult<()> {
    if id.is_empty() {
        return Err(SdkError::InvalidArgument("license id is empty".to_string()));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
    {
        return Err(SdkError::InvalidArgument(format!(
            "license id contains invalid characters: {id:?}"
        )));
    }
    Ok(())
}
