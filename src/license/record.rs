// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! License records and guard checks as returned by the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::LicenseUse;
use crate::error::{SdkError, SdkResult};

/// A license stored by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub id: String,
    pub ptr: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub uses: Vec<LicenseUse>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub terms: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl LicenseRecord {
    /// True if the license has an expiry at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now)
    }
}

/// Asks whether a license covers the given uses for a data subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardRequest {
    pub ptr: String,
    pub uses: Vec<LicenseUse>,
}

impl GuardRequest {
    pub fn new(ptr: impl Into<String>, uses: Vec<LicenseUse>) -> Self {
        Self {
            ptr: ptr.into(),
            uses,
        }
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardResult {
    #[serde(alias = "success")]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GuardResult {
    /// Fail closed: anything but `verified == true` is an error.
    pub fn ensure_verified(&self) -> SdkResult<()> {
        if self.verified {
            return Ok(());
        }
        Err(SdkError::LicenseNotVerified {
            reason: self
                .reason
                .clone()
                .unwrap_or_else(|| "no active license covers this use".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn record_tolerates_sparse_response() {
        let record: LicenseRecord =
            serde_json::from_value(json!({ "id": "lic-1", "ptr": "u1" })).unwrap();
        assert_eq!(record.id, "lic-1");
        assert!(record.uses.is_empty());
        assert!(!record.is_expired_at(Utc::now()));
    }

    #[test]
    fn record_expiry_is_checked() {
        let now = Utc::now();
        let record = LicenseRecord {
            id: "lic".into(),
            ptr: "u1".into(),
            tags: vec![],
            uses: vec![],
            description: String::new(),
            origin: String::new(),
            expiry: Some(now - Duration::seconds(1)),
            terms: String::new(),
            signature: None,
            created: None,
        };
        assert!(record.is_expired_at(now));
    }

    #[test]
    fn guard_result_accepts_success_alias() {
        let result: GuardResult = serde_json::from_value(json!({ "success": true })).unwrap();
        assert!(result.verified);
        result.ensure_verified().unwrap();
    }

    #[test]
    fn unverified_guard_fails_closed() {
        let result: GuardResult =
            serde_json::from_value(json!({ "verified": false, "reason": "expired" })).unwrap();
        match result.ensure_verified() {
            Err(SdkError::LicenseNotVerified { reason }) => assert_eq!(reason, "expired"),
            other => panic!("unexpected: {other:?}"),
        }

        let bare = GuardResult {
            verified: false,
            reason: None,
        };
        assert!(matches!(
            bare.ensure_verified(),
            Err(SdkError::LicenseNotVerified { .. })
        ));
    }

    #[test]
    fn guard_request_wire_shape() {
        let request = GuardRequest::new("u1", vec![LicenseUse::default()]);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "ptr": "u1", "uses": [{ "usecases": ["attribution"], "destinations": ["*"] }] })
        );
    }
}
