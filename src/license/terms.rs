// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Legal terms embedded in every license.

/// Render the terms text for a company.
///
/// Pure templating. The rendered text is part of the signed license, so the
/// template must not change between releases without a matching server
/// update.
pub fn terms(company_name: &str, jurisdiction: &str, tos_url: &str, privacy_url: &str) -> String {
    format!(
        "{company_name} (\"Company\"), operating under the laws of {jurisdiction}, \
is granted a license to the receipt data you share through this application \
for the uses and destinations listed in this license. \
The license remains valid until its expiry or until you revoke it. \
Your use of the application is governed by the Terms of Service at {tos_url} \
and your data is handled as described in the Privacy Policy at {privacy_url}."
    )
}
