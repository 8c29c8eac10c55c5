// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Camera capture and receipt upload, supplied by the host application.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::AddressToken;
use crate::error::SdkResult;

/// Capture backend.
///
/// The client only calls [`ReceiptCapture::publish`] after a successful
/// guard check, and always passes the token of the current user.
#[async_trait]
pub trait ReceiptCapture: Send + Sync {
    /// Open the camera and return a base64 image, or `None` if the user
    /// cancelled.
    async fn scan(&self) -> SdkResult<Option<String>>;

    /// Upload base64 images. Returns the receipt id assigned to the upload.
    async fn publish(&self, images: &[String], token: &AddressToken) -> SdkResult<Option<String>>;

    /// Fetch extracted data for a receipt id.
    async fn receipt(
        &self,
        receipt_id: &str,
        token: &AddressToken,
    ) -> SdkResult<Option<Vec<ReceiptResponse>>>;
}

/// Extracted receipt data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
    /// Purchase date as printed, ISO 8601 when the service can parse it
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
}

/// One line item on a receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
}
