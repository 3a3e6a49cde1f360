//! Payment-method listing request/response models.
//!
//! This endpoint predates the rest of the gateway's v2 API and uses
//! all-lowercase field names; the renames below are deliberate.

use serde::{Deserialize, Serialize};

/// Wire form of the payment-method listing request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PaymentMethodRequest {
    /// Merchant code from configuration.
    #[serde(rename = "merchantcode")]
    pub(crate) merchant_code: String,
    /// Order amount the fees are quoted for, in whole Rupiah.
    pub(crate) amount: i64,
    /// Request timestamp, `YYYY-MM-DD HH:MM:SS` — the exact literal
    /// the signature was computed over.
    pub(crate) datetime: String,
    /// SHA-256 listing signature.
    pub(crate) signature: String,
}

/// Response body of the payment-method listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodResponse {
    /// Methods available for the quoted amount.
    #[serde(default)]
    pub payment_fee: Vec<PaymentMethod>,
    /// Listing outcome code; "00" means success.
    pub response_code: String,
    /// Gateway message accompanying the code.
    pub response_message: String,
}

/// One payment method offered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    /// Method code to pass when creating a transaction (e.g. `SP`).
    pub payment_method: String,
    /// Customer-facing method name.
    pub payment_name: String,
    /// Logo URL.
    #[serde(default)]
    pub payment_image: Option<String>,
    /// Total fee for this method, as a string.
    pub total_fee: String,
}
