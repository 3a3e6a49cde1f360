//! Inbound payment-result callback from the gateway.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::{MerchantOrderId, Reference, TransactionStatus};
use crate::error::Result;
use crate::signature;

/// Payment notification POSTed by the gateway to the merchant's
/// callback URL.
///
/// Must be verified with [`CallbackNotification::verify`] before any
/// field is trusted; an unverified callback can be forged by anyone
/// who knows the callback URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackNotification {
    /// Merchant code the payment belongs to.
    pub merchant_code: String,
    /// Paid amount as the literal string the signature covers.
    pub amount: String,
    /// Merchant-side order id.
    pub merchant_order_id: MerchantOrderId,
    /// Purchase description, echoed back.
    #[serde(default)]
    pub product_detail: Option<String>,
    /// Opaque passthrough from the original request.
    #[serde(default)]
    pub additional_param: Option<String>,
    /// Payment-method code the customer used.
    #[serde(default)]
    pub payment_code: Option<String>,
    /// Payment outcome.
    pub result_code: TransactionStatus,
    /// Merchant-side customer identifier, when supplied.
    #[serde(default)]
    pub merchant_user_id: Option<String>,
    /// Gateway payment reference.
    pub reference: Reference,
    /// Publisher-side order id, for aggregated methods.
    #[serde(default)]
    pub publisher_order_id: Option<String>,
    /// Opaque user hash for e-wallet methods.
    #[serde(default)]
    pub sp_user_hash: Option<String>,
    /// Settlement date, when disclosed.
    #[serde(default)]
    pub settlement_date: Option<String>,
    /// Issuer code for QRIS payments.
    #[serde(default)]
    pub issuer_code: Option<String>,
    /// MD5 callback signature over code + amount + order id + API key.
    pub signature: String,
}

impl CallbackNotification {
    /// Verifies the callback signature against the merchant API key,
    /// failing closed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::DuitkuError::InvalidSignature`] on any
    /// mismatch; the notification must then be rejected outright
    /// (HTTP 401), never partially trusted.
    #[inline]
    pub fn verify(&self, api_key: &SecretString) -> Result<()> {
        signature::verify_callback(
            &self.merchant_code,
            &self.amount,
            self.merchant_order_id.as_inner(),
            api_key,
            &self.signature,
        )
    }
}
