//! Transaction-creation (inquiry) request/response models.

use serde::{Deserialize, Serialize};

use super::{MerchantOrderId, Reference, TransactionStatus};

/// Parameters for creating a gateway transaction.
///
/// Everything the caller chooses; the client supplies the merchant
/// code and signature when assembling the wire request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Amount to collect, in whole Rupiah.
    pub payment_amount: i64,
    /// Gateway payment-method code (e.g. `SP` for QRIS, `VC` for cards).
    pub payment_method: String,
    /// Merchant-side order id. Reuse the same id when retrying a
    /// failed request — the gateway deduplicates on it.
    pub merchant_order_id: MerchantOrderId,
    /// Short human-readable description of the purchase.
    pub product_details: String,
    /// Customer e-mail address.
    pub email: String,
    /// Display name for virtual-account methods.
    pub customer_va_name: Option<String>,
    /// Customer phone number.
    pub phone_number: Option<String>,
    /// Opaque passthrough echoed back in the callback.
    pub additional_param: Option<String>,
    /// URL the gateway POSTs the payment result to.
    pub callback_url: String,
    /// URL the customer is sent back to after paying.
    pub return_url: String,
    /// Payment window in minutes; gateway default when `None`.
    pub expiry_period: Option<i64>,
}

impl TransactionRequest {
    /// Creates a request with the required fields; optional fields
    /// start empty.
    #[inline]
    #[must_use]
    pub const fn new(
        payment_amount: i64,
        payment_method: String,
        merchant_order_id: MerchantOrderId,
        product_details: String,
        email: String,
        callback_url: String,
        return_url: String,
    ) -> Self {
        Self {
            payment_amount,
            payment_method,
            merchant_order_id,
            product_details,
            email,
            customer_va_name: None,
            phone_number: None,
            additional_param: None,
            callback_url,
            return_url,
            expiry_period: None,
        }
    }
}

/// Wire form of the `/webapi/api/merchant/v2/inquiry` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InquiryRequest {
    /// Merchant code from configuration.
    pub(crate) merchant_code: String,
    /// Amount in whole Rupiah, rendered as a bare integer.
    pub(crate) payment_amount: i64,
    /// Gateway payment-method code.
    pub(crate) payment_method: String,
    /// Merchant-side order id.
    pub(crate) merchant_order_id: MerchantOrderId,
    /// Purchase description.
    pub(crate) product_details: String,
    /// Customer e-mail address.
    pub(crate) email: String,
    /// Display name for virtual-account methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) customer_va_name: Option<String>,
    /// Customer phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) phone_number: Option<String>,
    /// Opaque passthrough echoed back in the callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) additional_param: Option<String>,
    /// Callback URL.
    pub(crate) callback_url: String,
    /// Return URL.
    pub(crate) return_url: String,
    /// Payment window in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) expiry_period: Option<i64>,
    /// MD5 inquiry signature.
    pub(crate) signature: String,
}

impl InquiryRequest {
    /// Assembles the wire request from caller parameters, the merchant
    /// code and a precomputed signature.
    pub(crate) fn from_parts(
        merchant_code: String,
        signature: String,
        request: TransactionRequest,
    ) -> Self {
        Self {
            merchant_code,
            payment_amount: request.payment_amount,
            payment_method: request.payment_method,
            merchant_order_id: request.merchant_order_id,
            product_details: request.product_details,
            email: request.email,
            customer_va_name: request.customer_va_name,
            phone_number: request.phone_number,
            additional_param: request.additional_param,
            callback_url: request.callback_url,
            return_url: request.return_url,
            expiry_period: request.expiry_period,
            signature,
        }
    }
}

/// Response body of the inquiry endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Merchant code, echoed back.
    pub merchant_code: String,
    /// Gateway payment reference for this transaction.
    pub reference: Reference,
    /// Hosted payment page URL.
    #[serde(default)]
    pub payment_url: Option<String>,
    /// Virtual-account number, for VA methods.
    #[serde(default)]
    pub va_number: Option<String>,
    /// QRIS payload string, for QR methods.
    #[serde(default)]
    pub qr_string: Option<String>,
    /// Amount, echoed back as a string.
    #[serde(default)]
    pub amount: Option<String>,
    /// Request outcome code; "00" means the transaction was created.
    pub status_code: TransactionStatus,
    /// Gateway message accompanying the status code.
    pub status_message: String,
}
