//! Transaction-status request/response models.

use serde::{Deserialize, Serialize};

use super::{MerchantOrderId, Reference, TransactionStatus};

/// Wire form of the `/webapi/api/merchant/transactionStatus` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusRequest {
    /// Merchant code from configuration.
    pub(crate) merchant_code: String,
    /// Merchant-side order id being queried.
    pub(crate) merchant_order_id: MerchantOrderId,
    /// MD5 status signature.
    pub(crate) signature: String,
}

/// Response body of the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Merchant code, echoed back.
    pub merchant_code: String,
    /// Gateway payment reference.
    #[serde(default)]
    pub reference: Option<Reference>,
    /// Paid amount as a string.
    #[serde(default)]
    pub amount: Option<String>,
    /// Gateway fee as a string, when disclosed.
    #[serde(default)]
    pub fee: Option<String>,
    /// Current transaction state.
    pub status_code: TransactionStatus,
    /// Gateway message accompanying the state.
    pub status_message: String,
}
