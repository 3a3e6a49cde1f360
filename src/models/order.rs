//! Locally recorded gateway order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MerchantOrderId, Reference, TransactionStatus};

/// A gateway transaction as recorded by the local store.
///
/// The gateway owns the authoritative state; this record tracks what
/// the merchant last observed, so status polling and callback handling
/// have something to reconcile against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Merchant-side order id, the store key.
    pub merchant_order_id: MerchantOrderId,
    /// Gateway payment reference, once known.
    pub reference: Option<Reference>,
    /// Amount in whole Rupiah.
    pub amount: i64,
    /// Payment-method code the order was created with.
    pub payment_method: Option<String>,
    /// Last observed transaction state.
    pub status: TransactionStatus,
    /// When the order was first recorded.
    pub created: DateTime<Utc>,
    /// When the status last changed.
    pub updated: DateTime<Utc>,
}

impl OrderRecord {
    /// Creates a pending record for a freshly created transaction.
    #[inline]
    #[must_use]
    pub const fn pending(
        merchant_order_id: MerchantOrderId,
        reference: Option<Reference>,
        amount: i64,
        payment_method: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            merchant_order_id,
            reference,
            amount,
            payment_method,
            status: TransactionStatus::Pending,
            created: at,
            updated: at,
        }
    }
}
