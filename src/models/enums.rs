//! Enumeration types for constrained gateway values.

use serde::{Deserialize, Serialize};

/// Transaction state as reported by the gateway.
///
/// The gateway encodes states as two-digit strings; anything outside
/// the documented set deserializes to [`TransactionStatus::Unknown`]
/// and is treated as a failure by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Payment completed ("00").
    #[serde(rename = "00")]
    Success,
    /// Payment initiated, waiting for the customer ("01").
    #[serde(rename = "01")]
    Pending,
    /// Payment cancelled or expired ("02").
    #[serde(rename = "02")]
    Cancelled,
    /// Any other code the gateway may introduce.
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    /// Returns `true` for a completed payment.
    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns `true` while the customer can still pay.
    #[inline]
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The two-digit wire code, or `"??"` for undocumented codes.
    #[inline]
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Success => "00",
            Self::Pending => "01",
            Self::Cancelled => "02",
            Self::Unknown => "??",
        }
    }

    /// Human-readable label for display.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

/// How a voucher's discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscountType {
    /// `discount_value` is a percentage of the order total.
    Percentage,
    /// `discount_value` is a fixed Rupiah amount.
    Fixed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serde_success() {
        let json = serde_json::to_string(&TransactionStatus::Success).unwrap();
        assert_eq!(json, r#""00""#);
        let deserialized: TransactionStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, TransactionStatus::Success);
    }

    #[test]
    fn status_serde_pending_and_cancelled() {
        let pending: TransactionStatus = serde_json::from_str(r#""01""#).unwrap();
        assert_eq!(pending, TransactionStatus::Pending);
        let cancelled: TransactionStatus = serde_json::from_str(r#""02""#).unwrap();
        assert_eq!(cancelled, TransactionStatus::Cancelled);
    }

    #[test]
    fn undocumented_code_maps_to_unknown() {
        let status: TransactionStatus = serde_json::from_str(r#""97""#).unwrap();
        assert_eq!(status, TransactionStatus::Unknown);
        assert!(!status.is_success());
        assert!(!status.is_pending());
    }

    #[test]
    fn status_predicates() {
        assert!(TransactionStatus::Success.is_success());
        assert!(TransactionStatus::Pending.is_pending());
        assert!(!TransactionStatus::Cancelled.is_success());
        assert_eq!(TransactionStatus::Cancelled.label(), "cancelled");
        assert_eq!(TransactionStatus::Cancelled.code(), "02");
        assert_eq!(TransactionStatus::Unknown.code(), "??");
    }

    #[test]
    fn discount_type_serde_roundtrip() {
        let variants = [
            (DiscountType::Percentage, r#""percentage""#),
            (DiscountType::Fixed, r#""fixed""#),
        ];
        for (variant, expected_json) in variants {
            let json = serde_json::to_string(&variant).unwrap();
            assert_eq!(json, expected_json);
            let deserialized: DiscountType = serde_json::from_str(&json).unwrap();
            assert_eq!(deserialized, variant);
        }
    }

    #[test]
    fn invalid_discount_type_fails() {
        let result = serde_json::from_str::<DiscountType>(r#""bogus""#);
        assert!(result.is_err());
    }
}
