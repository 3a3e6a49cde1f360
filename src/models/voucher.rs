//! Discount voucher model and discount computation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DiscountType, VoucherCode};
use crate::error::{Result, VoucherRejection};

/// A discount voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    /// Code customers enter at checkout.
    pub code: VoucherCode,
    /// Whether the value is a percentage or a fixed amount.
    pub discount_type: DiscountType,
    /// Percentage (0–100) or fixed Rupiah amount, per `discount_type`.
    pub discount_value: i64,
    /// Minimum order total the voucher applies to.
    pub min_purchase: i64,
    /// Cap on the computed discount; percentage vouchers only.
    pub max_discount: Option<i64>,
    /// Maximum number of redemptions, `None` for unlimited.
    pub usage_limit: Option<u32>,
    /// Redemptions so far.
    pub used_count: u32,
    /// Start of the validity window (inclusive).
    pub valid_from: DateTime<Utc>,
    /// End of the validity window (inclusive).
    pub valid_until: DateTime<Utc>,
    /// Whether the voucher is enabled at all.
    pub is_active: bool,
}

impl Voucher {
    /// Checks whether the voucher can be applied to an order of
    /// `total_amount` at time `now`.
    ///
    /// # Errors
    ///
    /// Returns the specific [`VoucherRejection`] that applies.
    pub fn check(&self, total_amount: i64, now: DateTime<Utc>) -> Result<(), VoucherRejection> {
        if !self.is_active {
            return Err(VoucherRejection::Inactive);
        }
        if now < self.valid_from {
            return Err(VoucherRejection::NotYetValid);
        }
        if now > self.valid_until {
            return Err(VoucherRejection::Expired);
        }
        if total_amount < self.min_purchase {
            return Err(VoucherRejection::BelowMinimumPurchase {
                required: self.min_purchase,
                actual: total_amount,
            });
        }
        if self
            .usage_limit
            .is_some_and(|limit| self.used_count >= limit)
        {
            return Err(VoucherRejection::UsageLimitReached);
        }
        Ok(())
    }

    /// Computes the discount for an order of `total_amount` at `now`.
    ///
    /// Percentage discounts are capped at `max_discount` when set, and
    /// every discount is clamped to the order total so the final
    /// amount can never go negative.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::DuitkuError::VoucherRejected`] when the
    /// voucher does not apply.
    pub fn discount(&self, total_amount: i64, now: DateTime<Utc>) -> Result<i64> {
        self.check(total_amount, now)?;
        let raw = match self.discount_type {
            DiscountType::Percentage => {
                let scaled = total_amount
                    .saturating_mul(self.discount_value)
                    .checked_div(100)
                    .unwrap_or(0);
                self.max_discount.map_or(scaled, |cap| scaled.min(cap))
            }
            DiscountType::Fixed => self.discount_value,
        };
        Ok(raw.clamp(0, total_amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap(),
        )
    }

    fn mid_2024() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn percentage_voucher(value: i64, max_discount: Option<i64>) -> Voucher {
        let (valid_from, valid_until) = window();
        Voucher {
            code: VoucherCode::from("HEMAT"),
            discount_type: DiscountType::Percentage,
            discount_value: value,
            min_purchase: 0,
            max_discount,
            usage_limit: None,
            used_count: 0,
            valid_from,
            valid_until,
            is_active: true,
        }
    }

    #[test]
    fn percentage_discount_is_capped() {
        let voucher = percentage_voucher(50, Some(20_000));
        assert_eq!(voucher.discount(100_000, mid_2024()).unwrap(), 20_000);
    }

    #[test]
    fn percentage_discount_without_cap() {
        let voucher = percentage_voucher(50, None);
        assert_eq!(voucher.discount(100_000, mid_2024()).unwrap(), 50_000);
    }

    #[test]
    fn percentage_discount_rounds_down() {
        let voucher = percentage_voucher(10, None);
        // 10% of 999 = 99.9 → 99 whole Rupiah.
        assert_eq!(voucher.discount(999, mid_2024()).unwrap(), 99);
    }

    #[test]
    fn fixed_discount_clamped_to_total() {
        let (valid_from, valid_until) = window();
        let voucher = Voucher {
            code: VoucherCode::from("POTONG25K"),
            discount_type: DiscountType::Fixed,
            discount_value: 25_000,
            min_purchase: 0,
            max_discount: None,
            usage_limit: None,
            used_count: 0,
            valid_from,
            valid_until,
            is_active: true,
        };
        // Discount larger than the order total never goes negative.
        assert_eq!(voucher.discount(10_000, mid_2024()).unwrap(), 10_000);
        assert_eq!(voucher.discount(100_000, mid_2024()).unwrap(), 25_000);
    }

    #[test]
    fn inactive_voucher_is_rejected() {
        let mut voucher = percentage_voucher(10, None);
        voucher.is_active = false;
        assert_eq!(
            voucher.check(50_000, mid_2024()).unwrap_err(),
            VoucherRejection::Inactive
        );
    }

    #[test]
    fn validity_window_is_inclusive() {
        let voucher = percentage_voucher(10, None);
        let (valid_from, valid_until) = window();
        assert!(voucher.check(50_000, valid_from).is_ok());
        assert!(voucher.check(50_000, valid_until).is_ok());
        assert_eq!(
            voucher
                .check(50_000, valid_from - chrono::Duration::seconds(1))
                .unwrap_err(),
            VoucherRejection::NotYetValid
        );
        assert_eq!(
            voucher
                .check(50_000, valid_until + chrono::Duration::seconds(1))
                .unwrap_err(),
            VoucherRejection::Expired
        );
    }

    #[test]
    fn minimum_purchase_enforced() {
        let mut voucher = percentage_voucher(10, None);
        voucher.min_purchase = 50_000;
        assert!(matches!(
            voucher.check(49_999, mid_2024()).unwrap_err(),
            VoucherRejection::BelowMinimumPurchase {
                required: 50_000,
                actual: 49_999
            }
        ));
        assert!(voucher.check(50_000, mid_2024()).is_ok());
    }

    #[test]
    fn usage_limit_enforced() {
        let mut voucher = percentage_voucher(10, None);
        voucher.usage_limit = Some(5);
        voucher.used_count = 5;
        assert_eq!(
            voucher.check(50_000, mid_2024()).unwrap_err(),
            VoucherRejection::UsageLimitReached
        );
        voucher.used_count = 4;
        assert!(voucher.check(50_000, mid_2024()).is_ok());
    }

    #[test]
    fn serde_roundtrip() {
        let voucher = percentage_voucher(25, Some(10_000));
        let json = serde_json::to_string(&voucher).unwrap();
        let deserialized: Voucher = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, voucher);
    }
}
