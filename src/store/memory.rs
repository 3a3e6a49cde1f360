//! In-memory store backend for testing.
//!
//! Provides [`InMemoryStore`], a thread-safe in-memory implementation
//! of the store traits. Ideal for unit and integration tests where
//! file I/O is undesirable.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

#[cfg(feature = "async")]
use core::future::{self, Future};

use crate::error::{DuitkuError, Result, VoucherRejection};
use crate::models::{MerchantOrderId, OrderRecord, TransactionStatus, Voucher, VoucherCode};

/// Thread-safe in-memory store.
///
/// This type implements both [`super::Store`] (async) and
/// [`super::BlockingStore`] (blocking) traits, providing a zero-setup
/// backend for tests.
///
/// # Example
///
/// ```rust
/// use duitku_rs::store::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// // Use with Checkout or CheckoutBlocking builders.
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    /// All state behind a single mutex for thread-safe interior
    /// mutability.
    inner: Mutex<Inner>,
}

/// Inner mutable state.
#[derive(Debug, Default)]
struct Inner {
    /// Recorded orders.
    orders: Vec<OrderRecord>,
    /// Voucher table.
    vouchers: Vec<Voucher>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the inner lock and applies a closure.
    fn with_lock<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> Result<R> {
        let mut inner = self.inner.lock().map_err(|err| lock_error(&err))?;
        Ok(f(&mut inner))
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &std::sync::PoisonError<T>) -> DuitkuError {
    DuitkuError::Storage(err.to_string().into())
}

/// Inserts or replaces an order, matching on the merchant order id.
fn upsert_order_in(inner: &mut Inner, order: OrderRecord) {
    match inner
        .orders
        .iter_mut()
        .find(|existing| existing.merchant_order_id == order.merchant_order_id)
    {
        Some(existing) => *existing = order,
        None => inner.orders.push(order),
    }
}

/// Updates the status of a recorded order.
fn set_status_in(
    inner: &mut Inner,
    id: &MerchantOrderId,
    status: TransactionStatus,
    at: DateTime<Utc>,
) -> Result<()> {
    let order = inner
        .orders
        .iter_mut()
        .find(|existing| existing.merchant_order_id == *id)
        .ok_or_else(|| DuitkuError::OrderNotFound(id.to_string()))?;
    order.status = status;
    order.updated = at;
    Ok(())
}

/// Inserts or replaces vouchers, matching on the code.
fn upsert_vouchers_in(inner: &mut Inner, items: Vec<Voucher>) {
    for item in items {
        match inner
            .vouchers
            .iter_mut()
            .find(|existing| existing.code == item.code)
        {
            Some(existing) => *existing = item,
            None => inner.vouchers.push(item),
        }
    }
}

/// The atomic increment-and-compare: check the limit and bump the
/// counter under the caller's lock, so concurrent redemptions can
/// never oversubscribe a limited voucher.
fn redeem_in(inner: &mut Inner, code: &VoucherCode) -> Result<Voucher> {
    let voucher = inner
        .vouchers
        .iter_mut()
        .find(|existing| existing.code == *code)
        .ok_or_else(|| DuitkuError::VoucherNotFound(code.to_string()))?;
    if voucher
        .usage_limit
        .is_some_and(|limit| voucher.used_count >= limit)
    {
        return Err(VoucherRejection::UsageLimitReached.into());
    }
    voucher.used_count += 1;
    Ok(voucher.clone())
}

// ── BlockingStore implementation ────────────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingStore for InMemoryStore {
    #[inline]
    fn orders(&self) -> Result<Vec<OrderRecord>> {
        self.with_lock(|inner| inner.orders.clone())
    }

    #[inline]
    fn order(&self, id: &MerchantOrderId) -> Result<Option<OrderRecord>> {
        self.with_lock(|inner| {
            inner
                .orders
                .iter()
                .find(|existing| existing.merchant_order_id == *id)
                .cloned()
        })
    }

    #[inline]
    fn upsert_order(&self, order: OrderRecord) -> Result<()> {
        self.with_lock(|inner| upsert_order_in(inner, order))
    }

    #[inline]
    fn set_order_status(
        &self,
        id: &MerchantOrderId,
        status: TransactionStatus,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.with_lock(|inner| set_status_in(inner, id, status, at))?
    }

    #[inline]
    fn vouchers(&self) -> Result<Vec<Voucher>> {
        self.with_lock(|inner| inner.vouchers.clone())
    }

    #[inline]
    fn voucher(&self, code: &VoucherCode) -> Result<Option<Voucher>> {
        self.with_lock(|inner| {
            inner
                .vouchers
                .iter()
                .find(|existing| existing.code == *code)
                .cloned()
        })
    }

    #[inline]
    fn upsert_vouchers(&self, items: Vec<Voucher>) -> Result<()> {
        self.with_lock(|inner| upsert_vouchers_in(inner, items))
    }

    #[inline]
    fn redeem_voucher(&self, code: &VoucherCode) -> Result<Voucher> {
        self.with_lock(|inner| redeem_in(inner, code))?
    }

    #[inline]
    fn clear(&self) -> Result<()> {
        self.with_lock(|inner| *inner = Inner::default())
    }
}

// ── Store (async) implementation ────────────────────────────────────────

#[cfg(feature = "async")]
impl super::Store for InMemoryStore {
    #[inline]
    fn orders(&self) -> impl Future<Output = Result<Vec<OrderRecord>>> + Send {
        future::ready(self.with_lock(|inner| inner.orders.clone()))
    }

    #[inline]
    fn order(
        &self,
        id: &MerchantOrderId,
    ) -> impl Future<Output = Result<Option<OrderRecord>>> + Send {
        future::ready(self.with_lock(|inner| {
            inner
                .orders
                .iter()
                .find(|existing| existing.merchant_order_id == *id)
                .cloned()
        }))
    }

    #[inline]
    fn upsert_order(&self, order: OrderRecord) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| upsert_order_in(inner, order)))
    }

    #[inline]
    fn set_order_status(
        &self,
        id: &MerchantOrderId,
        status: TransactionStatus,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send {
        future::ready(
            self.with_lock(|inner| set_status_in(inner, id, status, at))
                .and_then(|result| result),
        )
    }

    #[inline]
    fn vouchers(&self) -> impl Future<Output = Result<Vec<Voucher>>> + Send {
        future::ready(self.with_lock(|inner| inner.vouchers.clone()))
    }

    #[inline]
    fn voucher(
        &self,
        code: &VoucherCode,
    ) -> impl Future<Output = Result<Option<Voucher>>> + Send {
        future::ready(self.with_lock(|inner| {
            inner
                .vouchers
                .iter()
                .find(|existing| existing.code == *code)
                .cloned()
        }))
    }

    #[inline]
    fn upsert_vouchers(&self, items: Vec<Voucher>) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| upsert_vouchers_in(inner, items)))
    }

    #[inline]
    fn redeem_voucher(&self, code: &VoucherCode) -> impl Future<Output = Result<Voucher>> + Send {
        future::ready(
            self.with_lock(|inner| redeem_in(inner, code))
                .and_then(|result| result),
        )
    }

    #[inline]
    fn clear(&self) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| *inner = Inner::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiscountType;
    use chrono::TimeZone as _;

    // ── Test helpers ───────────────────────────────────────────────────

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    fn test_order(id: &str) -> OrderRecord {
        OrderRecord::pending(
            MerchantOrderId::from(id),
            None,
            150_000,
            Some("SP".to_owned()),
            ts(),
        )
    }

    fn test_voucher(code: &str, usage_limit: Option<u32>) -> Voucher {
        Voucher {
            code: VoucherCode::from(code),
            discount_type: DiscountType::Fixed,
            discount_value: 10_000,
            min_purchase: 0,
            max_discount: None,
            usage_limit,
            used_count: 0,
            valid_from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            valid_until: Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap(),
            is_active: true,
        }
    }

    // ── Blocking tests ─────────────────────────────────────────────────

    #[cfg(feature = "blocking")]
    mod blocking {
        use super::*;
        use crate::store::BlockingStore;

        #[test]
        fn order_lifecycle() {
            let store = InMemoryStore::new();
            assert!(store.orders().unwrap().is_empty());
            store.upsert_order(test_order("ORDER-1")).unwrap();
            assert_eq!(store.orders().unwrap().len(), 1);
            let found = store.order(&MerchantOrderId::from("ORDER-1")).unwrap();
            assert!(found.is_some());
            assert!(
                store
                    .order(&MerchantOrderId::from("ORDER-2"))
                    .unwrap()
                    .is_none()
            );
        }

        #[test]
        fn upsert_replaces_by_order_id() {
            let store = InMemoryStore::new();
            store.upsert_order(test_order("ORDER-1")).unwrap();
            let mut replacement = test_order("ORDER-1");
            replacement.amount = 99_000;
            store.upsert_order(replacement).unwrap();
            let orders = store.orders().unwrap();
            assert_eq!(orders.len(), 1);
            assert_eq!(orders.first().map(|o| o.amount), Some(99_000));
        }

        #[test]
        fn set_status_updates_stamp() {
            let store = InMemoryStore::new();
            store.upsert_order(test_order("ORDER-1")).unwrap();
            let later = ts() + chrono::Duration::minutes(5);
            store
                .set_order_status(
                    &MerchantOrderId::from("ORDER-1"),
                    TransactionStatus::Success,
                    later,
                )
                .unwrap();
            let order = store
                .order(&MerchantOrderId::from("ORDER-1"))
                .unwrap()
                .unwrap();
            assert_eq!(order.status, TransactionStatus::Success);
            assert_eq!(order.updated, later);
        }

        #[test]
        fn set_status_on_missing_order_fails() {
            let store = InMemoryStore::new();
            let err = store
                .set_order_status(
                    &MerchantOrderId::from("GHOST"),
                    TransactionStatus::Success,
                    ts(),
                )
                .unwrap_err();
            assert!(matches!(err, DuitkuError::OrderNotFound(_)));
        }

        #[test]
        fn redeem_increments_counter() {
            let store = InMemoryStore::new();
            store
                .upsert_vouchers(vec![test_voucher("HEMAT", Some(5))])
                .unwrap();
            let redeemed = store.redeem_voucher(&VoucherCode::from("HEMAT")).unwrap();
            assert_eq!(redeemed.used_count, 1);
            let stored = store
                .voucher(&VoucherCode::from("HEMAT"))
                .unwrap()
                .unwrap();
            assert_eq!(stored.used_count, 1);
        }

        #[test]
        fn redeem_stops_exactly_at_limit() {
            let store = InMemoryStore::new();
            store
                .upsert_vouchers(vec![test_voucher("LIMITED", Some(3))])
                .unwrap();
            for _attempt in 0_u32..3 {
                drop(store.redeem_voucher(&VoucherCode::from("LIMITED")).unwrap());
            }
            let err = store
                .redeem_voucher(&VoucherCode::from("LIMITED"))
                .unwrap_err();
            assert!(matches!(
                err,
                DuitkuError::VoucherRejected(VoucherRejection::UsageLimitReached)
            ));
        }

        #[test]
        fn redeem_unknown_code_fails() {
            let store = InMemoryStore::new();
            let err = store
                .redeem_voucher(&VoucherCode::from("GHOST"))
                .unwrap_err();
            assert!(matches!(err, DuitkuError::VoucherNotFound(_)));
        }

        #[test]
        fn unlimited_voucher_never_exhausts() {
            let store = InMemoryStore::new();
            store
                .upsert_vouchers(vec![test_voucher("FOREVER", None)])
                .unwrap();
            for _attempt in 0_u32..50 {
                drop(store.redeem_voucher(&VoucherCode::from("FOREVER")).unwrap());
            }
            let stored = store
                .voucher(&VoucherCode::from("FOREVER"))
                .unwrap()
                .unwrap();
            assert_eq!(stored.used_count, 50);
        }

        #[test]
        fn concurrent_redemptions_respect_limit() {
            use std::sync::Arc;

            let store = Arc::new(InMemoryStore::new());
            store
                .upsert_vouchers(vec![test_voucher("RACE", Some(5))])
                .unwrap();

            let handles: Vec<_> = (0_u32..16)
                .map(|_worker| {
                    let shared = Arc::clone(&store);
                    std::thread::spawn(move || {
                        shared.redeem_voucher(&VoucherCode::from("RACE")).is_ok()
                    })
                })
                .collect();
            let successes = handles
                .into_iter()
                .map(std::thread::JoinHandle::join)
                .filter(|result| matches!(result, Ok(true)))
                .count();
            assert_eq!(successes, 5);

            let stored = store.voucher(&VoucherCode::from("RACE")).unwrap().unwrap();
            assert_eq!(stored.used_count, 5);
        }

        #[test]
        fn clear_resets_everything() {
            let store = InMemoryStore::new();
            store.upsert_order(test_order("ORDER-1")).unwrap();
            store
                .upsert_vouchers(vec![test_voucher("HEMAT", None)])
                .unwrap();
            store.clear().unwrap();
            assert!(store.orders().unwrap().is_empty());
            assert!(store.vouchers().unwrap().is_empty());
        }
    }

    // ── Async tests ────────────────────────────────────────────────────

    #[cfg(feature = "async")]
    mod async_tests {
        use super::*;
        use crate::store::Store;

        #[tokio::test]
        async fn order_lifecycle() {
            let store = InMemoryStore::new();
            store.upsert_order(test_order("ORDER-1")).await.unwrap();
            assert_eq!(store.orders().await.unwrap().len(), 1);
            let found = store
                .order(&MerchantOrderId::from("ORDER-1"))
                .await
                .unwrap();
            assert!(found.is_some());
        }

        #[tokio::test]
        async fn set_status_roundtrip() {
            let store = InMemoryStore::new();
            store.upsert_order(test_order("ORDER-1")).await.unwrap();
            store
                .set_order_status(
                    &MerchantOrderId::from("ORDER-1"),
                    TransactionStatus::Cancelled,
                    ts(),
                )
                .await
                .unwrap();
            let order = store
                .order(&MerchantOrderId::from("ORDER-1"))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(order.status, TransactionStatus::Cancelled);
        }

        #[tokio::test]
        async fn redeem_respects_limit() {
            let store = InMemoryStore::new();
            store
                .upsert_vouchers(vec![test_voucher("LIMITED", Some(1))])
                .await
                .unwrap();
            drop(
                store
                    .redeem_voucher(&VoucherCode::from("LIMITED"))
                    .await
                    .unwrap(),
            );
            let err = store
                .redeem_voucher(&VoucherCode::from("LIMITED"))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                DuitkuError::VoucherRejected(VoucherRejection::UsageLimitReached)
            ));
        }

        #[tokio::test]
        async fn clear_resets_everything() {
            let store = InMemoryStore::new();
            store.upsert_order(test_order("ORDER-1")).await.unwrap();
            store.clear().await.unwrap();
            assert!(store.orders().await.unwrap().is_empty());
        }
    }
}
