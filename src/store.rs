//! Pluggable storage backends for orders and vouchers.
//!
//! This module defines the [`Store`] (async) and [`BlockingStore`]
//! (blocking) traits via a shared macro, mirroring the client
//! generation pattern in [`crate::client`]. The gateway remains the
//! authority on transaction state; the store tracks what the merchant
//! last observed, plus the voucher table with its redemption counter.

#[cfg(feature = "storage-file")]
mod file;
mod memory;

#[cfg(feature = "storage-file")]
pub use file::FileStore;
pub use memory::InMemoryStore;

/// Generates a store trait (async or blocking) with all entity methods.
///
/// Uses `@methods` to define the method list once, and `@method` to
/// render each method in async (`impl Future + Send`) or blocking
/// (`fn`) style.
macro_rules! define_store {
    // ── Entry points ────────────────────────────────────────────────
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: async_mode,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_store!(@methods async_mode);
        }
    };
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: blocking,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_store!(@methods blocking);
        }
    };

    // ── Single method list (shared between both variants) ───────────
    (@methods $mode:ident) => {
        // Orders
        define_store!(@method $mode, orders,
            "Returns all recorded orders.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            -> Result<Vec<OrderRecord>>);
        define_store!(@method $mode, order,
            "Looks up one order by merchant order id.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            id: &MerchantOrderId, -> Result<Option<OrderRecord>>);
        define_store!(@method $mode, upsert_order,
            "Inserts or replaces an order (matched by merchant order id).\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            order: OrderRecord, -> Result<()>);
        define_store!(@method $mode, set_order_status,
            "Updates the observed status (and `updated` stamp) of an order.\n\n# Errors\n\nReturns [`crate::error::DuitkuError::OrderNotFound`] if no such order is recorded, or an error if the storage backend fails to write.",
            id: &MerchantOrderId, status: TransactionStatus, at: DateTime<Utc>, -> Result<()>);

        // Vouchers
        define_store!(@method $mode, vouchers,
            "Returns all vouchers.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            -> Result<Vec<Voucher>>);
        define_store!(@method $mode, voucher,
            "Looks up one voucher by code.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            code: &VoucherCode, -> Result<Option<Voucher>>);
        define_store!(@method $mode, upsert_vouchers,
            "Inserts or replaces vouchers (matched by code).\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            items: Vec<Voucher>, -> Result<()>);
        define_store!(@method $mode, redeem_voucher,
            "Atomically increments a voucher's redemption counter.\n\nThe limit check and the increment happen under one lock: with a `usage_limit` of N, exactly N concurrent redemptions can succeed, never more. Returns the voucher as stored after the increment.\n\n# Errors\n\nReturns [`crate::error::DuitkuError::VoucherNotFound`] for an unknown code and [`crate::error::VoucherRejection::UsageLimitReached`] once the limit is exhausted.",
            code: &VoucherCode, -> Result<Voucher>);

        // Clear
        define_store!(@method $mode, clear,
            "Removes all stored data.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            -> Result<()>);
    };

    // ── Blocking method renderer ────────────────────────────────────
    (@method blocking, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*) -> $ret;
    };

    // ── Async method renderer (returns impl Future + Send) ──────────
    (@method async_mode, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*)
            -> impl core::future::Future<Output = $ret> + Send;
    };
}

#[cfg(feature = "async")]
mod async_store {
    //! Async store trait definition.

    use crate::error::Result;
    use crate::models::{MerchantOrderId, OrderRecord, TransactionStatus, Voucher, VoucherCode};
    use chrono::{DateTime, Utc};

    define_store! {
        trait_name: Store,
        trait_doc: "Async storage backend for orders and vouchers.\n\nAll methods take `&self` — implementations should use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: async_mode,
    }
}

#[cfg(feature = "blocking")]
mod blocking_store {
    //! Blocking store trait definition.

    use crate::error::Result;
    use crate::models::{MerchantOrderId, OrderRecord, TransactionStatus, Voucher, VoucherCode};
    use chrono::{DateTime, Utc};

    define_store! {
        trait_name: BlockingStore,
        trait_doc: "Blocking storage backend for orders and vouchers.\n\nAll methods take `&self` — implementations should use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: blocking,
    }
}

#[cfg(feature = "async")]
pub use async_store::Store;
#[cfg(feature = "blocking")]
pub use blocking_store::BlockingStore;
