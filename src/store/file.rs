//! JSON-file-based store backend.
//!
//! Stores orders and vouchers in separate JSON files under a
//! configurable directory (default: `$XDG_DATA_HOME/duitku-rs/`).

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(feature = "async")]
use core::future::{self, Future};

use crate::error::{DuitkuError, Result, VoucherRejection};
use crate::models::{MerchantOrderId, OrderRecord, TransactionStatus, Voucher, VoucherCode};

/// Application name used for the XDG data directory.
const APP_NAME: &str = "duitku-rs";

/// File name for orders.
const ORDERS_FILE: &str = "orders.json";
/// File name for vouchers.
const VOUCHERS_FILE: &str = "vouchers.json";
/// Sentinel file used for cross-process file locking.
const LOCK_FILE: &str = "store.lock";

/// File-backed store that persists orders and vouchers as JSON files.
///
/// # Concurrency
///
/// Thread safety within a single process is provided by an in-process
/// [`Mutex`]. Cross-process safety is achieved via an advisory file
/// lock on `store.lock` (using [`std::fs::File::lock`] /
/// [`std::fs::File::lock_shared`]). Read operations acquire a shared
/// lock; write operations — including the voucher redemption's
/// read-check-increment cycle — hold an exclusive lock for the whole
/// cycle, so two processes cannot both pass the limit check.
///
/// # File layout
///
/// ```text
/// <dir>/
///   store.lock       (cross-process lock sentinel)
///   orders.json
///   vouchers.json
/// ```
#[derive(Debug)]
pub struct FileStore {
    /// Root directory containing the JSON files.
    dir: PathBuf,
    /// Mutex serializing concurrent in-process access.
    lock: Mutex<()>,
    /// Sentinel file for cross-process advisory locking.
    lock_file: fs::File,
}

impl FileStore {
    /// Creates a new file store rooted at the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist. Also
    /// opens (or creates) the `store.lock` sentinel file used for
    /// cross-process advisory locking.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the lock
    /// file cannot be opened.
    #[inline]
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(storage_io_error)?;
        let lock_file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))
            .map_err(storage_io_error)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
            lock_file,
        })
    }

    /// Returns the default XDG-compliant data directory for this
    /// application.
    ///
    /// On Linux: `$XDG_DATA_HOME/duitku-rs/` (typically
    /// `~/.local/share/duitku-rs/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be
    /// determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| {
                DuitkuError::Storage("could not determine platform data directory".into())
            })
    }

    // ── Private helpers ─────────────────────────────────────────────

    /// Runs `f` under the in-process mutex and a shared advisory lock.
    fn with_read_lock<R>(&self, f: impl FnOnce(&Self) -> Result<R>) -> Result<R> {
        let _guard = self.lock.lock().map_err(|err| lock_error(&err))?;
        self.lock_file.lock_shared().map_err(storage_io_error)?;
        let result = f(self);
        let _unlock = self.lock_file.unlock();
        result
    }

    /// Runs `f` under the in-process mutex and an exclusive advisory
    /// lock.
    fn with_write_lock<R>(&self, f: impl FnOnce(&Self) -> Result<R>) -> Result<R> {
        let _guard = self.lock.lock().map_err(|err| lock_error(&err))?;
        self.lock_file.lock().map_err(storage_io_error)?;
        let result = f(self);
        let _unlock = self.lock_file.unlock();
        result
    }

    /// Reads a JSON array file; a missing file is an empty list.
    fn read_items<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        match fs::read_to_string(self.dir.join(name)) {
            Ok(raw) => serde_json::from_str(&raw).map_err(DuitkuError::from),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(storage_io_error(err)),
        }
    }

    /// Serializes a JSON array file.
    fn write_items<T: Serialize>(&self, name: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string_pretty(items)?;
        fs::write(self.dir.join(name), raw).map_err(storage_io_error)
    }

    // ── Shared operation bodies (used by both trait impls) ──────────

    /// Lists all orders.
    fn orders_impl(&self) -> Result<Vec<OrderRecord>> {
        self.with_read_lock(|store| store.read_items(ORDERS_FILE))
    }

    /// Looks up one order.
    fn order_impl(&self, id: &MerchantOrderId) -> Result<Option<OrderRecord>> {
        self.with_read_lock(|store| {
            let orders: Vec<OrderRecord> = store.read_items(ORDERS_FILE)?;
            Ok(orders
                .into_iter()
                .find(|order| order.merchant_order_id == *id))
        })
    }

    /// Inserts or replaces one order.
    fn upsert_order_impl(&self, order: OrderRecord) -> Result<()> {
        self.with_write_lock(|store| {
            let mut orders: Vec<OrderRecord> = store.read_items(ORDERS_FILE)?;
            match orders
                .iter_mut()
                .find(|existing| existing.merchant_order_id == order.merchant_order_id)
            {
                Some(existing) => *existing = order,
                None => orders.push(order),
            }
            store.write_items(ORDERS_FILE, &orders)
        })
    }

    /// Updates the status of a recorded order.
    fn set_order_status_impl(
        &self,
        id: &MerchantOrderId,
        status: TransactionStatus,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.with_write_lock(|store| {
            let mut orders: Vec<OrderRecord> = store.read_items(ORDERS_FILE)?;
            let order = orders
                .iter_mut()
                .find(|existing| existing.merchant_order_id == *id)
                .ok_or_else(|| DuitkuError::OrderNotFound(id.to_string()))?;
            order.status = status;
            order.updated = at;
            store.write_items(ORDERS_FILE, &orders)
        })
    }

    /// Lists all vouchers.
    fn vouchers_impl(&self) -> Result<Vec<Voucher>> {
        self.with_read_lock(|store| store.read_items(VOUCHERS_FILE))
    }

    /// Looks up one voucher.
    fn voucher_impl(&self, code: &VoucherCode) -> Result<Option<Voucher>> {
        self.with_read_lock(|store| {
            let vouchers: Vec<Voucher> = store.read_items(VOUCHERS_FILE)?;
            Ok(vouchers.into_iter().find(|voucher| voucher.code == *code))
        })
    }

    /// Inserts or replaces vouchers.
    fn upsert_vouchers_impl(&self, items: Vec<Voucher>) -> Result<()> {
        self.with_write_lock(|store| {
            let mut vouchers: Vec<Voucher> = store.read_items(VOUCHERS_FILE)?;
            for item in items {
                match vouchers
                    .iter_mut()
                    .find(|existing| existing.code == item.code)
                {
                    Some(existing) => *existing = item,
                    None => vouchers.push(item),
                }
            }
            store.write_items(VOUCHERS_FILE, &vouchers)
        })
    }

    /// Atomic redemption: the limit check, the increment and the
    /// write-back all happen under the exclusive lock.
    fn redeem_voucher_impl(&self, code: &VoucherCode) -> Result<Voucher> {
        self.with_write_lock(|store| {
            let mut vouchers: Vec<Voucher> = store.read_items(VOUCHERS_FILE)?;
            let voucher = vouchers
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
            let redeemed = voucher.clone();
            store.write_items(VOUCHERS_FILE, &vouchers)?;
            Ok(redeemed)
        })
    }

    /// Removes both data files.
    fn clear_impl(&self) -> Result<()> {
        self.with_write_lock(|store| {
            for name in [ORDERS_FILE, VOUCHERS_FILE] {
                match fs::remove_file(store.dir.join(name)) {
                    Ok(()) => {}
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                    Err(err) => return Err(storage_io_error(err)),
                }
            }
            Ok(())
        })
    }
}

/// Wraps an I/O error.
fn storage_io_error(err: std::io::Error) -> DuitkuError {
    DuitkuError::Storage(Box::new(err))
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &std::sync::PoisonError<T>) -> DuitkuError {
    DuitkuError::Storage(err.to_string().into())
}

// ── BlockingStore implementation ────────────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingStore for FileStore {
    #[inline]
    fn orders(&self) -> Result<Vec<OrderRecord>> {
        self.orders_impl()
    }

    #[inline]
    fn order(&self, id: &MerchantOrderId) -> Result<Option<OrderRecord>> {
        self.order_impl(id)
    }

    #[inline]
    fn upsert_order(&self, order: OrderRecord) -> Result<()> {
        self.upsert_order_impl(order)
    }

    #[inline]
    fn set_order_status(
        &self,
        id: &MerchantOrderId,
        status: TransactionStatus,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.set_order_status_impl(id, status, at)
    }

    #[inline]
    fn vouchers(&self) -> Result<Vec<Voucher>> {
        self.vouchers_impl()
    }

    #[inline]
    fn voucher(&self, code: &VoucherCode) -> Result<Option<Voucher>> {
        self.voucher_impl(code)
    }

    #[inline]
    fn upsert_vouchers(&self, items: Vec<Voucher>) -> Result<()> {
        self.upsert_vouchers_impl(items)
    }

    #[inline]
    fn redeem_voucher(&self, code: &VoucherCode) -> Result<Voucher> {
        self.redeem_voucher_impl(code)
    }

    #[inline]
    fn clear(&self) -> Result<()> {
        self.clear_impl()
    }
}

// ── Store (async) implementation ────────────────────────────────────────

#[cfg(feature = "async")]
impl super::Store for FileStore {
    #[inline]
    fn orders(&self) -> impl Future<Output = Result<Vec<OrderRecord>>> + Send {
        future::ready(self.orders_impl())
    }

    #[inline]
    fn order(
        &self,
        id: &MerchantOrderId,
    ) -> impl Future<Output = Result<Option<OrderRecord>>> + Send {
        future::ready(self.order_impl(id))
    }

    #[inline]
    fn upsert_order(&self, order: OrderRecord) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.upsert_order_impl(order))
    }

    #[inline]
    fn set_order_status(
        &self,
        id: &MerchantOrderId,
        status: TransactionStatus,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.set_order_status_impl(id, status, at))
    }

    #[inline]
    fn vouchers(&self) -> impl Future<Output = Result<Vec<Voucher>>> + Send {
        future::ready(self.vouchers_impl())
    }

    #[inline]
    fn voucher(
        &self,
        code: &VoucherCode,
    ) -> impl Future<Output = Result<Option<Voucher>>> + Send {
        future::ready(self.voucher_impl(code))
    }

    #[inline]
    fn upsert_vouchers(&self, items: Vec<Voucher>) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.upsert_vouchers_impl(items))
    }

    #[inline]
    fn redeem_voucher(&self, code: &VoucherCode) -> impl Future<Output = Result<Voucher>> + Send {
        future::ready(self.redeem_voucher_impl(code))
    }

    #[inline]
    fn clear(&self) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.clear_impl())
    }
}
