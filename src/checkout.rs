//! High-level checkout client with integrated storage.
//!
//! Combines the low-level gateway client with a [`Store`] /
//! [`BlockingStore`] backend: creating a transaction records it
//! locally, status polls and verified callbacks reconcile the recorded
//! state, and voucher redemption goes through the store's atomic
//! counter.

/// Extracts a whole-Rupiah amount from a gateway string field.
///
/// Gateway responses render amounts as strings (sometimes with a
/// decimal fraction); orders recorded from a response fall back to
/// zero when the field is absent or unparseable.
fn parse_amount(raw: Option<&str>) -> i64 {
    raw.and_then(|text| {
        text.split_once('.')
            .map_or(text, |(whole, _fraction)| whole)
            .parse()
            .ok()
    })
    .unwrap_or(0)
}

/// Generates a high-level checkout client (async or blocking).
macro_rules! define_checkout {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_client: $http_client:ty,
        store_trait: $store_trait:ident,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder<S: $store_trait> {
            /// Merchant code issued by the gateway.
            merchant_code: Option<String>,
            /// Merchant API key.
            api_key: Option<SecretString>,
            /// Whether to target the sandbox environment.
            sandbox: bool,
            /// Base URL override (for testing).
            base_url: Option<String>,
            /// Store backend.
            store: Option<S>,
        }

        impl<S: $store_trait> $builder<S> {
            /// Sets the merchant code.
            #[inline]
            #[must_use]
            pub fn merchant_code<T: Into<String>>(mut self, code: T) -> Self {
                self.merchant_code = Some(code.into());
                self
            }

            /// Sets the merchant API key.
            #[inline]
            #[must_use]
            pub fn api_key<T: Into<String>>(mut self, key: T) -> Self {
                self.api_key = Some(SecretString::from(key.into()));
                self
            }

            /// Selects sandbox (`true`, the default) or production.
            #[inline]
            #[must_use]
            pub const fn sandbox(mut self, sandbox: bool) -> Self {
                self.sandbox = sandbox;
                self
            }

            /// Applies a resolved [`DuitkuConfig`] in one call.
            #[inline]
            #[must_use]
            pub fn config(mut self, config: DuitkuConfig) -> Self {
                self.merchant_code = Some(config.merchant_code);
                self.api_key = Some(config.api_key);
                self.sandbox = config.sandbox;
                self
            }

            /// Overrides the base URL (useful for testing with a mock server).
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Sets the store backend.
            #[inline]
            #[must_use]
            pub fn store(mut self, store: S) -> Self {
                self.store = Some(store);
                self
            }

            /// Builds the high-level client.
            ///
            /// # Errors
            ///
            /// Returns [`DuitkuError::Storage`] if no store was
            /// provided, [`DuitkuError::ConfigurationMissing`] if the
            /// merchant code or API key is absent, and
            /// [`DuitkuError::Http`] if the HTTP client fails to build.
            #[inline]
            pub fn build(self) -> Result<$client<S>> {
                let store = self
                    .store
                    .ok_or_else(|| DuitkuError::Storage("store backend is required".into()))?;

                let mut http_builder = <$http_client>::builder().sandbox(self.sandbox);
                if let Some(code) = self.merchant_code {
                    http_builder = http_builder.merchant_code(code);
                }
                if let Some(key) = self.api_key {
                    http_builder = http_builder.api_key_secret(key);
                }
                if let Some(url) = self.base_url {
                    http_builder = http_builder.base_url(url);
                }
                let client = http_builder.build()?;

                Ok($client { client, store })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client<S: $store_trait> {
            /// Low-level gateway client.
            client: $http_client,
            /// Store backend.
            store: S,
        }

        impl<S: $store_trait> $client<S> {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder<S> {
                $builder {
                    merchant_code: None,
                    api_key: None,
                    sandbox: true,
                    base_url: None,
                    store: None,
                }
            }

            /// Creates a gateway transaction and records it locally as
            /// pending.
            ///
            /// Retries of a failed call must reuse the same merchant
            /// order id (the gateway deduplicates on it).
            ///
            /// # Errors
            ///
            /// Returns an error if the gateway call or the store write
            /// fails.
            #[tracing::instrument(skip_all, fields(order_id = %request.merchant_order_id))]
            pub $($async_kw)? fn pay(
                &self,
                request: TransactionRequest,
            ) -> Result<TransactionResponse> {
                let order_id = request.merchant_order_id.clone();
                let amount = request.payment_amount;
                let method_code = request.payment_method.clone();
                let response = self.client.create_transaction(request) $( .$await_ext )? ?;
                let record = OrderRecord::pending(
                    order_id,
                    Some(response.reference.clone()),
                    amount,
                    Some(method_code),
                    Utc::now(),
                );
                self.store.upsert_order(record) $( .$await_ext )? ?;
                tracing::debug!(reference = %response.reference, "transaction recorded");
                Ok(response)
            }

            /// Polls the gateway for a transaction's state and persists
            /// the answer.
            ///
            /// An order the store has never seen (e.g. created before
            /// the store existed) is recorded from the gateway's
            /// response instead of failing.
            ///
            /// # Errors
            ///
            /// Returns an error if the gateway call or the store write
            /// fails.
            #[tracing::instrument(skip_all, fields(order_id = %merchant_order_id))]
            pub $($async_kw)? fn refresh_status(
                &self,
                merchant_order_id: &MerchantOrderId,
            ) -> Result<StatusResponse> {
                let response = self.client.transaction_status(merchant_order_id) $( .$await_ext )? ?;
                let known = self.store.order(merchant_order_id) $( .$await_ext )? ?;
                if known.is_some() {
                    self.store
                        .set_order_status(merchant_order_id, response.status_code, Utc::now())
                        $( .$await_ext )? ?;
                } else {
                    let mut record = OrderRecord::pending(
                        merchant_order_id.clone(),
                        response.reference.clone(),
                        parse_amount(response.amount.as_deref()),
                        None,
                        Utc::now(),
                    );
                    record.status = response.status_code;
                    self.store.upsert_order(record) $( .$await_ext )? ?;
                }
                Ok(response)
            }

            /// Validates a voucher for the given order total, then
            /// atomically redeems it. Returns the discount in whole
            /// Rupiah.
            ///
            /// The validation reads a snapshot; the redemption
            /// re-checks the usage limit under the store's lock, so a
            /// concurrent checkout racing for the last redemption
            /// loses cleanly with a usage-limit rejection.
            ///
            /// # Errors
            ///
            /// Returns [`DuitkuError::VoucherNotFound`] for an unknown
            /// code and [`DuitkuError::VoucherRejected`] when the
            /// voucher does not apply.
            #[tracing::instrument(skip_all, fields(code = %code))]
            pub $($async_kw)? fn apply_voucher(
                &self,
                code: &VoucherCode,
                total_amount: i64,
                now: DateTime<Utc>,
            ) -> Result<i64> {
                let voucher = self
                    .store
                    .voucher(code)
                    $( .$await_ext )? ?
                    .ok_or_else(|| DuitkuError::VoucherNotFound(code.to_string()))?;
                let discount = voucher.discount(total_amount, now)?;
                let _redeemed = self.store.redeem_voucher(code) $( .$await_ext )? ?;
                tracing::debug!(discount, "voucher redeemed");
                Ok(discount)
            }

            /// Verifies an inbound callback and persists the payment
            /// result it carries.
            ///
            /// Verification fails closed: a bad signature rejects the
            /// whole notification before any state changes.
            ///
            /// # Errors
            ///
            /// Returns [`DuitkuError::InvalidSignature`] for a forged
            /// or corrupted callback, or an error if the store write
            /// fails.
            #[tracing::instrument(skip_all, fields(order_id = %callback.merchant_order_id))]
            pub $($async_kw)? fn handle_callback(
                &self,
                callback: &CallbackNotification,
            ) -> Result<TransactionStatus> {
                callback.verify(self.client.api_key())?;
                let known = self.store.order(&callback.merchant_order_id) $( .$await_ext )? ?;
                if known.is_some() {
                    self.store
                        .set_order_status(
                            &callback.merchant_order_id,
                            callback.result_code,
                            Utc::now(),
                        )
                        $( .$await_ext )? ?;
                } else {
                    let mut record = OrderRecord::pending(
                        callback.merchant_order_id.clone(),
                        Some(callback.reference.clone()),
                        parse_amount(Some(&callback.amount)),
                        callback.payment_code.clone(),
                        Utc::now(),
                    );
                    record.status = callback.result_code;
                    self.store.upsert_order(record) $( .$await_ext )? ?;
                }
                tracing::debug!(status = callback.result_code.label(), "callback applied");
                Ok(callback.result_code)
            }

            /// Returns all locally recorded orders.
            ///
            /// # Errors
            ///
            /// Returns an error if the store fails to read.
            #[inline]
            pub $($async_kw)? fn orders(&self) -> Result<Vec<OrderRecord>> {
                self.store.orders() $( .$await_ext )?
            }

            /// Builds an amount-bearing QRIS payload from a merchant's
            /// static one.
            ///
            /// Convenience wrapper over [`crate::qris::build_dynamic`]
            /// for merchants who render their own QR instead of using
            /// the gateway-returned string.
            ///
            /// # Errors
            ///
            /// Propagates QRIS codec errors for a malformed static
            /// payload.
            #[inline]
            pub fn dynamic_qris(static_qris: &str, amount: i64) -> Result<String> {
                crate::qris::build_dynamic(static_qris, amount)
            }

            /// Returns a reference to the underlying gateway client.
            #[inline]
            #[must_use]
            pub const fn inner_client(&self) -> &$http_client {
                &self.client
            }

            /// Returns a reference to the store backend.
            #[inline]
            #[must_use]
            pub const fn store(&self) -> &S {
                &self.store
            }
        }
    };
}

// ── Async variant ───────────────────────────────────────────────────────

#[cfg(feature = "async")]
mod async_checkout {
    //! Async high-level client.

    use chrono::{DateTime, Utc};
    use secrecy::SecretString;

    use super::parse_amount;
    use crate::client::DuitkuClient;
    use crate::config::DuitkuConfig;
    use crate::error::{DuitkuError, Result};
    use crate::models::{
        CallbackNotification, MerchantOrderId, OrderRecord, StatusResponse, TransactionRequest,
        TransactionResponse, TransactionStatus, VoucherCode,
    };
    use crate::store::Store;

    define_checkout! {
        client_name: Checkout,
        builder_name: CheckoutBuilder,
        http_client: DuitkuClient,
        store_trait: Store,
        client_doc: "High-level async checkout client with integrated storage.\n\nUse [`Checkout::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`Checkout`] client.",
        async_kw: async,
        await_kw: await,
    }
}

// ── Blocking variant ────────────────────────────────────────────────────

#[cfg(feature = "blocking")]
mod blocking_checkout {
    //! Blocking high-level client.

    use chrono::{DateTime, Utc};
    use secrecy::SecretString;

    use super::parse_amount;
    use crate::client::DuitkuBlockingClient;
    use crate::config::DuitkuConfig;
    use crate::error::{DuitkuError, Result};
    use crate::models::{
        CallbackNotification, MerchantOrderId, OrderRecord, StatusResponse, TransactionRequest,
        TransactionResponse, TransactionStatus, VoucherCode,
    };
    use crate::store::BlockingStore;

    define_checkout! {
        client_name: CheckoutBlocking,
        builder_name: CheckoutBlockingBuilder,
        http_client: DuitkuBlockingClient,
        store_trait: BlockingStore,
        client_doc: "High-level blocking checkout client with integrated storage.\n\nUse [`CheckoutBlocking::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`CheckoutBlocking`] client.",
    }
}

#[cfg(feature = "async")]
pub use async_checkout::{Checkout, CheckoutBuilder};
#[cfg(feature = "blocking")]
pub use blocking_checkout::{CheckoutBlocking, CheckoutBlockingBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_accepts_plain_and_fractional() {
        assert_eq!(parse_amount(Some("150000")), 150_000);
        assert_eq!(parse_amount(Some("150000.00")), 150_000);
        assert_eq!(parse_amount(Some("not-a-number")), 0);
        assert_eq!(parse_amount(None), 0);
    }
}
