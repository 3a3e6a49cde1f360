//! HTTP client for the Duitku gateway API.
//!
//! Provides both async and blocking client variants behind feature flags.
//! Authentication is carried in the request body as a keyed-hash
//! signature (see [`crate::signature`]), not in headers.

use chrono::{DateTime, FixedOffset, Utc};

/// Base URL of the sandbox environment.
const SANDBOX_BASE_URL: &str = "https://sandbox.duitku.com";

/// Base URL of the production environment.
const PRODUCTION_BASE_URL: &str = "https://passport.duitku.com";

/// Payment-method listing endpoint path.
const PAYMENT_METHOD_PATH: &str = "/webapi/api/merchant/paymentmethod/getpaymentmethod";

/// Transaction-creation (inquiry) endpoint path.
const INQUIRY_PATH: &str = "/webapi/api/merchant/v2/inquiry";

/// Transaction-status endpoint path.
const STATUS_PATH: &str = "/webapi/api/merchant/transactionStatus";

/// Gateway response code meaning success.
const GATEWAY_OK: &str = "00";

/// Gateway timestamp format, `YYYY-MM-DD HH:MM:SS`.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Western Indonesian Time (UTC+7), the clock the gateway validates
/// request timestamps against.
const WIB_OFFSET_SECS: i32 = 7 * 3600;

/// Formats an instant the way the gateway expects.
///
/// The same literal string must go into the request body and the
/// signature, so this is computed once per request.
fn gateway_datetime(now: DateTime<Utc>) -> String {
    FixedOffset::east_opt(WIB_OFFSET_SECS).map_or_else(
        || now.format(DATETIME_FORMAT).to_string(),
        |wib| now.with_timezone(&wib).format(DATETIME_FORMAT).to_string(),
    )
}

/// Generates a Duitku client (async or blocking) with builder, methods,
/// and tests.
macro_rules! define_client {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_type: $http_type:ty,
        response_type: $resp_type:ty,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
        $(send_bound: $send_bound:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder {
            /// Merchant code issued by the gateway.
            merchant_code: Option<String>,
            /// Merchant API key.
            api_key: Option<SecretString>,
            /// Whether to target the sandbox environment.
            sandbox: bool,
            /// Base URL override (for testing).
            base_url: Option<String>,
        }

        impl $builder {
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

            /// Sets the merchant API key from an already-wrapped secret.
            #[inline]
            #[must_use]
            pub fn api_key_secret(mut self, key: SecretString) -> Self {
                self.api_key = Some(key);
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

            /// Builds the client.
            ///
            /// # Errors
            ///
            /// Returns [`DuitkuError::ConfigurationMissing`] if the
            /// merchant code or API key was not provided, and
            /// [`DuitkuError::Http`] if the HTTP client fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$client> {
                let merchant_code = self.merchant_code.ok_or_else(|| {
                    DuitkuError::ConfigurationMissing(MERCHANT_CODE_KEY.to_owned())
                })?;
                let api_key = self
                    .api_key
                    .ok_or_else(|| DuitkuError::ConfigurationMissing(API_KEY_KEY.to_owned()))?;
                let base_url = self.base_url.unwrap_or_else(|| {
                    if self.sandbox {
                        SANDBOX_BASE_URL.to_owned()
                    } else {
                        PRODUCTION_BASE_URL.to_owned()
                    }
                });
                tracing::debug!(base_url = %base_url, merchant_code = %merchant_code, "building client");
                let http = <$http_type>::builder().build()?;

                Ok($client {
                    http,
                    merchant_code,
                    api_key,
                    base_url,
                })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// Merchant code issued by the gateway.
            merchant_code: String,
            /// Merchant API key; never logged.
            api_key: SecretString,
            /// API base URL.
            base_url: String,
        }

        impl $client {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder {
                $builder {
                    merchant_code: None,
                    api_key: None,
                    sandbox: true,
                    base_url: None,
                }
            }

            /// Lists the payment methods available for an order of the
            /// given amount, with their fees.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server
            /// returns a non-success status, the response cannot be
            /// deserialized, or the gateway answers with a non-"00"
            /// response code ([`DuitkuError::Gateway`]).
            #[tracing::instrument(skip_all, fields(amount = amount))]
            pub $($async_kw)? fn payment_methods(
                &self,
                amount: i64,
            ) -> Result<PaymentMethodResponse> {
                let datetime = gateway_datetime(Utc::now());
                let signed = signature::payment_methods(
                    &self.merchant_code,
                    amount,
                    &datetime,
                    &self.api_key,
                );
                let request = PaymentMethodRequest {
                    merchant_code: self.merchant_code.clone(),
                    amount,
                    datetime,
                    signature: signed,
                };
                tracing::debug!("listing payment methods");
                let response: PaymentMethodResponse =
                    self.post_json(PAYMENT_METHOD_PATH, &request) $( .$await_ext )? ?;
                if response.response_code == GATEWAY_OK {
                    Ok(response)
                } else {
                    Err(DuitkuError::Gateway {
                        code: response.response_code,
                        message: response.response_message,
                    })
                }
            }

            /// Creates a gateway transaction (the v2 inquiry call).
            ///
            /// Retries of a failed call must reuse the same merchant
            /// order id: the signature covers it and the gateway
            /// deduplicates on it, so a fresh id on retry would create
            /// a second transaction.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server
            /// returns a non-success status, the response cannot be
            /// deserialized, or the gateway rejects the transaction
            /// ([`DuitkuError::Gateway`]).
            #[tracing::instrument(skip_all, fields(order_id = %request.merchant_order_id))]
            pub $($async_kw)? fn create_transaction(
                &self,
                request: TransactionRequest,
            ) -> Result<TransactionResponse> {
                let signed = signature::inquiry(
                    &self.merchant_code,
                    request.merchant_order_id.as_inner(),
                    request.payment_amount,
                    &self.api_key,
                );
                let body = InquiryRequest::from_parts(
                    self.merchant_code.clone(),
                    signed,
                    request,
                );
                tracing::debug!("creating transaction");
                let response: TransactionResponse =
                    self.post_json(INQUIRY_PATH, &body) $( .$await_ext )? ?;
                if response.status_code.is_success() {
                    Ok(response)
                } else {
                    Err(DuitkuError::Gateway {
                        code: response.status_code.code().to_owned(),
                        message: response.status_message,
                    })
                }
            }

            /// Queries the current state of a transaction.
            ///
            /// A cancelled or pending transaction is a valid answer,
            /// not an error — callers inspect
            /// [`StatusResponse::status_code`].
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server
            /// returns a non-success status, or the response cannot be
            /// deserialized.
            #[tracing::instrument(skip_all, fields(order_id = %merchant_order_id))]
            pub $($async_kw)? fn transaction_status(
                &self,
                merchant_order_id: &MerchantOrderId,
            ) -> Result<StatusResponse> {
                let signed = signature::status(
                    &self.merchant_code,
                    merchant_order_id.as_inner(),
                    &self.api_key,
                );
                let body = StatusRequest {
                    merchant_code: self.merchant_code.clone(),
                    merchant_order_id: merchant_order_id.clone(),
                    signature: signed,
                };
                tracing::debug!("checking transaction status");
                self.post_json(STATUS_PATH, &body) $( .$await_ext )?
            }

            /// Returns the configured merchant code.
            #[inline]
            #[must_use]
            pub fn merchant_code(&self) -> &str {
                &self.merchant_code
            }

            /// Returns the configured API key, for callback verification.
            #[inline]
            #[must_use]
            pub const fn api_key(&self) -> &SecretString {
                &self.api_key
            }

            /// Sends a JSON POST request and deserializes the response.
            #[tracing::instrument(skip_all, fields(path = %path))]
            $($async_kw)? fn post_json<
                Req: serde::Serialize $(+ $send_bound)?,
                Resp: serde::de::DeserializeOwned,
            >(
                &self,
                path: &str,
                request: &Req,
            ) -> Result<Resp> {
                let url = format!("{}{path}", self.base_url);
                tracing::trace!(url = %url, "sending POST request");
                let response: $resp_type = self
                    .http
                    .post(&url)
                    .header(CONTENT_TYPE, "application/json")
                    .json(request)
                    .send()
                    $( .$await_ext )?
                    ?;

                let status_code = response.status();
                tracing::debug!(status = %status_code, "received response");
                if status_code.is_success() {
                    let body = response.text() $( .$await_ext )? ?;
                    tracing::trace!(body_len = body.len(), "parsing response body");
                    serde_json::from_str(&body).map_err(DuitkuError::from)
                } else {
                    let message = response
                        .text()
                        $( .$await_ext )?
                        .unwrap_or_else(|_| "unknown error".to_owned());
                    tracing::debug!(status = status_code.as_u16(), message = %message, "API error");
                    Err(DuitkuError::Api {
                        status: status_code.as_u16(),
                        message,
                    })
                }
            }
        }

    };
}

#[cfg(feature = "async")]
mod async_client {
    //! Async HTTP client for the Duitku gateway.

    use reqwest::header::CONTENT_TYPE;
    use secrecy::SecretString;

    use super::{
        GATEWAY_OK, INQUIRY_PATH, PAYMENT_METHOD_PATH, PRODUCTION_BASE_URL, SANDBOX_BASE_URL,
        STATUS_PATH, gateway_datetime,
    };
    use crate::config::{API_KEY_KEY, DuitkuConfig, MERCHANT_CODE_KEY};
    use crate::error::{DuitkuError, Result};
    use crate::models::{
        InquiryRequest, MerchantOrderId, PaymentMethodRequest, PaymentMethodResponse,
        StatusRequest, StatusResponse, TransactionRequest, TransactionResponse,
    };
    use crate::signature;
    use chrono::Utc;

    define_client! {
        client_name: DuitkuClient,
        builder_name: DuitkuClientBuilder,
        http_type: reqwest::Client,
        response_type: reqwest::Response,
        client_doc: "Async client for the Duitku gateway API.\n\nUse [`DuitkuClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`DuitkuClient`].",
        async_kw: async,
        await_kw: await,
        send_bound: Sync,
    }
}

#[cfg(feature = "blocking")]
mod blocking_client {
    //! Blocking (synchronous) HTTP client for the Duitku gateway.

    use reqwest::header::CONTENT_TYPE;
    use secrecy::SecretString;

    use super::{
        GATEWAY_OK, INQUIRY_PATH, PAYMENT_METHOD_PATH, PRODUCTION_BASE_URL, SANDBOX_BASE_URL,
        STATUS_PATH, gateway_datetime,
    };
    use crate::config::{API_KEY_KEY, DuitkuConfig, MERCHANT_CODE_KEY};
    use crate::error::{DuitkuError, Result};
    use crate::models::{
        InquiryRequest, MerchantOrderId, PaymentMethodRequest, PaymentMethodResponse,
        StatusRequest, StatusResponse, TransactionRequest, TransactionResponse,
    };
    use crate::signature;
    use chrono::Utc;

    define_client! {
        client_name: DuitkuBlockingClient,
        builder_name: DuitkuBlockingClientBuilder,
        http_type: reqwest::blocking::Client,
        response_type: reqwest::blocking::Response,
        client_doc: "Blocking (synchronous) client for the Duitku gateway API.\n\nUse [`DuitkuBlockingClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`DuitkuBlockingClient`].",
    }
}

#[cfg(feature = "async")]
pub use async_client::{DuitkuClient, DuitkuClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_client::{DuitkuBlockingClient, DuitkuBlockingClientBuilder};

#[cfg(test)]
mod datetime_tests {
    use super::*;
    use chrono::TimeZone as _;

    #[test]
    fn gateway_datetime_is_wib() {
        // 03:00 UTC is 10:00 in Jakarta.
        let utc = Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap();
        assert_eq!(gateway_datetime(utc), "2024-06-01 10:00:00");
    }

    #[test]
    fn gateway_datetime_rolls_over_midnight() {
        let utc = Utc.with_ymd_and_hms(2024, 6, 1, 20, 30, 0).unwrap();
        assert_eq!(gateway_datetime(utc), "2024-06-02 03:30:00");
    }
}
