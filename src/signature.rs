//! Keyed-hash signatures for the Duitku gateway contract.
//!
//! Duitku authenticates merchant requests with deterministic digests
//! over concatenated request fields and the merchant API key: MD5 for
//! transaction creation, status checks and inbound callbacks, SHA-256
//! for the payment-method listing. Every function here is a pure
//! string transform — no I/O, no clock, no hidden state — and the API
//! key is taken as a [`SecretString`] so it never appears in logs or
//! error output.

use md5::Md5;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::error::{DuitkuError, Result};

/// Signature for transaction creation (the v2 inquiry endpoint).
///
/// `md5(merchantCode + merchantOrderId + paymentAmount + apiKey)`,
/// with the amount rendered as a bare integer exactly as it appears in
/// the request body.
#[inline]
#[must_use]
pub fn inquiry(
    merchant_code: &str,
    merchant_order_id: &str,
    payment_amount: i64,
    api_key: &SecretString,
) -> String {
    md5_hex(&format!(
        "{merchant_code}{merchant_order_id}{payment_amount}{}",
        api_key.expose_secret()
    ))
}

/// Signature for the payment-method listing.
///
/// `sha256(merchantCode + amount + datetime + apiKey)` — `datetime`
/// must be the exact literal string sent in the request body
/// (`YYYY-MM-DD HH:MM:SS`); compute it once and reuse it for both.
#[inline]
#[must_use]
pub fn payment_methods(
    merchant_code: &str,
    amount: i64,
    datetime: &str,
    api_key: &SecretString,
) -> String {
    let digest = Sha256::digest(format!(
        "{merchant_code}{amount}{datetime}{}",
        api_key.expose_secret()
    ));
    hex::encode(digest)
}

/// Signature for a transaction status check.
///
/// `md5(merchantCode + merchantOrderId + apiKey)`.
#[inline]
#[must_use]
pub fn status(merchant_code: &str, merchant_order_id: &str, api_key: &SecretString) -> String {
    md5_hex(&format!(
        "{merchant_code}{merchant_order_id}{}",
        api_key.expose_secret()
    ))
}

/// Signature the gateway attaches to inbound callbacks.
///
/// `md5(merchantCode + amount + merchantOrderId + apiKey)` — note that
/// the amount precedes the order id here, unlike [`inquiry`], and that
/// the amount is the literal string from the callback body.
#[inline]
#[must_use]
pub fn callback(
    merchant_code: &str,
    amount: &str,
    merchant_order_id: &str,
    api_key: &SecretString,
) -> String {
    md5_hex(&format!(
        "{merchant_code}{amount}{merchant_order_id}{}",
        api_key.expose_secret()
    ))
}

/// Verifies an inbound callback signature, failing closed.
///
/// Recomputes [`callback`] over the supplied fields and compares
/// byte-for-byte against `supplied`.
///
/// # Errors
///
/// Returns [`DuitkuError::InvalidSignature`] on any mismatch. The error
/// intentionally carries neither the supplied nor the recomputed digest.
#[inline]
pub fn verify_callback(
    merchant_code: &str,
    amount: &str,
    merchant_order_id: &str,
    api_key: &SecretString,
    supplied: &str,
) -> Result<()> {
    let expected = callback(merchant_code, amount, merchant_order_id, api_key);
    if expected.as_bytes() == supplied.as_bytes() {
        Ok(())
    } else {
        Err(DuitkuError::InvalidSignature)
    }
}

/// Lowercase-hex MD5 of `input`.
fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input))
}
