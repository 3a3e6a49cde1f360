//! Error types for the Duitku client library.

/// Crate-wide result alias defaulting to [`DuitkuError`].
pub type Result<T, E = DuitkuError> = core::result::Result<T, E>;

/// All errors that can occur when using the Duitku client.
#[derive(Debug, thiserror::Error)]
pub enum DuitkuError {
    /// A TLV value exceeded the 99-character limit of the two-digit
    /// length field.
    #[error("TLV value for tag {tag} is {length} characters, the maximum is 99")]
    ValueTooLong {
        /// Tag whose value was too long.
        tag: String,
        /// Actual character length of the rejected value.
        length: usize,
    },

    /// A TLV tag was not two ASCII decimal digits.
    #[error("malformed TLV tag at offset {offset}")]
    MalformedTag {
        /// Byte offset of the offending tag within the source string.
        offset: usize,
    },

    /// A TLV length field could not be parsed as an integer 0–99.
    #[error("malformed TLV length at offset {offset}")]
    MalformedLength {
        /// Byte offset of the offending length field.
        offset: usize,
    },

    /// A TLV record declared more value characters than the input holds.
    #[error("TLV value for tag {tag} declares {declared} characters but only {remaining} remain")]
    TruncatedValue {
        /// Tag whose value was cut short.
        tag: String,
        /// Declared value length.
        declared: usize,
        /// Characters actually remaining in the input.
        remaining: usize,
    },

    /// Leftover input after the last complete TLV record, too short to
    /// form another tag + length header.
    #[error("{remaining} trailing characters at offset {offset} do not form a TLV record")]
    TrailingBytes {
        /// Byte offset where the leftover begins.
        offset: usize,
        /// Number of leftover characters.
        remaining: usize,
    },

    /// A TLV value contained characters outside printable ASCII.
    ///
    /// QRIS field values are limited to the EMVCo alphanumeric-special
    /// set; anything wider desynchronizes byte-counting decoders.
    #[error("TLV value for tag {tag} contains non-ASCII characters")]
    NonAsciiValue {
        /// Tag whose value was rejected.
        tag: String,
    },

    /// A QRIS payload ended without a final CRC record.
    #[error("QRIS payload has no trailing CRC record")]
    MissingChecksum,

    /// A QRIS payload's trailing CRC did not match the recomputed value.
    #[error("QRIS checksum mismatch: payload carries {found}, computed {expected}")]
    ChecksumMismatch {
        /// CRC recomputed over the payload body.
        expected: String,
        /// CRC carried by the payload.
        found: String,
    },

    /// An inbound callback signature did not match the recomputed one.
    ///
    /// Deliberately carries no detail: neither the supplied nor the
    /// recomputed signature may leak into logs or responses.
    #[error("callback signature verification failed")]
    InvalidSignature,

    /// The gateway answered with a non-success response code.
    #[error("gateway rejected the request (code {code}): {message}")]
    Gateway {
        /// Gateway response/status code (e.g. "02").
        code: String,
        /// Gateway-supplied message, verbatim.
        message: String,
    },

    /// The gateway answered with a non-success HTTP status.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        message: String,
    },

    /// Underlying HTTP transport failed.
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required configuration value (merchant code, API key) is absent.
    #[error("required configuration value is missing: {0}")]
    ConfigurationMissing(String),

    /// Order/voucher storage backend failed.
    #[error("storage error: {0}")]
    Storage(Box<dyn core::error::Error + Send + Sync>),

    /// No voucher with the given code exists.
    #[error("voucher {0} not found")]
    VoucherNotFound(String),

    /// A voucher exists but cannot be applied to this purchase.
    #[error("voucher rejected: {0}")]
    VoucherRejected(#[from] VoucherRejection),

    /// No locally recorded order with the given merchant order id.
    #[error("order {0} not found")]
    OrderNotFound(String),
}

/// Reasons a voucher is refused for a given purchase.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoucherRejection {
    /// The voucher is disabled.
    #[error("voucher is inactive")]
    Inactive,

    /// The voucher's validity window has not started yet.
    #[error("voucher is not valid yet")]
    NotYetValid,

    /// The voucher's validity window has passed.
    #[error("voucher has expired")]
    Expired,

    /// The order total is below the voucher's minimum purchase.
    #[error("order total {actual} is below the minimum purchase of {required}")]
    BelowMinimumPurchase {
        /// Minimum purchase required by the voucher.
        required: i64,
        /// Actual order total.
        actual: i64,
    },

    /// The voucher has been redeemed as many times as allowed.
    #[error("voucher usage limit reached")]
    UsageLimitReached,
}
