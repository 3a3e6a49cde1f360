//! Tag-Length-Value codec for the EMVCo QR subset used by QRIS.
//!
//! Every record is `tag` (2 decimal digits) + `length` (2 decimal digits,
//! zero-padded) + `value` (exactly `length` characters). The two-digit
//! length field caps values at 99 characters; longer values are rejected,
//! never truncated.

use std::collections::HashMap;

use crate::error::{DuitkuError, Result};

/// Maximum value length representable by the two-digit length field.
const MAX_VALUE_LEN: usize = 99;

/// A single decoded Tag-Length-Value record.
///
/// Kept as a sequence element (not a map entry) because QRIS permits
/// repeated tags — the merchant-account templates 26–51 may legally
/// coexist — and their original relative order is significant when
/// re-emitting a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvRecord {
    /// Two-digit decimal tag.
    pub tag: String,
    /// Value string, at most 99 characters.
    pub value: String,
}

impl TlvRecord {
    /// Re-encodes this record to its wire form.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`encode`].
    #[inline]
    pub fn encoded(&self) -> Result<String> {
        encode(&self.tag, &self.value)
    }
}

/// Encodes a single TLV record.
///
/// # Errors
///
/// Returns [`DuitkuError::MalformedTag`] if `tag` is not exactly two
/// ASCII decimal digits, [`DuitkuError::NonAsciiValue`] if `value`
/// contains characters outside printable ASCII, and
/// [`DuitkuError::ValueTooLong`] if `value` exceeds 99 characters.
#[inline]
pub fn encode(tag: &str, value: &str) -> Result<String> {
    if !is_tag(tag) {
        return Err(DuitkuError::MalformedTag { offset: 0 });
    }
    if !is_printable_ascii(value) {
        return Err(DuitkuError::NonAsciiValue {
            tag: tag.to_owned(),
        });
    }
    let length = value.len();
    if length > MAX_VALUE_LEN {
        return Err(DuitkuError::ValueTooLong {
            tag: tag.to_owned(),
            length,
        });
    }
    Ok(format!("{tag}{length:02}{value}"))
}

/// Parses a TLV string into its ordered record sequence.
///
/// Preserves duplicates and original relative order. Concatenating the
/// [`TlvRecord::encoded`] form of every returned record reproduces the
/// input byte-for-byte.
///
/// # Errors
///
/// - [`DuitkuError::TrailingBytes`] — leftover input too short to form
///   another tag + length header (a truncated or corrupted payload);
/// - [`DuitkuError::MalformedTag`] — a tag position holds non-digits;
/// - [`DuitkuError::MalformedLength`] — a length position holds
///   non-digits;
/// - [`DuitkuError::TruncatedValue`] — a record declares more value
///   characters than remain.
pub fn parse_records(source: &str) -> Result<Vec<TlvRecord>> {
    let total = source.len();
    let mut records = Vec::new();
    let mut offset = 0_usize;
    while offset < total {
        let remaining = total - offset;
        if remaining < 4 {
            return Err(DuitkuError::TrailingBytes { offset, remaining });
        }
        let tag = source
            .get(offset..offset + 2)
            .filter(|candidate| is_tag(candidate))
            .ok_or(DuitkuError::MalformedTag { offset })?;
        let declared = source
            .get(offset + 2..offset + 4)
            .and_then(decimal_pair)
            .ok_or(DuitkuError::MalformedLength { offset: offset + 2 })?;
        let value_start = offset + 4;
        let Some(value) = source.get(value_start..value_start + declared) else {
            return Err(DuitkuError::TruncatedValue {
                tag: tag.to_owned(),
                declared,
                remaining: total.saturating_sub(value_start),
            });
        };
        records.push(TlvRecord {
            tag: tag.to_owned(),
            value: value.to_owned(),
        });
        offset = value_start + declared;
    }
    Ok(records)
}

/// Parses a TLV string into a simplified tag → value mapping.
///
/// Repeated tags keep the last-seen value. Callers that must preserve
/// repeats and ordering (the merchant-account templates) should use
/// [`parse_records`] instead.
///
/// # Errors
///
/// Returns the same errors as [`parse_records`].
#[inline]
pub fn parse(source: &str) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for record in parse_records(source)? {
        let _last = map.insert(record.tag, record.value);
    }
    Ok(map)
}

/// Returns `true` if `candidate` is exactly two ASCII decimal digits.
fn is_tag(candidate: &str) -> bool {
    candidate.len() == 2 && candidate.bytes().all(|byte| byte.is_ascii_digit())
}

/// Returns `true` if every byte is printable ASCII (0x20–0x7E).
fn is_printable_ascii(value: &str) -> bool {
    value.bytes().all(|byte| (0x20..=0x7E).contains(&byte))
}

/// Interprets a two-digit string as an integer 0–99.
fn decimal_pair(text: &str) -> Option<usize> {
    if text.len() == 2 && text.bytes().all(|byte| byte.is_ascii_digit()) {
        Some(
            text.bytes()
                .fold(0_usize, |acc, byte| acc * 10 + usize::from(byte - b'0')),
        )
    } else {
        None
    }
}
