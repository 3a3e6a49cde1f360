//! QRIS merchant-presented QR payload handling.
//!
//! QRIS is Indonesia's national profile of the EMVCo merchant-presented
//! QR code format: a string of Tag-Length-Value records terminated by a
//! CRC-16/CCITT-FALSE checksum. This module parses a merchant's static
//! QRIS string and re-emits it as a dynamic (amount-bearing) payload,
//! ready to be rendered as a scannable QR symbol.

pub mod crc;
pub mod tlv;

mod payload;

pub use payload::{build_dynamic, verify};
