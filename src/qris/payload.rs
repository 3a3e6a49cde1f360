//! Dynamic QRIS payload construction and verification.

use crate::error::{DuitkuError, Result};
use crate::qris::crc::crc16;
use crate::qris::tlv::{self, TlvRecord};

/// Payload format indicator tag.
const TAG_PAYLOAD_FORMAT: &str = "00";
/// Point-of-initiation method tag.
const TAG_INITIATION: &str = "01";
/// Merchant category code tag.
const TAG_MCC: &str = "52";
/// Transaction currency tag.
const TAG_CURRENCY: &str = "53";
/// Transaction amount tag.
const TAG_AMOUNT: &str = "54";
/// Country code tag.
const TAG_COUNTRY: &str = "58";
/// Merchant name tag.
const TAG_MERCHANT_NAME: &str = "59";
/// Merchant city tag.
const TAG_MERCHANT_CITY: &str = "60";
/// Postal code tag.
const TAG_POSTAL_CODE: &str = "61";
/// Additional data field template tag.
const TAG_ADDITIONAL_DATA: &str = "62";
/// CRC tag.
const TAG_CRC: &str = "63";

/// Point-of-initiation value marking an amount-bearing (dynamic) payload.
const INITIATION_DYNAMIC: &str = "12";
/// ISO 4217 numeric code for the Indonesian Rupiah.
const CURRENCY_IDR: &str = "360";
/// ISO 3166 country code for Indonesia.
const COUNTRY_ID: &str = "ID";
/// CRC tag + length header; the length is always 04 for a 4-hex-digit CRC.
const CRC_HEADER: &str = "6304";

/// First merchant-account-template tag, inclusive.
const MERCHANT_ACCOUNT_FIRST: u8 = 26;
/// Last merchant-account-template tag, inclusive.
const MERCHANT_ACCOUNT_LAST: u8 = 51;

/// Builds an amount-bearing QRIS payload from a merchant's static one.
///
/// For `amount <= 0` the static string is returned unchanged: it is
/// already a complete, checksummed payload, and rebuilding it without
/// an amount would be lossy. Otherwise the static payload is parsed
/// and re-emitted in canonical order — format indicator, dynamic
/// initiation method, the merchant-account templates (tags 26–51,
/// copied verbatim with duplicates and original order preserved),
/// merchant category code, currency `360`, the amount in whole Rupiah,
/// country `ID`, merchant name/city, postal code and additional data
/// when present — and terminated with a freshly computed CRC.
///
/// Output is byte-identical across calls for fixed inputs.
///
/// # Errors
///
/// Propagates any TLV codec error raised while parsing `static_qris`;
/// a malformed merchant QRIS is a configuration problem that must
/// surface rather than produce an unchecksummed or partial payload.
pub fn build_dynamic(static_qris: &str, amount: i64) -> Result<String> {
    if amount <= 0 {
        return Ok(static_qris.to_owned());
    }
    let records = tlv::parse_records(static_qris)?;

    let mut out = String::new();
    out.push_str(&tlv::encode(TAG_PAYLOAD_FORMAT, "01")?);
    out.push_str(&tlv::encode(TAG_INITIATION, INITIATION_DYNAMIC)?);
    for record in &records {
        if is_merchant_account_tag(&record.tag) {
            out.push_str(&record.encoded()?);
        }
    }
    push_copied(&mut out, &records, TAG_MCC)?;
    out.push_str(&tlv::encode(TAG_CURRENCY, CURRENCY_IDR)?);
    out.push_str(&tlv::encode(TAG_AMOUNT, &amount.to_string())?);
    out.push_str(&tlv::encode(TAG_COUNTRY, COUNTRY_ID)?);
    push_copied(&mut out, &records, TAG_MERCHANT_NAME)?;
    push_copied(&mut out, &records, TAG_MERCHANT_CITY)?;
    push_copied(&mut out, &records, TAG_POSTAL_CODE)?;
    push_copied(&mut out, &records, TAG_ADDITIONAL_DATA)?;

    out.push_str(CRC_HEADER);
    let checksum = crc16(&out);
    out.push_str(&checksum);
    Ok(out)
}

/// Checks that `payload` is structurally valid TLV and that its trailing
/// CRC record matches the checksum recomputed over everything preceding
/// it (including the `6304` header itself).
///
/// # Errors
///
/// Propagates TLV parse errors; returns [`DuitkuError::MissingChecksum`]
/// if the final record is not a 4-character tag-63 record, and
/// [`DuitkuError::ChecksumMismatch`] if the carried CRC is wrong.
pub fn verify(payload: &str) -> Result<()> {
    let records = tlv::parse_records(payload)?;
    let Some(last) = records.last() else {
        return Err(DuitkuError::MissingChecksum);
    };
    if last.tag != TAG_CRC || last.value.len() != 4 {
        return Err(DuitkuError::MissingChecksum);
    }
    let body = payload
        .len()
        .checked_sub(4)
        .and_then(|body_len| payload.get(..body_len))
        .ok_or(DuitkuError::MissingChecksum)?;
    let expected = crc16(body);
    if last.value == expected {
        Ok(())
    } else {
        Err(DuitkuError::ChecksumMismatch {
            expected,
            found: last.value.clone(),
        })
    }
}

/// Copies the last-seen value of `tag` from the parsed static payload,
/// skipping absent tags.
fn push_copied(out: &mut String, records: &[TlvRecord], tag: &str) -> Result<()> {
    if let Some(record) = records.iter().rev().find(|record| record.tag == tag) {
        out.push_str(&record.encoded()?);
    }
    Ok(())
}

/// Returns `true` if `tag` falls in the merchant-account-template
/// range 26–51 inclusive.
fn is_merchant_account_tag(tag: &str) -> bool {
    tag.bytes()
        .try_fold(0_u8, |acc, byte| {
            byte.is_ascii_digit()
                .then(|| acc.wrapping_mul(10).wrapping_add(byte - b'0'))
        })
        .is_some_and(|numeric| (MERCHANT_ACCOUNT_FIRST..=MERCHANT_ACCOUNT_LAST).contains(&numeric))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qris::tlv::{encode, parse};

    /// Assembles a realistic checksummed static QRIS fixture.
    fn static_fixture() -> String {
        let account = [
            encode("00", "ID.CO.EXAMPLE.WWW").unwrap(),
            encode("01", "936000140000000001").unwrap(),
        ]
        .concat();
        let mut body = [
            encode("00", "01").unwrap(),
            encode("01", "11").unwrap(),
            encode("26", &account).unwrap(),
            encode("52", "5732").unwrap(),
            encode("53", "360").unwrap(),
            encode("58", "ID").unwrap(),
            encode("59", "TOKO CONTOH").unwrap(),
            encode("60", "JAKARTA").unwrap(),
            encode("61", "10110").unwrap(),
        ]
        .concat();
        body.push_str(CRC_HEADER);
        let checksum = crc16(&body);
        format!("{body}{checksum}")
    }

    #[test]
    fn zero_and_negative_amounts_pass_static_through() {
        let fixture = static_fixture();
        assert_eq!(build_dynamic(&fixture, 0).unwrap(), fixture);
        assert_eq!(build_dynamic(&fixture, -1).unwrap(), fixture);
    }

    #[test]
    fn dynamic_payload_embeds_amount_record() {
        let dynamic = build_dynamic(&static_fixture(), 15_000).unwrap();
        assert!(dynamic.contains("540515000"));
    }

    #[test]
    fn dynamic_payload_switches_initiation_method() {
        let dynamic = build_dynamic(&static_fixture(), 15_000).unwrap();
        let map = parse(&dynamic).unwrap();
        assert_eq!(map.get("01").map(String::as_str), Some("12"));
        assert_eq!(map.get("53").map(String::as_str), Some("360"));
        assert_eq!(map.get("54").map(String::as_str), Some("15000"));
        assert_eq!(map.get("58").map(String::as_str), Some("ID"));
    }

    #[test]
    fn dynamic_payload_copies_merchant_fields() {
        let fixture = static_fixture();
        let source = parse(&fixture).unwrap();
        let dynamic = parse(&build_dynamic(&fixture, 25_000).unwrap()).unwrap();
        for tag in ["26", "52", "59", "60", "61"] {
            assert_eq!(dynamic.get(tag), source.get(tag), "tag {tag} differs");
        }
    }

    #[test]
    fn dynamic_payload_ends_with_valid_checksum() {
        let dynamic = build_dynamic(&static_fixture(), 15_000).unwrap();
        verify(&dynamic).unwrap();

        // The final record is tag 63 with the CRC of everything before it.
        let records = tlv::parse_records(&dynamic).unwrap();
        let last = records.last().unwrap();
        assert_eq!(last.tag, "63");
        let body = dynamic.get(..dynamic.len() - 4).unwrap();
        assert_eq!(last.value, crc16(body));
    }

    #[test]
    fn repeated_merchant_account_templates_survive_in_order() {
        let mut body = [
            encode("00", "01").unwrap(),
            encode("01", "11").unwrap(),
            encode("26", "first-network").unwrap(),
            encode("27", "second-network").unwrap(),
            encode("26", "third-network").unwrap(),
            encode("53", "360").unwrap(),
            encode("58", "ID").unwrap(),
            encode("59", "TOKO").unwrap(),
            encode("60", "BANDUNG").unwrap(),
        ]
        .concat();
        body.push_str(CRC_HEADER);
        let checksum = crc16(&body);
        let fixture = format!("{body}{checksum}");

        let dynamic = build_dynamic(&fixture, 9_000).unwrap();
        let expected_run = [
            encode("26", "first-network").unwrap(),
            encode("27", "second-network").unwrap(),
            encode("26", "third-network").unwrap(),
        ]
        .concat();
        assert!(dynamic.contains(&expected_run));
    }

    #[test]
    fn output_is_deterministic() {
        let fixture = static_fixture();
        assert_eq!(
            build_dynamic(&fixture, 100_000).unwrap(),
            build_dynamic(&fixture, 100_000).unwrap()
        );
    }

    #[test]
    fn malformed_static_payload_aborts_build() {
        // Truncated fixture: chop the last value short.
        let fixture = static_fixture();
        let broken = fixture.get(..fixture.len() - 2).unwrap();
        assert!(build_dynamic(broken, 5_000).is_err());
    }

    #[test]
    fn verify_rejects_mutated_payload() {
        let dynamic = build_dynamic(&static_fixture(), 15_000).unwrap();
        // Flip one character inside the merchant name.
        let mutated: String = dynamic
            .chars()
            .map(|c| if c == 'J' { 'K' } else { c })
            .collect();
        assert!(matches!(
            verify(&mutated).unwrap_err(),
            DuitkuError::ChecksumMismatch { .. }
        ));
    }

    #[test]
    fn verify_rejects_payload_without_crc_record() {
        let body = [encode("00", "01").unwrap(), encode("58", "ID").unwrap()].concat();
        assert!(matches!(
            verify(&body).unwrap_err(),
            DuitkuError::MissingChecksum
        ));
        assert!(matches!(
            verify("").unwrap_err(),
            DuitkuError::MissingChecksum
        ));
    }

    #[test]
    fn merchant_account_range_boundaries() {
        assert!(is_merchant_account_tag("26"));
        assert!(is_merchant_account_tag("51"));
        assert!(!is_merchant_account_tag("25"));
        assert!(!is_merchant_account_tag("52"));
        assert!(!is_merchant_account_tag("00"));
    }
}
