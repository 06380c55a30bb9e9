//! Human-readable identifiers
//!
//! - Certificate number: `SB-{YYYYMMDD}-{8 hex}`
//! - Order number (merchant_uid): `ORD-{YYYYMMDD}-{12 hex}`
//!
//! Uniqueness is probabilistic; the database carries a unique constraint on
//! certificate numbers and the issuer regenerates on conflict.

use chrono::NaiveDate;

pub const CERTIFICATE_PREFIX: &str = "SB";
pub const ORDER_PREFIX: &str = "ORD";

/// Generate a certificate number for `date`.
pub fn certificate_number(date: NaiveDate) -> String {
    certificate_number_with(date, rand::random::<[u8; 4]>())
}

/// Deterministic variant used by tests.
pub fn certificate_number_with(date: NaiveDate, suffix: [u8; 4]) -> String {
    format!(
        "{}-{}-{}",
        CERTIFICATE_PREFIX,
        date.format("%Y%m%d"),
        hex::encode_upper(suffix)
    )
}

/// Generate an order number (merchant_uid) for `date`.
pub fn merchant_uid(date: NaiveDate) -> String {
    format!(
        "{}-{}-{}",
        ORDER_PREFIX,
        date.format("%Y%m%d"),
        hex::encode_upper(rand::random::<[u8; 6]>())
    )
}

/// Check the `SB-YYYYMMDD-XXXXXXXX` shape.
pub fn is_certificate_number(value: &str) -> bool {
    matches_shape(value, CERTIFICATE_PREFIX, 8)
}

/// Check the `ORD-YYYYMMDD-XXXXXXXXXXXX` shape.
pub fn is_merchant_uid(value: &str) -> bool {
    matches_shape(value, ORDER_PREFIX, 12)
}

fn matches_shape(value: &str, prefix: &str, suffix_len: usize) -> bool {
    let mut parts = value.splitn(3, '-');
    let (Some(p), Some(date), Some(suffix)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    p == prefix
        && NaiveDate::parse_from_str(date, "%Y%m%d").is_ok()
        && suffix.len() == suffix_len
        && suffix
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
}
