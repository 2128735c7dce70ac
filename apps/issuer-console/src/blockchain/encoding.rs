// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client-side encoding of partitions, addresses and amounts.

use std::str::FromStr;

use alloy::primitives::{Address, B256, U256};

use crate::error::ValidationError;

/// Width of an on-chain partition identifier.
pub const PARTITION_BYTES: usize = 32;

/// Decimals of issued security tokens and reward tokens.
pub const TOKEN_DECIMALS: u8 = 18;

/// Encode a partition name as a right-padded `bytes32` identifier.
///
/// The UTF-8 bytes of the name come first, the remainder is zero-filled.
pub fn encode_partition(name: &str) -> Result<B256, ValidationError> {
    let bytes = name.as_bytes();
    if bytes.len() > PARTITION_BYTES {
        return Err(ValidationError::PartitionTooLong {
            name: name.to_string(),
            len: bytes.len(),
        });
    }

    let mut word = [0u8; PARTITION_BYTES];
    word[..bytes.len()].copy_from_slice(bytes);
    Ok(B256::from(word))
}

/// Encode every partition of a token, failing on the first invalid name.
pub fn encode_partitions(names: &[String]) -> Result<Vec<B256>, ValidationError> {
    names.iter().map(|name| encode_partition(name)).collect()
}

/// Reverse of [`encode_partition`]: strips the zero padding.
pub fn decode_partition(word: &B256) -> String {
    let end = word
        .iter()
        .rposition(|byte| *byte != 0)
        .map_or(0, |last| last + 1);
    String::from_utf8_lossy(&word[..end]).into_owned()
}

/// Parse a user-entered amount as a whole number of display units.
///
/// Only plain decimal digits are accepted: signs, fractions, exponents and
/// empty input are rejected before anything is submitted.
pub fn parse_whole_amount(input: &str) -> Result<u128, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidAmount(input.to_string()));
    }

    trimmed
        .parse::<u128>()
        .map_err(|_| ValidationError::InvalidAmount(input.to_string()))
}

/// Like [`parse_whole_amount`] but zero is rejected too.
pub fn parse_positive_amount(input: &str) -> Result<u128, ValidationError> {
    match parse_whole_amount(input)? {
        0 => Err(ValidationError::NonPositiveAmount),
        units => Ok(units),
    }
}

/// Convert whole display units to base units.
pub fn to_base_units(units: u128, decimals: u8) -> U256 {
    U256::from(units) * U256::from(10u64).pow(U256::from(decimals))
}

/// Parse a base-unit decimal string as returned by the backend.
pub fn parse_base_units(raw: &str) -> Option<U256> {
    U256::from_str_radix(raw.trim(), 10).ok()
}

/// Format base units for display, keeping at most six fractional digits.
pub fn format_units(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }

    let digits = remainder.to_string();
    let decimal_str = format!(
        "{}{}",
        "0".repeat((decimals as usize).saturating_sub(digits.len())),
        digits
    );
    let truncated = &decimal_str[..decimal_str.len().min(6)];
    let trimmed = truncated.trim_end_matches('0');
    if trimmed.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, trimmed)
    }
}

/// Parse a `0x`-prefixed 20-byte hex address.
pub fn parse_address(field: &'static str, raw: &str) -> Result<Address, ValidationError> {
    let trimmed = raw.trim();
    let invalid = || ValidationError::InvalidAddress {
        field,
        value: raw.to_string(),
    };

    if !trimmed.starts_with("0x") || trimmed.len() != 42 {
        return Err(invalid());
    }
    Address::from_str(trimmed).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_is_right_padded_ascii() {
        let word = encode_partition("Class A").unwrap();
        assert_eq!(&word[..7], b"Class A");
        assert!(word[7..].iter().all(|b| *b == 0));
        assert_eq!(
            alloy::hex::encode_prefixed(word),
            "0x436c617373204100000000000000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn partition_round_trips_for_display() {
        let word = encode_partition("Senior Tranche").unwrap();
        assert_eq!(decode_partition(&word), "Senior Tranche");
        assert_eq!(decode_partition(&B256::ZERO), "");
    }

    #[test]
    fn partition_longer_than_a_word_is_rejected() {
        let name = "A".repeat(33);
        assert!(matches!(
            encode_partition(&name),
            Err(ValidationError::PartitionTooLong { len: 33, .. })
        ));
        assert!(encode_partition(&"A".repeat(32)).is_ok());
    }

    #[test]
    fn whole_amounts_only() {
        assert_eq!(parse_whole_amount("100").unwrap(), 100);
        assert_eq!(parse_whole_amount(" 7 ").unwrap(), 7);
        assert_eq!(parse_whole_amount("0").unwrap(), 0);
        for bad in ["", "abc", "1.5", "-3", "1e3", "+4"] {
            assert!(
                matches!(parse_whole_amount(bad), Err(ValidationError::InvalidAmount(_))),
                "{bad} should be rejected"
            );
        }
        assert!(matches!(
            parse_positive_amount("0"),
            Err(ValidationError::NonPositiveAmount)
        ));
    }

    #[test]
    fn hundred_units_in_base_units() {
        let base = to_base_units(100, TOKEN_DECIMALS);
        assert_eq!(base.to_string(), "100000000000000000000");
    }

    #[test]
    fn formats_base_units() {
        let one = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(format_units(one, 18), "1");
        assert_eq!(format_units(U256::from(1_500_000_000_000_000_000u64), 18), "1.5");
        assert_eq!(format_units(U256::from(1_234_567_890_000_000_000u64), 18), "1.234567");
        assert_eq!(format_units(U256::ZERO, 18), "0");
        assert_eq!(format_units(U256::from(1u64), 18), "0");
    }

    #[test]
    fn base_unit_strings_parse() {
        assert_eq!(parse_base_units("42"), Some(U256::from(42u64)));
        assert_eq!(parse_base_units("nope"), None);
    }

    #[test]
    fn addresses_need_prefix_and_length() {
        assert!(parse_address("recipient", "0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12").is_ok());
        assert!(parse_address("recipient", "742d35Cc6634C0532925a3b844Bc9e7595f4aB12").is_err());
        assert!(parse_address("recipient", "0x1234").is_err());
        assert!(parse_address("recipient", "0xZZ2d35Cc6634C0532925a3b844Bc9e7595f4aB12").is_err());
    }
}
