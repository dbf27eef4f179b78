//! Exact conversions between decimal ether strings and wei.

use crate::error::{FlipError, Result};
use alloy_primitives::U256;

pub const ETHER_DECIMALS: usize = 18;

pub const WEI_PER_ETHER: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Parse a user supplied ether amount into wei.
///
/// Only plain decimal notation is accepted. Inputs that would lose precision
/// (more than 18 fractional digits), overflow 256 bits, or are not strictly
/// positive are rejected with `InvalidStake`.
pub fn parse_stake(input: &str) -> Result<U256> {
    let wei = parse_ether(input)?;
    if wei.is_zero() {
        return Err(FlipError::invalid_stake("stake must be greater than zero"));
    }
    Ok(wei)
}

pub fn parse_ether(input: &str) -> Result<U256> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FlipError::invalid_stake("amount is empty"));
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(FlipError::invalid_stake(format!("'{}' is not a number", trimmed)));
    }

    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(FlipError::invalid_stake(format!(
            "'{}' is not a positive decimal number",
            trimmed
        )));
    }

    if fraction.len() > ETHER_DECIMALS {
        return Err(FlipError::invalid_stake(format!(
            "'{}' has more than {} decimal places",
            trimmed, ETHER_DECIMALS
        )));
    }

    let mut digits = String::with_capacity(whole.len() + ETHER_DECIMALS);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(ETHER_DECIMALS - fraction.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 10)
        .map_err(|_| FlipError::invalid_stake(format!("'{}' is too large", trimmed)))
}

/// Render wei as ether, trimming trailing zeros but keeping one fractional
/// digit (`1.0`, `0.01`).
pub fn format_ether(wei: U256) -> String {
    let whole = wei / WEI_PER_ETHER;
    let fraction = (wei % WEI_PER_ETHER).to::<u64>();

    let fraction = format!("{:0width$}", fraction, width = ETHER_DECIMALS);
    let fraction = fraction.trim_end_matches('0');
    let fraction = if fraction.is_empty() { "0" } else { fraction };

    format!("{}.{}", whole, fraction)
}

/// Amount credited on a win for `stake` under a house edge given in percent:
/// a fair double minus the edge on the stake (`stake * 1.97` at 3%).
pub fn potential_payout(stake: U256, house_edge_percent: U256) -> U256 {
    let hundred = U256::from(100u64);
    let multiplier = U256::from(200u64).saturating_sub(house_edge_percent.min(U256::from(200u64)));
    stake.saturating_mul(multiplier) / hundred
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milli(n: u64) -> U256 {
        U256::from(n) * U256::from(1_000_000_000_000_000u64)
    }

    #[test]
    fn test_parse_common_stakes() {
        assert_eq!(parse_stake("0.01").unwrap(), milli(10));
        assert_eq!(parse_stake("0.02").unwrap(), milli(20));
        assert_eq!(parse_stake("1").unwrap(), WEI_PER_ETHER);
        assert_eq!(parse_stake(" 2.5 ").unwrap(), milli(2500));
        assert_eq!(parse_stake(".5").unwrap(), milli(500));
    }

    #[test]
    fn test_parse_smallest_unit() {
        assert_eq!(parse_stake("0.000000000000000001").unwrap(), U256::from(1u64));
    }

    #[test]
    fn test_rejects_non_positive_and_garbage() {
        for input in [
            "0", "0.0", "-1", "-0.01", "", "   ", "abc", "1e18", "NaN", "inf", ".", "1.2.3", "+1",
        ] {
            assert!(
                matches!(parse_stake(input), Err(FlipError::InvalidStake(_))),
                "accepted {:?}",
                input
            );
        }
    }

    #[test]
    fn test_rejects_precision_loss() {
        assert!(matches!(
            parse_stake("0.0000000000000000001"),
            Err(FlipError::InvalidStake(_))
        ));
    }

    #[test]
    fn test_rejects_overflow() {
        let huge = "9".repeat(80);
        assert!(matches!(parse_stake(&huge), Err(FlipError::InvalidStake(_))));
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(milli(10)), "0.01");
        assert_eq!(format_ether(WEI_PER_ETHER), "1.0");
        assert_eq!(format_ether(U256::ZERO), "0.0");
        assert_eq!(format_ether(milli(1500)), "1.5");
        assert_eq!(format_ether(U256::from(1u64)), "0.000000000000000001");
    }

    #[test]
    fn test_potential_payout_at_three_percent() {
        assert_eq!(
            potential_payout(milli(10), U256::from(3u64)),
            U256::from(19_700_000_000_000_000u64)
        );
        assert_eq!(potential_payout(WEI_PER_ETHER, U256::ZERO), WEI_PER_ETHER * U256::from(2u64));
    }
}
