//! Decimal amount parsing and formatting

use acdm_core::Amount;

/// Parse a decimal string such as `"0.01"` into base units.
pub fn parse_amount(input: &str, decimals: u32) -> Result<Amount, String> {
    let cleaned = input.trim().replace('_', "");
    let (whole, fraction) = match cleaned.split_once('.') {
        Some(parts) => parts,
        None => (cleaned.as_str(), ""),
    };

    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(format!("not a number: {}", input));
    }
    if fraction.len() > decimals as usize {
        return Err(format!("{} has more than {} decimals", input, decimals));
    }

    let scale = 10u128.pow(decimals);
    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| format!("too large: {}", input))?
    };
    let fraction: Amount = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = decimals as usize);
        padded.parse().map_err(|_| format!("not a number: {}", input))?
    };

    whole
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction))
        .ok_or_else(|| format!("too large: {}", input))
}

pub fn format_amount(value: Amount, decimals: u32) -> String {
    let scale = 10u128.pow(decimals);
    let whole = value / scale;
    let fraction = value % scale;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1", 6).unwrap(), 1_000_000);
        assert_eq!(parse_amount("0.01", 18).unwrap(), 10_000_000_000_000_000);
        assert_eq!(parse_amount(".5", 6).unwrap(), 500_000);
        assert_eq!(parse_amount("100_000", 0).unwrap(), 100_000);
        assert!(parse_amount("1.0000001", 6).is_err());
        assert!(parse_amount("abc", 6).is_err());
        assert!(parse_amount(".", 6).is_err());
        assert!(parse_amount("-1", 6).is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(10_000_000_000_000, 18), "0.00001");
        assert_eq!(format_amount(1_500_000, 6), "1.5");
        assert_eq!(format_amount(42, 0), "42");
    }
}
