use crate::errors::DaoError;

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable file size with up to two decimals, e.g. `1.5 KB`
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return String::from("0 Bytes");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// Shorten a `0x` address for display: `0x1234...abcd`
pub fn shorten_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// Render a raw token amount with `decimals` places, trimming trailing zeros
pub fn format_token_amount(raw: u128, decimals: u8) -> String {
    if decimals == 0 {
        return raw.to_string();
    }

    let digits = raw.to_string();
    let decimals = decimals as usize;
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };

    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Parse a decimal token amount (e.g. `"12.5"`) into its raw integer form
pub fn parse_token_amount(amount: &str, decimals: u8) -> Result<u128, DaoError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(DaoError::Validation("Amount is empty".to_string()));
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(DaoError::Validation(format!("Invalid amount: {}", amount)));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(DaoError::Validation(format!("Invalid amount: {}", amount)));
    }
    if fraction.len() > decimals as usize {
        return Err(DaoError::Validation(format!(
            "Amount {} has more than {} decimal places",
            amount, decimals
        )));
    }

    let scale = 10u128
        .checked_pow(decimals as u32)
        .ok_or(DaoError::Overflow("token decimals"))?;
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| DaoError::Overflow("token amount"))?
    };
    let fraction_value: u128 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = decimals as usize);
        padded.parse().map_err(|_| DaoError::Overflow("token amount"))?
    };

    whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(fraction_value))
        .ok_or(DaoError::Overflow("token amount"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn size_to_bytes(formatted: &str) -> f64 {
        let (value, unit) = formatted.split_once(' ').unwrap();
        let exp = SIZE_UNITS.iter().position(|u| *u == unit).unwrap();
        value.parse::<f64>().unwrap() * 1024f64.powi(exp as i32)
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_shorten_address() {
        assert_eq!(
            shorten_address("0x1234567890abcdef1234567890abcdef12345678"),
            "0x1234...5678"
        );
        assert_eq!(shorten_address("0x1234"), "0x1234");
    }

    #[test]
    fn test_format_token_amount() {
        assert_eq!(format_token_amount(0, 18), "0");
        assert_eq!(format_token_amount(1_500_000_000_000_000_000, 18), "1.5");
        assert_eq!(format_token_amount(1, 18), "0.000000000000000001");
        assert_eq!(format_token_amount(42, 0), "42");
        assert_eq!(format_token_amount(123_450_000, 6), "123.45");
    }

    #[test]
    fn test_parse_token_amount() {
        assert_eq!(parse_token_amount("1.5", 18).unwrap(), 1_500_000_000_000_000_000);
        assert_eq!(parse_token_amount("42", 0).unwrap(), 42);
        assert_eq!(parse_token_amount(".25", 2).unwrap(), 25);
        assert!(parse_token_amount("", 18).is_err());
        assert!(parse_token_amount("1.2.3", 18).is_err());
        assert!(parse_token_amount("abc", 18).is_err());
        assert!(parse_token_amount("0.001", 2).is_err());
    }

    proptest! {
        #[test]
        fn file_size_is_deterministic(bytes in any::<u64>()) {
            prop_assert_eq!(format_file_size(bytes), format_file_size(bytes));
        }

        #[test]
        fn file_size_is_monotonic(a in 0u64..(1u64 << 42), b in 0u64..(1u64 << 42)) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(size_to_bytes(&format_file_size(lo)) <= size_to_bytes(&format_file_size(hi)));
        }

        #[test]
        fn token_amount_parses_back(raw in any::<u64>(), decimals in 0u8..19) {
            let formatted = format_token_amount(raw as u128, decimals);
            prop_assert_eq!(parse_token_amount(&formatted, decimals).unwrap(), raw as u128);
        }
    }
}
