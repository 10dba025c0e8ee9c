//! Display formatting helpers
//!
//! Everything here is pure and total: bad input yields a safe string, never a
//! panic or an error.

use crate::constants::MINUTES_PER_BLOCK;

/// Converts a block count into an approximate duration such as `"1d, 1h"`.
///
/// Components that are zero are left out, except that zero blocks render
/// as `"0m"`.
pub fn blocks_to_time(blocks: u64) -> String {
    let minutes_left = blocks.saturating_mul(MINUTES_PER_BLOCK);
    let hours_left = minutes_left / 60;

    let days = hours_left / 24;
    let hours = hours_left % 24;
    let minutes = minutes_left % 60;

    match (days, hours, minutes) {
        (0, 0, m) => format!("{}m", m),
        (0, h, 0) => format!("{}h", h),
        (d, 0, 0) => format!("{}d", d),
        (0, h, m) => format!("{}h, {}m", h, m),
        (d, 0, m) => format!("{}d, {}m", d, m),
        (d, h, 0) => format!("{}d, {}h", d, h),
        (d, h, m) => format!("{}d, {}h, {}m", d, h, m),
    }
}

/// Splits a minute count into `"{d}d, {h}h, {m}m"`.
///
/// The sign is dropped, so `x` and `-x` format the same. All three components
/// are always present.
pub fn format_seconds(total_minutes: i64) -> String {
    let total = total_minutes.unsigned_abs();
    let mins = total % 60;
    let hours = total / 60;
    let days = hours / 24;
    format!("{}d, {}h, {}m", days, hours % 24, mins)
}

/// Abbreviates `0x`-prefixed addresses to `0x12...cdef`.
///
/// For contract identifiers (`address.name`) only the address part is
/// shortened and the name is kept. Anything else is returned unchanged.
pub fn short_address(address: &str) -> String {
    if !address.starts_with("0x") || address.chars().count() <= 10 {
        return address.to_string();
    }

    match address.split_once('.') {
        Some((principal, name)) => format!("{}.{}", abbreviate(principal), name),
        None => abbreviate(address),
    }
}

fn abbreviate(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let head: String = chars.iter().take(4).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Renders a fractional day count as `"1 Day, 12 Hours"`.
///
/// Less than one hour reads as `"1 Hour"`.
pub fn number_to_days_and_hours(number: f64) -> String {
    let days = number.floor();
    let hours = ((number - days) * 24.0).floor();

    let days = if days.is_finite() { days as i64 } else { 0 };
    let hours = if hours.is_finite() { hours as i64 } else { 0 };

    if days == 0 && hours == 0 {
        return "1 Hour".to_string();
    }

    let mut parts = Vec::with_capacity(2);
    if days > 0 {
        parts.push(format!("{} {}", days, if days == 1 { "Day" } else { "Days" }));
    }
    if hours > 0 {
        parts.push(format!("{} {}", hours, if hours == 1 { "Hour" } else { "Hours" }));
    }
    parts.join(", ")
}

/// Fixed-precision decimal formatter with `,` thousands grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    min_fraction_digits: u32,
    max_fraction_digits: u32,
}

impl NumberFormat {
    pub const fn new(min_fraction_digits: u32, max_fraction_digits: u32) -> Self {
        Self {
            min_fraction_digits,
            max_fraction_digits,
        }
    }

    /// Formats `value`, rounding half away from zero at the last kept digit.
    ///
    /// Rounding works on the exact binary value, so `767.675` (stored just
    /// below the tie) rounds down while `0.125` rounds up.
    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value > 0.0 { "∞" } else { "-∞" }.to_string();
        }

        let digits = self.max_fraction_digits as usize;
        let abs = value.abs();
        let text = if is_exact_tie(abs, digits) {
            round_tie_up(&format!("{:.*}", digits + 1, abs))
        } else {
            format!("{:.*}", digits, abs)
        };

        let (int_part, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
        let min = self.min_fraction_digits as usize;
        let keep = fraction.trim_end_matches('0').len().max(min).min(fraction.len());
        let fraction = &fraction[..keep];

        let mut out = String::new();
        if value < 0.0 && text.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
            out.push('-');
        }
        out.push_str(&group_thousands(int_part));
        if !fraction.is_empty() {
            out.push('.');
            out.push_str(fraction);
        }
        out
    }
}

/// Whether `abs` lies exactly halfway between two `digits`-place decimals.
///
/// Such a value is a multiple of `2^-(digits + 1)`, so its decimal expansion
/// ends at place `digits + 1` with a `5`.
fn is_exact_tie(abs: f64, digits: usize) -> bool {
    let scaled = abs * 2f64.powi(digits as i32 + 1);
    scaled.is_finite()
        && scaled.fract() == 0.0
        && format!("{:.*}", digits + 1, abs).ends_with('5')
}

/// Drops the trailing `5` of an exact tie and rounds the rest up
fn round_tie_up(exact: &str) -> String {
    let mut chars: Vec<char> = exact[..exact.len() - 1]
        .trim_end_matches('.')
        .chars()
        .collect();

    let mut i = chars.len();
    loop {
        if i == 0 {
            chars.insert(0, '1');
            break;
        }
        i -= 1;
        match chars[i] {
            '.' => continue,
            '9' => chars[i] = '0',
            c => {
                chars[i] = (c as u8 + 1) as char;
                break;
            }
        }
    }
    chars.into_iter().collect()
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Shared presets so every screen formats amounts the same way.
pub mod currency {
    use super::NumberFormat;

    /// Plain grouped number
    pub const DEFAULT: NumberFormat = NumberFormat::new(0, 3);
    /// No decimals, e.g. TVL
    pub const ROUNDED: NumberFormat = NumberFormat::new(0, 0);
    /// Fiat, e.g. `3,230.00`
    pub const SHORT: NumberFormat = NumberFormat::new(2, 2);
    /// Token amounts, e.g. `5.009331`
    pub const LONG: NumberFormat = NumberFormat::new(2, 6);
}

/// `$` followed by the rounded amount
pub fn usd(value: f64) -> String {
    format!("${}", currency::ROUNDED.format(value))
}

/// APY with two decimals, or `TBD` while the protocol has no yield yet
pub fn apy(value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 && v.is_finite() => format!("{}%", currency::SHORT.format(v)),
        _ => "TBD".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_to_time_cases() {
        assert_eq!(blocks_to_time(0), "0m");
        assert_eq!(blocks_to_time(3), "30m");
        assert_eq!(blocks_to_time(6), "1h");
        assert_eq!(blocks_to_time(144), "1d");
        assert_eq!(blocks_to_time(150), "1d, 1h");
        assert_eq!(blocks_to_time(7), "1h, 10m");
        assert_eq!(blocks_to_time(145), "1d, 10m");
        assert_eq!(blocks_to_time(151), "1d, 1h, 10m");
        assert_eq!(blocks_to_time(2100), "14d, 14h");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(90), "0d, 1h, 30m");
        assert_eq!(format_seconds(0), "0d, 0h, 0m");
        assert_eq!(format_seconds(1440), "1d, 0h, 0m");
        assert_eq!(format_seconds(1501), "1d, 1h, 1m");
    }

    #[test]
    fn test_format_seconds_ignores_sign() {
        for x in [0, 1, 59, 60, 90, 1439, 1440, 100_000, i64::MAX] {
            assert_eq!(format_seconds(x), format_seconds(-x));
        }
        assert!(format_seconds(i64::MIN).ends_with("8m"));
    }

    #[test]
    fn test_short_address() {
        assert_eq!(short_address("plainname"), "plainname");
        assert_eq!(short_address("0x12345678"), "0x12345678");
        assert_eq!(short_address("0x123456789"), "0x12...6789");
        assert_eq!(
            short_address("0x1234567890abcdef.token"),
            "0x12...cdef.token"
        );
        assert_eq!(
            short_address("SP2C2YFP12AJZB4MABJBAJ55XECVS7E4PMMZ89YZR.arkadiko-token"),
            "SP2C2YFP12AJZB4MABJBAJ55XECVS7E4PMMZ89YZR.arkadiko-token"
        );
    }

    #[test]
    fn test_number_to_days_and_hours() {
        assert_eq!(number_to_days_and_hours(0.0), "1 Hour");
        assert_eq!(number_to_days_and_hours(0.01), "1 Hour");
        assert_eq!(number_to_days_and_hours(1.5), "1 Day, 12 Hours");
        assert_eq!(number_to_days_and_hours(2.0), "2 Days");
        assert_eq!(number_to_days_and_hours(0.05), "1 Hour");
        assert_eq!(number_to_days_and_hours(0.25), "6 Hours");
        assert_eq!(number_to_days_and_hours(3.0 + 1.0 / 24.0 + 0.001), "3 Days, 1 Hour");
        assert_eq!(number_to_days_and_hours(f64::NAN), "1 Hour");
    }

    #[test]
    fn test_currency_presets() {
        assert_eq!(currency::DEFAULT.format(1234567.0), "1,234,567");
        assert_eq!(currency::DEFAULT.format(1234.5678), "1,234.568");
        assert_eq!(currency::ROUNDED.format(1234.5), "1,235");
        assert_eq!(currency::ROUNDED.format(999.4), "999");
        assert_eq!(currency::SHORT.format(3230.0), "3,230.00");
        assert_eq!(currency::SHORT.format(0.456), "0.46");
        assert_eq!(currency::LONG.format(5.009331), "5.009331");
        assert_eq!(currency::LONG.format(5.1), "5.10");
        assert_eq!(currency::LONG.format(5.12345678), "5.123457");
        assert_eq!(currency::SHORT.format(-1234.5), "-1,234.50");
        assert_eq!(currency::ROUNDED.format(-0.2), "0");
        assert_eq!(currency::ROUNDED.format(f64::NAN), "NaN");
    }

    #[test]
    fn test_rounding_uses_exact_value() {
        // 767.675 is stored as 767.67499...
        assert_eq!(currency::SHORT.format(767.675), "767.67");
        assert_eq!(currency::SHORT.format(-767.675), "-767.67");
        assert_eq!(currency::SHORT.format(1.005), "1.00");
    }

    #[test]
    fn test_exact_ties_round_away_from_zero() {
        assert_eq!(currency::SHORT.format(0.125), "0.13");
        assert_eq!(currency::SHORT.format(-0.125), "-0.13");
        assert_eq!(currency::ROUNDED.format(0.5), "1");
        assert_eq!(currency::ROUNDED.format(2.5), "3");
        assert_eq!(currency::ROUNDED.format(999.5), "1,000");
        assert_eq!(currency::SHORT.format(9.995), "9.99");
        assert_eq!(currency::SHORT.format(99.875), "99.88");
    }

    #[test]
    fn test_usd_and_apy() {
        assert_eq!(usd(90_000_000.4), "$90,000,000");
        assert_eq!(apy(Some(9.8)), "9.80%");
        assert_eq!(apy(Some(0.0)), "TBD");
        assert_eq!(apy(None), "TBD");
    }
}
