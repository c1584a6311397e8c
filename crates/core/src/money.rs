//! Currency and Rate Rounding
//!
//! Single source of truth for rounding and display formatting of monetary
//! values. All currency is rounded half-up to cents; rates and multipliers
//! are rounded to a fixed number of decimal places for stable display.

use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places for currency values
pub const CURRENCY_DP: u32 = 2;

/// Decimal places for rates and multipliers
pub const RATE_DP: u32 = 4;

/// Round to `dp` decimal places, half away from zero.
///
/// The value is converted through its shortest decimal representation so
/// that inputs such as `1.005` round to `1.01` rather than following the
/// binary approximation down. Non-finite input yields 0.0; values outside
/// the decimal range are returned unchanged.
pub fn round_to(value: f64, dp: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }

    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Round a currency amount to cents.
pub fn round_currency(value: f64) -> f64 {
    round_to(value, CURRENCY_DP)
}

/// Round a rate or multiplier for display.
pub fn round_rate(value: f64) -> f64 {
    round_to(value, RATE_DP)
}

/// Format as whole US dollars with thousands separators (e.g. `$12,345`).
pub fn format_currency(amount: f64) -> String {
    let rounded = round_to(amount, 0);
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(rounded.abs() as u64))
}

/// Format as US dollars and cents (e.g. `$1,234.56`).
pub fn format_currency_cents(amount: f64) -> String {
    let rounded = round_currency(amount);
    let sign = if rounded < 0.0 { "-" } else { "" };
    let cents_total = round_to(rounded.abs() * 100.0, 0) as u64;
    format!(
        "{}${}.{:02}",
        sign,
        group_thousands(cents_total / 100),
        cents_total % 100
    )
}

/// Format a whole-number percentage, dropping a trailing `.0` (e.g. `27.5%`, `45%`).
pub fn format_percentage(percent: f64) -> String {
    let rounded = round_to(percent, 2);
    if rounded.fract() == 0.0 {
        format!("{:.0}%", rounded)
    } else {
        let text = format!("{:.2}", rounded);
        format!("{}%", text.trim_end_matches('0'))
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
