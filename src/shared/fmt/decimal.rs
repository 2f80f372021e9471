//! `Decimal` formatting for price, change and supply columns.

use super::num::group_thousands;
use crate::shared::Currency;
use rust_decimal::prelude::*;

const SUFFIXES: [(u32, &str); 4] = [(12, "T"), (9, "B"), (6, "M"), (3, "K")];

/// Direction of a 24h change, for colouring the change columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

pub fn trend(change: &Decimal) -> Trend {
    if change.is_zero() {
        Trend::Flat
    } else if change.is_sign_negative() {
        Trend::Down
    } else {
        Trend::Up
    }
}

/// Decimal places for a price: two for anything at or above one unit, more for
/// sub-unit prices so that at least four significant digits survive (max 8).
fn price_places(abs_value: &Decimal) -> u32 {
    if abs_value.is_zero() || *abs_value >= Decimal::ONE {
        return 2;
    }
    let mantissa = abs_value.mantissa().unsigned_abs();
    let digits = mantissa.checked_ilog10().map_or(1, |d| d + 1);
    let leading_zeros = abs_value.scale().saturating_sub(digits);
    (leading_zeros + 4).min(8)
}

fn round_price(abs_value: &Decimal) -> Decimal {
    abs_value.round_dp(price_places(abs_value)).normalize()
}

fn unsigned_amount(rounded: &Decimal) -> String {
    let shown = rounded.scale().max(2) as usize;
    group_thousands(&format!("{:.*}", shown, rounded))
}

/// Price with currency symbol, e.g. `$64,231.50`, `€0.00123`, `-$3.46`.
///
/// The sign follows the rounded amount, so dust never renders as `-$0.00`.
pub fn price(value: &Decimal, currency: Currency) -> String {
    let rounded = round_price(&value.abs());
    let sign = if value.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{}{}", currency.symbol(), unsigned_amount(&rounded))
}

/// Absolute 24h change with an explicit sign, e.g. `+$120.50`.
pub fn signed_price(value: &Decimal, currency: Currency) -> String {
    let rounded = round_price(&value.abs());
    let sign = match trend(value) {
        _ if rounded.is_zero() => "",
        Trend::Up => "+",
        Trend::Down => "-",
        Trend::Flat => "",
    };
    format!("{sign}{}{}", currency.symbol(), unsigned_amount(&rounded))
}

/// Percentage change with an explicit sign and two places, e.g. `+2.35%`.
pub fn percent_change(value: &Decimal) -> String {
    let rounded = value.round_dp(2);
    if rounded.is_zero() {
        return "0.00%".to_string();
    }
    let sign = if rounded > Decimal::ZERO { "+" } else { "" };
    format!("{sign}{:.2}%", rounded)
}

/// Abbreviates large quantities with K/M/B/T, e.g. `19.50M`.
pub fn abbreviate(amount: &Decimal, digits: usize) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    let abs_amount = amount.abs();

    for (exp, suffix) in SUFFIXES {
        let unit = Decimal::from_i128_with_scale(10i128.pow(exp), 0);
        if abs_amount >= unit {
            return format!("{sign}{:.*}{suffix}", digits, abs_amount / unit);
        }
    }
    format!("{sign}{:.*}", digits, abs_amount)
}
