use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::region::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
}

pub const fn currency_for(region: Region) -> CurrencyInfo {
    match region {
        Region::Global | Region::Us => CurrencyInfo { code: "USD", symbol: "$" },
        Region::Ca => CurrencyInfo { code: "CAD", symbol: "CA$" },
        Region::Ae => CurrencyInfo { code: "AED", symbol: "AED " },
    }
}

/// Display-only money formatting: two decimals, comma grouping, region symbol.
pub fn format_currency(region: Region, amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let symbol = currency_for(region).symbol;
    if negative {
        format!("-{}{}.{}", symbol, grouped, cents)
    } else {
        format!("{}{}.{}", symbol, grouped, cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn formats_with_grouping_per_region() {
        assert_eq!(format_currency(Region::Us, d("1234.5")), "$1,234.50");
        assert_eq!(format_currency(Region::Ca, d("1234567.891")), "CA$1,234,567.89");
        assert_eq!(format_currency(Region::Ae, d("999")), "AED 999.00");
        assert_eq!(format_currency(Region::Global, d("0")), "$0.00");
    }

    #[test]
    fn negative_amounts_keep_sign_in_front() {
        assert_eq!(format_currency(Region::Us, d("-1500")), "-$1,500.00");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(format_currency(Region::Us, d("2.005")), "$2.01");
    }
}
