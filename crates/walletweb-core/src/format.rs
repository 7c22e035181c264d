//! Currency formatting

use rust_decimal::Decimal;
use walletweb_config::{CurrencyConfig, SymbolPosition};
use walletweb_utils::group_thousands;

/// Format a signed amount per the currency settings (`-$1,234.50`, `1.234,50 €`)
pub fn format_money(value: Decimal, currency: &CurrencyConfig) -> String {
    let mut magnitude = value.abs().round_dp(currency.decimal_places);
    magnitude.rescale(currency.decimal_places);
    let number = group_thousands(&magnitude.to_string(), &currency.thousands_separator);
    let sign = if value.is_sign_negative() && !magnitude.is_zero() { "-" } else { "" };

    match currency.symbol_position {
        SymbolPosition::Before => format!("{}{}{}", sign, currency.symbol, number),
        SymbolPosition::After => format!("{}{} {}", sign, number, currency.symbol),
    }
}

/// Percentage with one decimal place (`42.5%`)
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}
