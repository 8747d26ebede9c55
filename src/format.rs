//! Display helpers. Amounts are only ever rounded here, never in the ledger.

use rust_decimal::Decimal;

/// Reference currency amount rounded to cents with `,` thousands separators,
/// e.g. `-1,234,567.89`.
pub fn format_fiat(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let digits = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Quantity with trailing zeros stripped, e.g. `1.50000000` -> `1.5`
pub fn format_quantity(qty: Decimal) -> String {
    qty.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fiat_is_grouped_and_rounded() {
        assert_eq!(format_fiat(dec!(-1234567.8901)), "-1,234,567.89");
        assert_eq!(format_fiat(dec!(123456789)), "123,456,789.00");
        assert_eq!(format_fiat(dec!(999.999)), "1,000.00");
        assert_eq!(format_fiat(dec!(0.5)), "0.50");
        assert_eq!(format_fiat(dec!(100)), "100.00");
    }

    #[test]
    fn negative_values_rounding_to_zero_drop_the_sign() {
        assert_eq!(format_fiat(dec!(-0.001)), "0.00");
    }

    #[test]
    fn quantity_strips_trailing_zeros() {
        assert_eq!(format_quantity(dec!(1.50000000)), "1.5");
        assert_eq!(format_quantity(dec!(2.000)), "2");
        assert_eq!(format_quantity(dec!(0.00000001)), "0.00000001");
        assert_eq!(format_quantity(dec!(-0.250)), "-0.25");
    }
}
