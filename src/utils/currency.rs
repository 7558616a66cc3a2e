// utils/currency.rs

/// Convert a provider amount in minor units (cents) to major currency units.
pub fn from_minor_units(amount: i64) -> f64 {
    amount as f64 / 100.0
}

/// Convert a major-unit amount back to minor units for provider API calls.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn format_amount(amount: f64, currency: &str) -> String {
    match currency.to_lowercase().as_str() {
        "usd" => format!("${:.2}", amount),
        "eur" => format!("€{:.2}", amount),
        "gbp" => format!("£{:.2}", amount),
        other => format!("{:.2} {}", amount, other.to_uppercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_cents_to_decimal() {
        assert_eq!(from_minor_units(999), 9.99);
        assert_eq!(from_minor_units(0), 0.0);
        assert_eq!(from_minor_units(100), 1.0);
    }

    #[test]
    fn converts_decimal_to_cents() {
        assert_eq!(to_minor_units(5.0), 500);
        assert_eq!(to_minor_units(9.99), 999);
        assert_eq!(to_minor_units(0.1), 10);
    }

    #[test]
    fn formats_known_and_unknown_currencies() {
        assert_eq!(format_amount(5.0, "usd"), "$5.00");
        assert_eq!(format_amount(5.0, "USD"), "$5.00");
        assert_eq!(format_amount(12.5, "ngn"), "12.50 NGN");
    }
}
