use crate::DomainError;

/// Parses user-entered price text into minor currency units.
///
/// A single comma is accepted as the decimal separator ("12,50"). The
/// result is rounded to the nearest cent and must be strictly positive.
pub fn parse_price_cents(text: &str) -> Result<i64, DomainError> {
    let normalized = text.trim().replacen(',', ".", 1);
    if normalized.is_empty() {
        return Err(DomainError::InvalidPrice(text.to_string()));
    }

    let value: f64 = normalized
        .parse()
        .map_err(|_| DomainError::InvalidPrice(text.to_string()))?;
    if !value.is_finite() {
        return Err(DomainError::InvalidPrice(text.to_string()));
    }

    let cents = (value * 100.0).round();
    if cents > i64::MAX as f64 || cents < i64::MIN as f64 {
        return Err(DomainError::InvalidPrice(text.to_string()));
    }

    let cents = cents as i64;
    if cents <= 0 {
        return Err(DomainError::NonPositivePrice(cents));
    }
    Ok(cents)
}

pub fn format_price_cents(price_cents: i64) -> String {
    let sign = if price_cents < 0 { "-" } else { "" };
    let magnitude = price_cents.unsigned_abs();
    format!("{sign}{}.{:02}", magnitude / 100, magnitude % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dot_and_comma_decimals() {
        assert_eq!(parse_price_cents("12.50"), Ok(1250));
        assert_eq!(parse_price_cents("12,50"), Ok(1250));
        assert_eq!(parse_price_cents("0.10"), Ok(10));
        assert_eq!(parse_price_cents(" 120.00 "), Ok(12000));
    }

    #[test]
    fn rejects_empty_garbage_and_non_positive() {
        assert!(matches!(parse_price_cents(""), Err(DomainError::InvalidPrice(_))));
        assert!(matches!(parse_price_cents("abc"), Err(DomainError::InvalidPrice(_))));
        assert_eq!(parse_price_cents("-5"), Err(DomainError::NonPositivePrice(-500)));
        assert_eq!(parse_price_cents("0"), Err(DomainError::NonPositivePrice(0)));
    }

    #[test]
    fn rejects_non_finite_values() {
        assert!(matches!(parse_price_cents("inf"), Err(DomainError::InvalidPrice(_))));
        assert!(matches!(parse_price_cents("NaN"), Err(DomainError::InvalidPrice(_))));
        assert!(matches!(parse_price_cents("1e300"), Err(DomainError::InvalidPrice(_))));
    }

    #[test]
    fn sub_cent_amounts_round_to_zero_and_are_rejected() {
        assert_eq!(parse_price_cents("0.001"), Err(DomainError::NonPositivePrice(0)));
    }

    #[test]
    fn formats_two_decimal_places() {
        assert_eq!(format_price_cents(1250), "12.50");
        assert_eq!(format_price_cents(10), "0.10");
        assert_eq!(format_price_cents(19000), "190.00");
        assert_eq!(format_price_cents(-5), "-0.05");
    }
}
