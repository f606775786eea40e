// Formatage des montants (DA), pourcentages et dates Excel
use chrono::{Duration, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

/// "1 234 567.89 DA" : séparateur de milliers = espace ASCII, 2 décimales
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}.{} DA", sign, grouped, frac_part)
}

/// Pourcentage arrondi à l'entier ; 0 si le total est nul
pub fn calculate_percentage(value: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    (value / total * Decimal::ONE_HUNDRED).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Date série Excel (jours depuis le 30/12/1899, partie horaire ignorée)
pub fn parse_excel_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Decimal::new(123456789, 2)), "1 234 567.89 DA");
        assert_eq!(format_currency(Decimal::ZERO), "0.00 DA");
        assert_eq!(format_currency(Decimal::from(999)), "999.00 DA");
        assert_eq!(format_currency(Decimal::from(1000)), "1 000.00 DA");
        assert_eq!(format_currency(Decimal::new(-25000050, 2)), "-250 000.50 DA");
        assert_eq!(format_currency(Decimal::new(10005, 3)), "10.01 DA");
    }

    #[test]
    fn test_calculate_percentage() {
        assert_eq!(calculate_percentage(Decimal::from(1), Decimal::from(3)), Decimal::from(33));
        assert_eq!(calculate_percentage(Decimal::from(2), Decimal::from(3)), Decimal::from(67));
        assert_eq!(calculate_percentage(Decimal::from(5), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_parse_excel_date() {
        assert_eq!(parse_excel_date(45658.0), NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(parse_excel_date(45658.75), NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(parse_excel_date(25569.0), NaiveDate::from_ymd_opt(1970, 1, 1));
        assert_eq!(parse_excel_date(0.0), None);
        assert_eq!(parse_excel_date(f64::NAN), None);
    }
}
