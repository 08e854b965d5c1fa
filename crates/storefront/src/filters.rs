//! Custom Askama template filters.

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Alcohol by volume as shown on product pages (`5.5%`).
///
/// Usage in templates: `{{ abv|abv }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn abv(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_abv(&value.to_string()))
}

fn format_abv(text: &str) -> String {
    Decimal::from_str(text).map_or_else(
        |_| format!("{text}%"),
        |abv| format!("{}%", abv.normalize()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_abv_drops_trailing_zeros() {
        assert_eq!(format_abv(&Decimal::new(550, 2).to_string()), "5.5%");
        assert_eq!(format_abv(&Decimal::new(80, 1).to_string()), "8%");
        assert_eq!(format_abv("4.5"), "4.5%");
    }

    #[test]
    fn test_format_abv_keeps_unparsed_text() {
        assert_eq!(format_abv("n/a"), "n/a%");
    }
}
