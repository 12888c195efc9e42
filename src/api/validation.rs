use rust_decimal::Decimal;

use super::error::{ApiError, FieldError};

pub const NAME_MAX_LEN: usize = 80;
pub const DESCRIPTION_MAX_LEN: usize = 300;
pub const PRICE_MIN: i64 = 1;
pub const PRICE_MAX: i64 = 10_000;
pub const STOCK_PATCH_MIN: i32 = 1;
pub const STOCK_PATCH_MAX: i32 = 10_000;
pub const STOCK_PUT_MIN: i32 = 1;
pub const STOCK_PUT_MAX: i32 = 50_000;

/// Required non-empty text with a length cap. Pushes a field error and
/// returns an empty string on failure; callers must check the error list
/// before using the value.
pub fn required_text(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<String>,
    max_len: usize,
) -> String {
    match value {
        Some(value) if !value.trim().is_empty() => {
            if value.chars().count() > max_len {
                errors.push(ApiError::field(
                    field,
                    format!("{} can't have more than {} characters", field, max_len),
                ));
            }
            value
        }
        _ => {
            errors.push(ApiError::field(field, format!("{} can't be null", field)));
            String::new()
        }
    }
}

pub fn required_price(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<Decimal>,
) -> Decimal {
    let value = value.unwrap_or(Decimal::ZERO);
    if value < Decimal::from(PRICE_MIN) || value > Decimal::from(PRICE_MAX) {
        errors.push(ApiError::field(
            field,
            format!("{} must be between {} and {}", field, PRICE_MIN, PRICE_MAX),
        ));
    }
    value
}

pub fn required_int_range(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<i32>,
    min: i32,
    max: i32,
) -> i32 {
    let value = value.unwrap_or(0);
    if value < min || value > max {
        errors.push(ApiError::field(
            field,
            format!("{} must be between {} and {}", field, min, max),
        ));
    }
    value
}

/// Required id that must be a positive integer.
pub fn required_id(errors: &mut Vec<FieldError>, field: &str, value: Option<i32>) -> i32 {
    let value = value.unwrap_or(0);
    if value < 1 {
        errors.push(ApiError::field(
            field,
            format!("You must provide a valid {} (greater than 0)", field),
        ));
    }
    value
}

pub fn finish(errors: Vec<FieldError>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_missing_and_blank() {
        let mut errors = Vec::new();
        required_text(&mut errors, "name", None, NAME_MAX_LEN);
        required_text(&mut errors, "description", Some("   ".to_string()), 300);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn required_text_enforces_length() {
        let mut errors = Vec::new();
        required_text(&mut errors, "name", Some("x".repeat(81)), NAME_MAX_LEN);
        assert_eq!(errors.len(), 1);

        let mut errors = Vec::new();
        required_text(&mut errors, "name", Some("x".repeat(80)), NAME_MAX_LEN);
        assert!(errors.is_empty());
    }

    #[test]
    fn required_price_enforces_range() {
        let mut errors = Vec::new();
        required_price(&mut errors, "price", Some(Decimal::from(15_000)));
        assert_eq!(errors.len(), 1);

        let mut errors = Vec::new();
        required_price(&mut errors, "price", Some(Decimal::new(105, 1)));
        assert!(errors.is_empty());
    }

    #[test]
    fn missing_price_fails_the_range_check() {
        let mut errors = Vec::new();
        required_price(&mut errors, "price", None);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn finish_collects_all_failures() {
        let mut errors = Vec::new();
        required_price(&mut errors, "price", Some(Decimal::from(15_000)));
        required_int_range(&mut errors, "stock", Some(0), STOCK_PATCH_MIN, STOCK_PATCH_MAX);
        let result = finish(errors);
        assert!(matches!(result, Err(ApiError::Validation(ref e)) if e.len() == 2));
    }
}
