//! Custom `validator` rules shared by request payloads

use rust_decimal::Decimal;
use validator::ValidationError;

/// Maximum allowed unit price or amount (1,000,000)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Maximum quantity per line
pub const MAX_QUANTITY: i32 = 9999;

/// Earliest accepted booking timestamp (2000-01-01T00:00:00Z, ms)
pub const MIN_BOOKING_MS: i64 = 946_684_800_000;

/// Latest accepted booking timestamp (2100-01-01T00:00:00Z, ms)
pub const MAX_BOOKING_MS: i64 = 4_102_444_800_000;

/// Amount must be within `0..=MAX_AMOUNT`
pub fn money(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative_amount"));
    }
    if *value > MAX_AMOUNT {
        return Err(ValidationError::new("amount_too_large"));
    }
    Ok(())
}

/// Amount must be strictly positive and within bounds
pub fn positive_money(value: &Decimal) -> Result<(), ValidationError> {
    money(value)?;
    if value.is_zero() {
        return Err(ValidationError::new("zero_amount"));
    }
    Ok(())
}

/// Percentage in `0..=100`
pub fn percentage(value: &Decimal) -> Result<(), ValidationError> {
    if (value.is_sign_negative() && !value.is_zero()) || *value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("percentage_out_of_range"));
    }
    Ok(())
}

/// Field must contain something besides whitespace
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_bounds() {
        assert!(money(&Decimal::ZERO).is_ok());
        assert!(money(&Decimal::new(1999, 2)).is_ok());
        assert!(money(&Decimal::new(-1, 2)).is_err());
        assert!(money(&(MAX_AMOUNT + Decimal::ONE)).is_err());
    }

    #[test]
    fn test_positive_money() {
        assert!(positive_money(&Decimal::ZERO).is_err());
        assert!(positive_money(&Decimal::new(1, 2)).is_ok());
    }

    #[test]
    fn test_percentage() {
        assert!(percentage(&Decimal::ZERO).is_ok());
        assert!(percentage(&Decimal::ONE_HUNDRED).is_ok());
        assert!(percentage(&Decimal::new(1001, 1)).is_err());
        assert!(percentage(&Decimal::new(-5, 0)).is_err());
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("x").is_ok());
        assert!(not_blank("   ").is_err());
    }
}
