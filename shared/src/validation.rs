//! Validation utilities for the Pharmacy Chain Management Platform

use rust_decimal::Decimal;

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate a percentage is within 0-100
///
/// Only used for user-entered rates such as a pharmacy's daily discount;
/// supplier discount rates on price lists pass through unvalidated, matching
/// the comparison engine's pass-through arithmetic.
pub fn validate_percentage(pct: Decimal) -> Result<(), &'static str> {
    if pct < Decimal::ZERO || pct > Decimal::from(100) {
        Err("Percentage must be between 0 and 100")
    } else {
        Ok(())
    }
}

/// Validate a price is non-negative
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        Err("Price cannot be negative")
    } else {
        Ok(())
    }
}

/// Validate a username: 3-80 chars, no surrounding whitespace
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.trim() != username {
        return Err("Username cannot start or end with whitespace");
    }
    if username.len() < 3 || username.len() > 80 {
        return Err("Username must be 3-80 characters");
    }
    Ok(())
}

/// Validate a product code is present and reasonably sized
pub fn validate_product_code(code: &str) -> Result<(), &'static str> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err("Product code is required");
    }
    if trimmed.len() > 64 {
        return Err("Product code too long");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_checks() {
        assert!(validate_email("ana@farmacia.mx").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn percentage_bounds() {
        assert!(validate_percentage(Decimal::ZERO).is_ok());
        assert!(validate_percentage(Decimal::from(100)).is_ok());
        assert!(validate_percentage(Decimal::from(101)).is_err());
        assert!(validate_percentage(Decimal::from(-1)).is_err());
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("carlos").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(" carlos").is_err());
    }
}
