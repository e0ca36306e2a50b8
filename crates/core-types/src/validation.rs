//! Small field checks shared by the request payloads.

use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::invalid(field, "is required"));
    }
    Ok(())
}

pub fn require_optional_text(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(v) => require_text(field, v),
        None => Ok(()),
    }
}

pub fn require_email(field: &str, value: &str) -> Result<(), CoreError> {
    require_text(field, value)?;
    let (local, domain) = value
        .split_once('@')
        .ok_or_else(|| CoreError::invalid(field, "must be an email address"))?;
    if local.is_empty() || !domain.contains('.') {
        return Err(CoreError::invalid(field, "must be an email address"));
    }
    Ok(())
}

pub fn require_non_negative(field: &str, value: Decimal) -> Result<(), CoreError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(CoreError::invalid(field, "must not be negative"));
    }
    Ok(())
}

pub fn require_optional_non_negative(field: &str, value: Option<Decimal>) -> Result<(), CoreError> {
    match value {
        Some(v) => require_non_negative(field, v),
        None => Ok(()),
    }
}

pub fn require_date_order(
    start_field: &str,
    start: NaiveDate,
    end_field: &str,
    end: NaiveDate,
) -> Result<(), CoreError> {
    if end < start {
        return Err(CoreError::invalid(
            end_field,
            format!("must not be before {}", start_field),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("justification", "   ").is_err());
        assert!(require_text("justification", "Enrollment growth").is_ok());
    }

    #[test]
    fn email_needs_local_part_and_domain() {
        assert!(require_email("email", "jane@district.org").is_ok());
        assert!(require_email("email", "jane.district.org").is_err());
        assert!(require_email("email", "@district.org").is_err());
        assert!(require_email("email", "jane@localhost").is_err());
    }

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(require_non_negative("amount", dec!(-0.01)).is_err());
        assert!(require_non_negative("amount", dec!(0)).is_ok());
    }
}
