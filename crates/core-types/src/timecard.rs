use crate::enums::TimecardStatus;
use crate::error::CoreError;
use crate::validation::{require_non_negative, require_optional_non_negative};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Hours in a week; no card may claim more.
pub const MAX_WEEKLY_HOURS: Decimal = dec!(168);

/// Cards are editable only while they sit with the secretary.
pub const EDITABLE_TIMECARD_STATUSES: &[TimecardStatus] =
    &[TimecardStatus::Draft, TimecardStatus::Rejected];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimeCard {
    pub id: i64,
    pub employee_id: i64,
    pub week_start: NaiveDate,
    pub regular_hours: Decimal,
    pub overtime_hours: Decimal,
    pub notes: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: TimecardStatus,
    pub submitted_by: Option<i64>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub employee_approved_at: Option<DateTime<Utc>>,
    pub admin_approved_by: Option<i64>,
    pub admin_approved_at: Option<DateTime<Utc>>,
    pub payroll_processed_by: Option<i64>,
    pub payroll_processed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeCard {
    pub fn total_hours(&self) -> Decimal {
        self.regular_hours
            .checked_add(self.overtime_hours)
            .unwrap_or(Decimal::MAX)
    }

    pub fn is_editable(&self) -> bool {
        EDITABLE_TIMECARD_STATUSES.contains(&self.status)
    }
}

/// The Monday of the week containing `date`.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimeCard {
    pub employee_id: i64,
    pub week_start: NaiveDate,
    #[serde(default)]
    pub regular_hours: Decimal,
    #[serde(default)]
    pub overtime_hours: Decimal,
    pub notes: Option<String>,
}

impl NewTimeCard {
    /// The empty card every new employee starts with.
    pub fn default_for(employee_id: i64, hire_date: NaiveDate) -> Self {
        Self {
            employee_id,
            week_start: week_start_of(hire_date),
            regular_hours: Decimal::ZERO,
            overtime_hours: Decimal::ZERO,
            notes: None,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_hours(self.regular_hours, self.overtime_hours)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeCardUpdate {
    pub regular_hours: Option<Decimal>,
    pub overtime_hours: Option<Decimal>,
    pub notes: Option<String>,
}

impl TimeCardUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_optional_non_negative("regularHours", self.regular_hours)?;
        require_optional_non_negative("overtimeHours", self.overtime_hours)
    }

    /// Applies the present fields and re-checks the weekly total.
    pub fn apply_to(&self, card: &mut TimeCard) -> Result<(), CoreError> {
        let regular = self.regular_hours.unwrap_or(card.regular_hours);
        let overtime = self.overtime_hours.unwrap_or(card.overtime_hours);
        validate_hours(regular, overtime)?;
        card.regular_hours = regular;
        card.overtime_hours = overtime;
        if let Some(notes) = &self.notes {
            card.notes = Some(notes.clone());
        }
        Ok(())
    }
}

fn validate_hours(regular: Decimal, overtime: Decimal) -> Result<(), CoreError> {
    require_non_negative("regularHours", regular)?;
    require_non_negative("overtimeHours", overtime)?;
    match regular.checked_add(overtime) {
        Some(total) if total <= MAX_WEEKLY_HOURS => Ok(()),
        _ => Err(CoreError::invalid(
            "overtimeHours",
            format!("total hours exceed {}", MAX_WEEKLY_HOURS),
        )),
    }
}

/// Body of the stage endpoints. `reason` is required for rejections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimecardStep {
    pub actor_id: Option<i64>,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_start_is_monday() {
        let thursday = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        assert_eq!(week_start_of(thursday), NaiveDate::from_ymd_opt(2024, 8, 12).unwrap());
        let monday = NaiveDate::from_ymd_opt(2024, 8, 12).unwrap();
        assert_eq!(week_start_of(monday), monday);
    }

    #[test]
    fn more_hours_than_the_week_has_is_rejected() {
        let card = NewTimeCard {
            employee_id: 1,
            week_start: NaiveDate::from_ymd_opt(2024, 8, 12).unwrap(),
            regular_hours: dec!(160),
            overtime_hours: dec!(9),
            notes: None,
        };
        assert!(card.validate().is_err());
    }

    #[test]
    fn overflowing_hour_total_is_rejected() {
        let huge: Decimal = "50000000000000000000000000000".parse().unwrap();
        let card = NewTimeCard {
            employee_id: 1,
            week_start: NaiveDate::from_ymd_opt(2024, 8, 12).unwrap(),
            regular_hours: huge,
            overtime_hours: huge,
            notes: None,
        };
        let err = card.validate().unwrap_err();
        assert!(err.to_string().contains("overtimeHours"));

        let mut existing = TimeCard {
            id: 1,
            employee_id: 1,
            week_start: card.week_start,
            regular_hours: Decimal::ZERO,
            overtime_hours: Decimal::ZERO,
            notes: None,
            status: TimecardStatus::Draft,
            submitted_by: None,
            submitted_at: None,
            employee_approved_at: None,
            admin_approved_by: None,
            admin_approved_at: None,
            payroll_processed_by: None,
            payroll_processed_at: None,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let update = TimeCardUpdate {
            regular_hours: Some(huge),
            overtime_hours: Some(huge),
            notes: None,
        };
        assert!(update.apply_to(&mut existing).is_err());
        assert_eq!(existing.regular_hours, Decimal::ZERO);
    }

    #[test]
    fn only_draft_and_rejected_cards_are_editable() {
        assert!(EDITABLE_TIMECARD_STATUSES.contains(&TimecardStatus::Draft));
        assert!(EDITABLE_TIMECARD_STATUSES.contains(&TimecardStatus::Rejected));
        assert!(!EDITABLE_TIMECARD_STATUSES.contains(&TimecardStatus::SecretarySubmitted));
    }
}
