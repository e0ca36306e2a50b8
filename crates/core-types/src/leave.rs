use crate::enums::LeaveStatus;
use crate::error::CoreError;
use crate::validation::{require_date_order, require_text};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Annual allowance in days. `None` means unlimited (e.g. jury duty).
    pub max_days: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeaveType {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub max_days: Option<i32>,
}

impl NewLeaveType {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name)?;
        if matches!(self.max_days, Some(days) if days < 0) {
            return Err(CoreError::invalid("maxDays", "must not be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: i64,
    pub employee_id: i64,
    pub leave_type_id: Option<i64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: LeaveStatus,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Calendar days covered, inclusive of both ends.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeaveRequest {
    pub employee_id: i64,
    pub leave_type_id: Option<i64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

impl NewLeaveRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_date_order("startDate", self.start_date, "endDate", self.end_date)
    }
}

/// Body of the approve / reject / cancel endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveDecision {
    pub reviewer_id: Option<i64>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_before_start_is_rejected() {
        let req = NewLeaveRequest {
            employee_id: 1,
            leave_type_id: None,
            start_date: NaiveDate::from_ymd_opt(2024, 10, 7).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 10, 4).unwrap(),
            reason: None,
        };
        assert!(req.validate().is_err());
    }
}
