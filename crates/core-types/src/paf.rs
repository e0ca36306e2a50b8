use crate::enums::{PafStatus, PafType};
use crate::error::CoreError;
use crate::validation::{require_optional_non_negative, require_optional_text, require_text};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A personnel action form: a request to create, fill, change or vacate a
/// staffing position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Paf {
    pub id: i64,
    #[sqlx(try_from = "String")]
    pub paf_type: PafType,
    pub position_title: String,
    pub department: String,
    pub justification: String,
    pub employee_id: Option<i64>,
    pub requested_by: Option<i64>,
    pub salary: Option<Decimal>,
    pub fte: Option<Decimal>,
    pub effective_date: Option<NaiveDate>,
    pub funding_source: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: PafStatus,
    pub reviewer_notes: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub decided_by: Option<i64>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Approved and denied forms are frozen.
pub const EDITABLE_PAF_STATUSES: &[PafStatus] =
    &[PafStatus::Draft, PafStatus::Submitted, PafStatus::UnderReview];

impl Paf {
    pub fn is_editable(&self) -> bool {
        EDITABLE_PAF_STATUSES.contains(&self.status)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPaf {
    #[serde(default)]
    pub paf_type: PafType,
    #[serde(default)]
    pub position_title: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub justification: String,
    pub employee_id: Option<i64>,
    pub requested_by: Option<i64>,
    pub salary: Option<Decimal>,
    pub fte: Option<Decimal>,
    pub effective_date: Option<NaiveDate>,
    pub funding_source: Option<String>,
}

impl NewPaf {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("positionTitle", &self.position_title)?;
        require_text("department", &self.department)?;
        require_text("justification", &self.justification)?;
        require_optional_non_negative("salary", self.salary)?;
        validate_fte(self.fte)?;
        if matches!(self.paf_type, PafType::Replacement | PafType::Change)
            && self.employee_id.is_none()
        {
            return Err(CoreError::invalid(
                "employeeId",
                format!("is required for a {} form", self.paf_type),
            ));
        }
        Ok(())
    }
}

fn validate_fte(fte: Option<Decimal>) -> Result<(), CoreError> {
    match fte {
        Some(v) if v <= Decimal::ZERO || v > Decimal::ONE => {
            Err(CoreError::invalid("fte", "must be greater than 0 and at most 1"))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PafUpdate {
    pub position_title: Option<String>,
    pub department: Option<String>,
    pub justification: Option<String>,
    pub employee_id: Option<i64>,
    pub salary: Option<Decimal>,
    pub fte: Option<Decimal>,
    pub effective_date: Option<NaiveDate>,
    pub funding_source: Option<String>,
}

impl PafUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_optional_text("positionTitle", self.position_title.as_deref())?;
        require_optional_text("department", self.department.as_deref())?;
        require_optional_text("justification", self.justification.as_deref())?;
        require_optional_non_negative("salary", self.salary)?;
        validate_fte(self.fte)
    }

    pub fn apply_to(&self, paf: &mut Paf) {
        if let Some(v) = &self.position_title {
            paf.position_title = v.clone();
        }
        if let Some(v) = &self.department {
            paf.department = v.clone();
        }
        if let Some(v) = &self.justification {
            paf.justification = v.clone();
        }
        if let Some(v) = self.employee_id {
            paf.employee_id = Some(v);
        }
        if let Some(v) = self.salary {
            paf.salary = Some(v);
        }
        if let Some(v) = self.fte {
            paf.fte = Some(v);
        }
        if let Some(v) = self.effective_date {
            paf.effective_date = Some(v);
        }
        if let Some(v) = &self.funding_source {
            paf.funding_source = Some(v.clone());
        }
    }
}

/// Body of the submit / review / approve / deny endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PafDecision {
    pub actor_id: Option<i64>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn missing_justification_is_rejected() {
        let paf: NewPaf = serde_json::from_value(json!({
            "pafType": "new_position",
            "positionTitle": "Reading Specialist",
            "department": "Lincoln Elementary"
        }))
        .unwrap();
        assert_eq!(
            paf.validate().unwrap_err(),
            CoreError::invalid("justification", "is required")
        );
    }

    #[test]
    fn replacement_needs_the_departing_employee() {
        let paf: NewPaf = serde_json::from_value(json!({
            "pafType": "replacement",
            "positionTitle": "Custodian",
            "department": "Facilities",
            "justification": "Retirement"
        }))
        .unwrap();
        assert!(paf.validate().is_err());
    }

    #[test]
    fn fte_must_be_a_fraction_of_one() {
        assert!(validate_fte(Some(dec!(0.5))).is_ok());
        assert!(validate_fte(Some(dec!(1.0))).is_ok());
        assert!(validate_fte(Some(dec!(0))).is_err());
        assert!(validate_fte(Some(dec!(1.2))).is_err());
    }
}
