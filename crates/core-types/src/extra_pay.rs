use crate::enums::{ContractStatus, ExtraPayStatus};
use crate::error::CoreError;
use crate::validation::{
    require_date_order, require_non_negative, require_optional_non_negative,
    require_optional_text, require_text,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A supplemental-duty agreement (coaching, club advising, summer school...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExtraPayContract {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub contract_type: String,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub status: ContractStatus,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExtraPayContract {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub contract_type: String,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ContractStatus,
    pub created_by: Option<i64>,
}

impl NewExtraPayContract {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("title", &self.title)?;
        require_text("contractType", &self.contract_type)?;
        require_non_negative("amount", self.amount)?;
        if let Some(end) = self.end_date {
            require_date_order("startDate", self.start_date, "endDate", end)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraPayContractUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub contract_type: Option<String>,
    pub amount: Option<Decimal>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<ContractStatus>,
}

impl ExtraPayContractUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_optional_text("title", self.title.as_deref())?;
        require_optional_text("contractType", self.contract_type.as_deref())?;
        require_optional_non_negative("amount", self.amount)
    }

    pub fn apply_to(&self, contract: &mut ExtraPayContract) {
        if let Some(v) = &self.title {
            contract.title = v.clone();
        }
        if let Some(v) = &self.description {
            contract.description = Some(v.clone());
        }
        if let Some(v) = &self.contract_type {
            contract.contract_type = v.clone();
        }
        if let Some(v) = self.amount {
            contract.amount = v;
        }
        if let Some(v) = self.end_date {
            contract.end_date = Some(v);
        }
        if let Some(v) = self.status {
            contract.status = v;
        }
    }
}

/// A single payment claim made against a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExtraPayRequest {
    pub id: i64,
    pub contract_id: i64,
    pub employee_id: i64,
    pub amount: Decimal,
    pub hours_worked: Option<Decimal>,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ExtraPayStatus,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExtraPayRequest {
    pub contract_id: i64,
    pub employee_id: i64,
    /// Defaults to the contract amount.
    pub amount: Option<Decimal>,
    pub hours_worked: Option<Decimal>,
    pub description: Option<String>,
}

impl NewExtraPayRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_optional_non_negative("amount", self.amount)?;
        require_optional_non_negative("hoursWorked", self.hours_worked)
    }
}

/// Body of the approve / reject / mark-paid endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraPayDecision {
    pub actor_id: Option<i64>,
    pub reason: Option<String>,
}
