use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Entity names written to `audit_logs.entity_type`.
pub mod entity {
    pub const EMPLOYEE: &str = "employee";
    pub const LEAVE_REQUEST: &str = "leave_request";
    pub const TIMECARD: &str = "timecard";
    pub const PAYROLL_RECORD: &str = "payroll_record";
    pub const EXTRA_PAY_REQUEST: &str = "extra_pay_request";
    pub const ONBOARDING_WORKFLOW: &str = "onboarding_workflow";
    pub const SIGNATURE_REQUEST: &str = "signature_request";
    pub const PAF: &str = "paf";
    pub const EMPLOYEE_ACCOUNT: &str = "employee_account";
    pub const SYSTEM: &str = "system";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub action: String,
    pub actor_id: Option<i64>,
    pub details: JsonValue,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub entity_type: String,
    pub entity_id: i64,
    pub action: String,
    pub actor_id: Option<i64>,
    pub details: JsonValue,
}

impl NewAuditLog {
    pub fn new(entity_type: &str, entity_id: i64, action: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            entity_id,
            action: action.to_string(),
            actor_id: None,
            details: JsonValue::Object(Default::default()),
        }
    }

    pub fn by(mut self, actor_id: Option<i64>) -> Self {
        self.actor_id = actor_id;
        self
    }

    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = details;
        self
    }
}

pub const DEFAULT_AUDIT_LIMIT: i64 = 100;
pub const MAX_AUDIT_LIMIT: i64 = 1000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFilter {
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub limit: Option<i64>,
}

impl AuditFilter {
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_AUDIT_LIMIT)
            .clamp(1, MAX_AUDIT_LIMIT)
    }

    pub fn matches(&self, log: &AuditLog) -> bool {
        self.entity_type
            .as_deref()
            .is_none_or(|t| t == log.entity_type)
            && self.entity_id.is_none_or(|id| id == log.entity_id)
    }
}
