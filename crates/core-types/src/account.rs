use crate::enums::{AccessLevel, AccountStatus};
use crate::error::CoreError;
use crate::validation::{require_email, require_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An employee's access to district systems, provisioned by HR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeAccount {
    pub id: i64,
    pub employee_id: i64,
    pub username: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub access_level: AccessLevel,
    #[sqlx(try_from = "String")]
    pub status: AccountStatus,
    pub granted_by: Option<i64>,
    pub granted_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployeeAccount {
    pub employee_id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl NewEmployeeAccount {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("username", &self.username)?;
        require_email("email", &self.email)
    }
}

fn default_grant_level() -> AccessLevel {
    AccessLevel::Basic
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantAccess {
    #[serde(default = "default_grant_level")]
    pub access_level: AccessLevel,
    pub granted_by: Option<i64>,
}

impl Default for GrantAccess {
    fn default() -> Self {
        Self {
            access_level: default_grant_level(),
            granted_by: None,
        }
    }
}

impl GrantAccess {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.access_level == AccessLevel::NoAccess {
            return Err(CoreError::invalid(
                "accessLevel",
                "use revoke-access to remove access",
            ));
        }
        Ok(())
    }
}

/// Body of the suspend / revoke-access endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountChange {
    pub actor_id: Option<i64>,
}
