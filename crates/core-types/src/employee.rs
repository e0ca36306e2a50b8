use crate::enums::EmployeeStatus;
use crate::error::CoreError;
use crate::validation::{
    require_email, require_optional_non_negative, require_optional_text, require_text,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    /// District-assigned badge number, unique across the district.
    pub employee_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    /// certificated, classified, substitute, ...
    pub employee_type: String,
    pub hire_date: NaiveDate,
    pub salary: Option<Decimal>,
    #[sqlx(try_from = "String")]
    pub status: EmployeeStatus,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn default_employee_type() -> String {
    "classified".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[serde(default)]
    pub employee_number: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
    #[serde(default = "default_employee_type")]
    pub employee_type: String,
    pub hire_date: NaiveDate,
    pub salary: Option<Decimal>,
    #[serde(default)]
    pub status: EmployeeStatus,
    pub user_id: Option<i64>,
}

impl NewEmployee {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("employeeNumber", &self.employee_number)?;
        require_text("firstName", &self.first_name)?;
        require_text("lastName", &self.last_name)?;
        require_email("email", &self.email)?;
        require_text("department", &self.department)?;
        require_text("position", &self.position)?;
        require_text("employeeType", &self.employee_type)?;
        require_optional_non_negative("salary", self.salary)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub employee_type: Option<String>,
    pub salary: Option<Decimal>,
    pub status: Option<EmployeeStatus>,
    pub user_id: Option<i64>,
}

impl EmployeeUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_optional_text("firstName", self.first_name.as_deref())?;
        require_optional_text("lastName", self.last_name.as_deref())?;
        if let Some(email) = &self.email {
            require_email("email", email)?;
        }
        require_optional_text("department", self.department.as_deref())?;
        require_optional_text("position", self.position.as_deref())?;
        require_optional_text("employeeType", self.employee_type.as_deref())?;
        require_optional_non_negative("salary", self.salary)
    }

    /// Applies the present fields to `employee`.
    pub fn apply_to(&self, employee: &mut Employee) {
        if let Some(v) = &self.first_name {
            employee.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            employee.last_name = v.clone();
        }
        if let Some(v) = &self.email {
            employee.email = v.clone();
        }
        if let Some(v) = &self.phone {
            employee.phone = Some(v.clone());
        }
        if let Some(v) = &self.department {
            employee.department = v.clone();
        }
        if let Some(v) = &self.position {
            employee.position = v.clone();
        }
        if let Some(v) = &self.employee_type {
            employee.employee_type = v.clone();
        }
        if let Some(v) = self.salary {
            employee.salary = Some(v);
        }
        if let Some(v) = self.status {
            employee.status = v;
        }
        if let Some(v) = self.user_id {
            employee.user_id = Some(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_optional_fields_take_defaults() {
        let new: NewEmployee = serde_json::from_value(json!({
            "employeeNumber": "E-1001",
            "firstName": "Ana",
            "lastName": "Ruiz",
            "email": "ana.ruiz@district.org",
            "department": "Transportation",
            "position": "Bus Driver",
            "hireDate": "2024-08-14"
        }))
        .unwrap();
        assert_eq!(new.employee_type, "classified");
        assert_eq!(new.status, EmployeeStatus::Active);
        assert!(new.validate().is_ok());
    }

    #[test]
    fn missing_name_fails_validation() {
        let new: NewEmployee = serde_json::from_value(json!({
            "employeeNumber": "E-1002",
            "lastName": "Ruiz",
            "email": "ana.ruiz@district.org",
            "department": "Transportation",
            "position": "Bus Driver",
            "hireDate": "2024-08-14"
        }))
        .unwrap();
        assert_eq!(
            new.validate().unwrap_err(),
            CoreError::invalid("firstName", "is required")
        );
    }

    #[test]
    fn blank_employee_type_update_is_rejected() {
        let update: EmployeeUpdate = serde_json::from_value(json!({ "employeeType": "" })).unwrap();
        assert_eq!(
            update.validate().unwrap_err(),
            CoreError::invalid("employeeType", "is required")
        );

        let update: EmployeeUpdate =
            serde_json::from_value(json!({ "employeeType": "certificated" })).unwrap();
        assert!(update.validate().is_ok());
    }
}
