use crate::enums::{OnboardingStatus, SubmissionStatus};
use crate::error::CoreError;
use crate::validation::{require_optional_text, require_text};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingWorkflow {
    pub id: i64,
    pub employee_id: i64,
    pub title: String,
    #[sqlx(try_from = "String")]
    pub status: OnboardingStatus,
    /// Number of steps completed so far.
    pub current_step: i32,
    pub total_steps: i32,
    pub assigned_to: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OnboardingWorkflow {
    /// Step counter and status after completing one more step, or `None`
    /// when the workflow is already complete.
    pub fn next_step(&self) -> Option<(i32, OnboardingStatus)> {
        if self.status == OnboardingStatus::Completed {
            return None;
        }
        let step = self.current_step + 1;
        let status = if step >= self.total_steps {
            OnboardingStatus::Completed
        } else {
            OnboardingStatus::InProgress
        };
        Some((step, status))
    }
}

fn default_total_steps() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOnboardingWorkflow {
    pub employee_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_total_steps")]
    pub total_steps: i32,
    pub assigned_to: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewOnboardingWorkflow {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("title", &self.title)?;
        if self.total_steps < 1 {
            return Err(CoreError::invalid("totalSteps", "must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingWorkflowUpdate {
    pub title: Option<String>,
    pub assigned_to: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl OnboardingWorkflowUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_optional_text("title", self.title.as_deref())
    }

    pub fn apply_to(&self, workflow: &mut OnboardingWorkflow) {
        if let Some(v) = &self.title {
            workflow.title = v.clone();
        }
        if let Some(v) = self.assigned_to {
            workflow.assigned_to = Some(v);
        }
        if let Some(v) = self.due_date {
            workflow.due_date = Some(v);
        }
        if let Some(v) = &self.notes {
            workflow.notes = Some(v.clone());
        }
    }
}

/// A fillable form (W-4, emergency contacts, direct deposit...). `fields`
/// is the form definition the UI renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingForm {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub form_type: String,
    pub fields: JsonValue,
    pub is_active: bool,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

fn empty_fields() -> JsonValue {
    JsonValue::Array(Vec::new())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOnboardingForm {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub form_type: String,
    #[serde(default = "empty_fields")]
    pub fields: JsonValue,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_by: Option<i64>,
}

impl NewOnboardingForm {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("title", &self.title)?;
        require_text("formType", &self.form_type)?;
        validate_fields(&self.fields)
    }
}

fn validate_fields(fields: &JsonValue) -> Result<(), CoreError> {
    if !fields.is_array() {
        return Err(CoreError::invalid("fields", "must be a list"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingFormUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub form_type: Option<String>,
    pub fields: Option<JsonValue>,
    pub is_active: Option<bool>,
}

impl OnboardingFormUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_optional_text("title", self.title.as_deref())?;
        require_optional_text("formType", self.form_type.as_deref())?;
        match &self.fields {
            Some(fields) => validate_fields(fields),
            None => Ok(()),
        }
    }

    pub fn apply_to(&self, form: &mut OnboardingForm) {
        if let Some(v) = &self.title {
            form.title = v.clone();
        }
        if let Some(v) = &self.description {
            form.description = Some(v.clone());
        }
        if let Some(v) = &self.form_type {
            form.form_type = v.clone();
        }
        if let Some(v) = &self.fields {
            form.fields = v.clone();
        }
        if let Some(v) = self.is_active {
            form.is_active = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingSubmission {
    pub id: i64,
    pub form_id: i64,
    pub employee_id: i64,
    pub data: JsonValue,
    #[sqlx(try_from = "String")]
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOnboardingSubmission {
    pub employee_id: i64,
    pub data: JsonValue,
}

impl NewOnboardingSubmission {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.data.is_object() {
            return Err(CoreError::invalid("data", "must be an object"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(
        current_step: i32,
        total_steps: i32,
        status: OnboardingStatus,
    ) -> OnboardingWorkflow {
        OnboardingWorkflow {
            id: 1,
            employee_id: 1,
            title: "New hire".to_string(),
            status,
            current_step,
            total_steps,
            assigned_to: None,
            due_date: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn last_step_completes_the_workflow() {
        let wf = workflow(2, 3, OnboardingStatus::InProgress);
        assert_eq!(wf.next_step(), Some((3, OnboardingStatus::Completed)));
        let wf = workflow(0, 3, OnboardingStatus::NotStarted);
        assert_eq!(wf.next_step(), Some((1, OnboardingStatus::InProgress)));
    }

    #[test]
    fn completed_workflow_does_not_advance() {
        let wf = workflow(3, 3, OnboardingStatus::Completed);
        assert_eq!(wf.next_step(), None);
    }
}
