use crate::enums::TemplateCategory;
use crate::error::CoreError;
use crate::validation::{require_optional_text, require_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One named approval step. Templates are shown to staff as a checklist;
/// nothing enforces them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    #[serde(default)]
    pub order: i32,
    pub name: String,
    pub role: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTemplate {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub category: TemplateCategory,
    #[sqlx(json)]
    pub steps: Vec<WorkflowStep>,
    pub is_active: bool,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// Renumbers steps 1..=n in the order they were given.
pub fn number_steps(steps: &[WorkflowStep]) -> Vec<WorkflowStep> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| WorkflowStep {
            order: i as i32 + 1,
            ..step.clone()
        })
        .collect()
}

fn validate_steps(steps: &[WorkflowStep]) -> Result<(), CoreError> {
    if steps.is_empty() {
        return Err(CoreError::invalid("steps", "must contain at least one step"));
    }
    for (i, step) in steps.iter().enumerate() {
        if step.name.trim().is_empty() {
            return Err(CoreError::invalid(
                "steps",
                format!("step {} needs a name", i + 1),
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkflowTemplate {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub category: TemplateCategory,
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_by: Option<i64>,
}

impl NewWorkflowTemplate {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name)?;
        validate_steps(&self.steps)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTemplateUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<TemplateCategory>,
    pub steps: Option<Vec<WorkflowStep>>,
    pub is_active: Option<bool>,
}

impl WorkflowTemplateUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_optional_text("name", self.name.as_deref())?;
        match &self.steps {
            Some(steps) => validate_steps(steps),
            None => Ok(()),
        }
    }

    pub fn apply_to(&self, template: &mut WorkflowTemplate) {
        if let Some(v) = &self.name {
            template.name = v.clone();
        }
        if let Some(v) = &self.description {
            template.description = Some(v.clone());
        }
        if let Some(v) = self.category {
            template.category = v;
        }
        if let Some(v) = &self.steps {
            template.steps = number_steps(v);
        }
        if let Some(v) = self.is_active {
            template.is_active = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(name: &str, order: i32) -> WorkflowStep {
        WorkflowStep {
            order,
            name: name.to_string(),
            role: None,
            description: None,
        }
    }

    #[test]
    fn steps_are_renumbered_in_given_order() {
        let steps = number_steps(&[step("Principal", 7), step("HR", 0), step("Payroll", 3)]);
        let orders: Vec<i32> = steps.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(steps[1].name, "HR");
    }

    #[test]
    fn template_needs_a_step() {
        let template = NewWorkflowTemplate {
            name: "Timecard approval".to_string(),
            description: None,
            category: TemplateCategory::Timecard,
            steps: vec![],
            is_active: true,
            created_by: None,
        };
        assert!(template.validate().is_err());
    }
}
