use crate::enums::SignatureStatus;
use crate::error::CoreError;
use crate::validation::require_text;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRequest {
    pub id: i64,
    pub employee_id: i64,
    pub document_title: String,
    pub document_type: String,
    pub document_url: Option<String>,
    pub requested_by: Option<i64>,
    #[sqlx(try_from = "String")]
    pub status: SignatureStatus,
    pub signature_data: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
    pub decline_reason: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSignatureRequest {
    pub employee_id: i64,
    #[serde(default)]
    pub document_title: String,
    #[serde(default)]
    pub document_type: String,
    pub document_url: Option<String>,
    pub requested_by: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewSignatureRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("documentTitle", &self.document_title)?;
        require_text("documentType", &self.document_type)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignDocument {
    #[serde(default)]
    pub signature_data: String,
}

impl SignDocument {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("signatureData", &self.signature_data)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclineDocument {
    pub reason: Option<String>,
}
