use crate::enums::UserRole;
use crate::error::CoreError;
use crate::validation::{require_email, require_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const MIN_PASSWORD_LEN: usize = 8;

/// A staff login. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: String,
    pub email: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("username", &self.username)?;
        require_text("fullName", &self.full_name)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CoreError::invalid(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        if let Some(email) = &self.email {
            require_email("email", email)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(password: &str) -> NewUser {
        NewUser {
            username: "jdoe".to_string(),
            password: password.to_string(),
            full_name: "Jane Doe".to_string(),
            email: None,
            role: UserRole::Secretary,
        }
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(new_user("short").validate().is_err());
        assert!(new_user("long enough").validate().is_ok());
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: 1,
            username: "jdoe".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            full_name: "Jane Doe".to_string(),
            email: None,
            role: UserRole::Admin,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "admin");
    }
}
