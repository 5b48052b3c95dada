//! User entity and auth payloads.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::{validate_required_text, ValidationError};

pub const USER_NAME_MAX: usize = 100;
pub const USER_EMAIL_MAX: usize = 150;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"))
}

/// Validate and normalize an email address.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim().to_lowercase();
    if email.chars().count() > USER_EMAIL_MAX {
        return Err(ValidationError::new(format!(
            "Email must be {USER_EMAIL_MAX} characters or less"
        )));
    }
    if !email_regex().is_match(&email) {
        return Err(ValidationError::new("Invalid email address"));
    }
    Ok(email)
}

/// Password policy: at least 8 characters with an uppercase letter, a
/// lowercase letter, and a digit.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= 8;
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if long_enough && has_lower && has_upper && has_digit {
        Ok(())
    } else {
        Err(ValidationError::new(
            "Password must be at least 8 characters with uppercase, lowercase, and number",
        ))
    }
}

/// A user row. The password hash never leaves the store layer's callers;
/// responses use [`UserResponse`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to register or create a user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl UserCreate {
    /// Validate fields; returns the normalized (name, email) pair.
    pub fn validated(&self) -> Result<(String, String), ValidationError> {
        let name = validate_required_text(&self.name, "Name", USER_NAME_MAX)?;
        let email = validate_email(&self.email)?;
        validate_password(&self.password)?;
        Ok((name, email))
    }
}

/// Request to update a user. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
}

/// Login credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct UserLogin {
    pub email: String,
    pub password: String,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Response for successful login or registration.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserResponse,
}

impl LoginResponse {
    pub fn new(access_token: String, user: UserResponse) -> Self {
        Self {
            access_token,
            token_type: "bearer",
            user,
        }
    }
}
