use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use wayfare_shared::Masked;

use crate::{CoreError, CoreResult};

pub const NAME_REQUIRED_MESSAGE: &str = "Name is required";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const PASSWORD_TOO_SHORT_MESSAGE: &str = "Password must be at least 6 characters";
pub const PASSWORD_CASE_MESSAGE: &str = "Password must contain both uppercase and lowercase letters";

const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Sign-in / sign-up form input. `name` is only used for sign-up.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthCredentials {
    pub email: String,
    pub password: Masked<String>,
    pub name: Option<String>,
}

impl AuthCredentials {
    pub fn sign_in(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: Masked::new(password.to_string()),
            name: None,
        }
    }

    pub fn sign_up(name: &str, email: &str, password: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::sign_in(email, password)
        }
    }
}

/// Partial profile update; `None` leaves the field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
}

impl AuthUser {
    pub fn apply(&self, update: ProfileUpdate) -> AuthUser {
        AuthUser {
            email: update.email.unwrap_or_else(|| self.email.clone()),
            name: update.name.unwrap_or_else(|| self.name.clone()),
            ..self.clone()
        }
    }
}

pub fn validate_email(email: &str) -> CoreResult<()> {
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("email pattern: {e}"))
    });
    if re.is_match(email) {
        Ok(())
    } else {
        Err(CoreError::validation(INVALID_EMAIL_MESSAGE))
    }
}

pub fn validate_password(password: &str) -> CoreResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::validation(PASSWORD_TOO_SHORT_MESSAGE));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return Err(CoreError::validation(PASSWORD_CASE_MESSAGE));
    }
    Ok(())
}

pub fn validate_name(name: Option<&str>) -> CoreResult<()> {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => Ok(()),
        _ => Err(CoreError::validation(NAME_REQUIRED_MESSAGE)),
    }
}
