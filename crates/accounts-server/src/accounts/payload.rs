//! Request bodies for the account endpoints and their field validation.
//!
//! Every field is optional at the body level so that a missing field is
//! reported as a field error instead of a body rejection. Bodies arrive as
//! JSON or form-encoded, see [`Payload`](crate::extract::Payload).

use std::sync::LazyLock;

use accounts_auth::ProfileUpdate;
use regex::Regex;
use serde::Deserialize;

use crate::error::FieldErrors;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, \
                                    numbers, and @/./+/-/_ characters.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";

pub const USERNAME_MAX_LEN: usize = 150;
pub const LOGIN_USERNAME_MAX_LEN: usize = 255;
pub const PASSWORD_MAX_LEN: usize = 128;
pub const NAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("Invalid username regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

pub fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

/// Checks a required text field. Returns the trimmed value when it passes.
fn required(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Option<String> {
    let Some(value) = value else {
        errors.add(field, REQUIRED);
        return None;
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if trimmed.chars().count() > max {
        errors.add(field, too_long(max));
        return None;
    }
    Some(trimmed.to_string())
}

/// Checks an optional text field that may be blank.
fn optional(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.chars().count() > max {
        errors.add(field, too_long(max));
        return None;
    }
    Some(trimmed.to_string())
}

/// Body of `POST /api/accounts/`.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// A registration that passed field validation. Username uniqueness is
/// checked against the store separately.
#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = required(
            &mut errors,
            "username",
            self.username.as_deref(),
            USERNAME_MAX_LEN,
        );
        let username = username.filter(|u| {
            let ok = USERNAME_RE.is_match(u);
            if !ok {
                errors.add("username", INVALID_USERNAME);
            }
            ok
        });

        let password = required(
            &mut errors,
            "password",
            self.password.as_deref(),
            PASSWORD_MAX_LEN,
        );

        match (username, password) {
            (Some(username), Some(password)) if errors.is_empty() => {
                Ok(Registration { username, password })
            }
            _ => Err(errors),
        }
    }
}

/// Body of `POST /api/accounts/login/`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns the trimmed `(username, password)` when both fields are
    /// present and non-blank.
    pub fn validate(&self) -> Result<(String, String), FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = required(
            &mut errors,
            "username",
            self.username.as_deref(),
            LOGIN_USERNAME_MAX_LEN,
        );
        let password = required(
            &mut errors,
            "password",
            self.password.as_deref(),
            PASSWORD_MAX_LEN,
        );

        match (username, password) {
            (Some(username), Some(password)) if errors.is_empty() => Ok((username, password)),
            _ => Err(errors),
        }
    }
}

/// Body of `PUT`/`PATCH /api/accounts/{id}/`. `username` is read-only and
/// ignored when sent.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRequest {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl UpdateRequest {
    pub fn validate(&self) -> Result<ProfileUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let first_name = optional(
            &mut errors,
            "first_name",
            self.first_name.as_deref(),
            NAME_MAX_LEN,
        );
        let last_name = optional(
            &mut errors,
            "last_name",
            self.last_name.as_deref(),
            NAME_MAX_LEN,
        );
        let email = optional(&mut errors, "email", self.email.as_deref(), EMAIL_MAX_LEN)
            .filter(|e| {
                let ok = e.is_empty() || EMAIL_RE.is_match(e);
                if !ok {
                    errors.add("email", INVALID_EMAIL);
                }
                ok
            });

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ProfileUpdate {
            first_name,
            last_name,
            email,
        })
    }
}
