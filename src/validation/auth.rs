use garde::Validate;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::error::{AppError, FieldError, Result};

/// Raw login input, as submitted. Missing fields arrive as empty strings.
#[derive(Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[garde(email, custom(dotted_domain))]
    pub email: String,
    #[garde(skip)]
    pub password: String,
}

/// Raw signup input, as submitted.
///
/// Passwords and names are limited to 20 characters; names are ASCII letters
/// and digits only.
#[derive(Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupForm {
    #[garde(email, custom(dotted_domain))]
    pub email: String,
    #[garde(length(chars, min = 1, max = 20))]
    pub password: String,
    #[garde(length(chars, min = 1, max = 20), custom(ascii_alphanumeric))]
    pub name: String,
}

/// Login input that passed validation.
pub struct LoginCredentials {
    pub email: String,
    pub password: Zeroizing<String>,
}

/// Signup input that passed validation.
#[cfg_attr(test, derive(Debug))]
pub struct SignupCredentials {
    pub email: String,
    pub password: Zeroizing<String>,
    pub name: String,
}

fn ascii_alphanumeric(value: &str, _ctx: &()) -> garde::Result {
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(garde::Error::new("must only contain letters and digits"))
    }
}

/// Requires a host name with at least two labels and an alphabetic top-level
/// label, so `a@localhost` and `a@[127.0.0.1]` are refused.
///
/// Values without an `@` are left to the `email` rule.
fn dotted_domain(value: &str, _ctx: &()) -> garde::Result {
    let Some((_, domain)) = value.rsplit_once('@') else {
        return Ok(());
    };
    let labels: Vec<&str> = domain.split('.').collect();
    let tld = labels.last().copied().unwrap_or_default();
    let valid = !domain.starts_with('[')
        && labels.len() >= 2
        && labels.iter().all(|label| !label.is_empty())
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic());
    if valid {
        Ok(())
    } else {
        Err(garde::Error::new("domain must be a dotted host name"))
    }
}

/// Flattens a garde report into field errors, keeping declaration order.
fn field_errors(report: garde::Report) -> AppError {
    AppError::Validation(
        report
            .iter()
            .map(|(path, error)| FieldError {
                field: path.to_string(),
                reason: error.message().to_string(),
            })
            .collect(),
    )
}

/// Validates the email submitted on the login form.
///
/// Only the address shape is checked; password problems surface later as a
/// generic authentication failure.
pub fn validate_login_email(email: &str) -> Result<()> {
    LoginForm { email: email.to_string(), password: String::new() }
        .validate()
        .map_err(field_errors)
}

impl LoginForm {
    /// Checks the form and converts it into typed credentials.
    pub fn into_credentials(self) -> Result<LoginCredentials> {
        self.validate().map_err(field_errors)?;
        Ok(LoginCredentials {
            email: self.email,
            password: Zeroizing::new(self.password),
        })
    }
}

impl SignupForm {
    /// Checks every rule and converts the form into typed credentials.
    ///
    /// # Returns
    ///
    /// The credentials, or [`AppError::Validation`] listing every violation.
    pub fn into_credentials(self) -> Result<SignupCredentials> {
        self.validate().map_err(field_errors)?;
        Ok(SignupCredentials {
            email: self.email,
            password: Zeroizing::new(self.password),
            name: self.name,
        })
    }
}

/// Validates all signup fields at once.
pub fn validate_signup_fields(email: &str, password: &str, name: &str) -> Result<SignupCredentials> {
    SignupForm {
        email: email.to_string(),
        password: password.to_string(),
        name: name.to_string(),
    }
    .into_credentials()
}
