/// Registration form validation
///
/// Checked before any store call. Failures stay with the form as a list of
/// field-level messages.
///
/// # Rules
///
/// - username, email, phone and password are required
/// - email must look like `local@domain`
/// - phone must carry 11 digits once formatting is stripped (`+7 (912) 345-67-89`)
/// - password must be at least 6 characters and match the confirmation

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::FieldError;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: u64 = 6;

/// Number of digits in a complete phone number
pub const PHONE_DIGITS: usize = 11;

/// Raw registration input as typed by the user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone: String,

    #[validate(length(min = 6, message = "Password is too short (min. 6)"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Trims surrounding whitespace from the identity fields
    ///
    /// Passwords are taken verbatim.
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        self.phone = self.phone.trim().to_string();
        self
    }

    /// Validates the form and flattens failures into field errors
    ///
    /// Errors are sorted by field name so the output is stable.
    pub fn check(&self) -> Result<(), Vec<FieldError>> {
        self.validate().map_err(|errors| flatten(&errors))
    }
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits == PHONE_DIGITS {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("Phone number must have 11 digits".into());
        Err(err)
    }
}

fn flatten(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                FieldError::new(field.to_string(), message)
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}
