//! Field-level validation glue between `validator` and [`FieldErrors`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use super::errors::FieldErrors;

/// Optional `+`, optional `1`, then 9 to 15 digits at the end of the value.
/// Unanchored at the start: anything may precede the digits.
pub static PHONE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?1?\d{9,15}$").expect("phone number pattern compiles")
});

pub const UNIQUE_MESSAGE: &str = "This field must be unique.";

/// Run the derived field rules and translate failures into client messages.
pub fn validate_fields<T: Validate>(input: &T) -> FieldErrors {
    match input.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => field_errors_from(&errors),
    }
}

pub fn field_errors_from(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, field_errors) in errors.field_errors() {
        let field: &str = field.as_ref();
        for e in field_errors.iter() {
            out.add(field, describe(e));
        }
    }
    out
}

fn describe(e: &ValidationError) -> String {
    let value = e.params.get("value").and_then(Value::as_str);
    if value.map(|v| v.trim().is_empty()).unwrap_or(false) {
        return "This field may not be blank.".to_string();
    }
    if let Some(message) = &e.message {
        return message.to_string();
    }
    match e.code.as_ref() {
        "email" => "Enter a valid email address.".to_string(),
        "length" => {
            let min = e.params.get("min").and_then(Value::as_u64);
            let max = e.params.get("max").and_then(Value::as_u64);
            let len = value.map(|v| v.chars().count() as u64);
            match (len, min, max) {
                (Some(len), Some(min), _) if len < min => {
                    format!("Ensure this field has at least {} characters.", min)
                }
                (Some(len), _, Some(max)) if len > max => {
                    format!("Ensure this field has no more than {} characters.", max)
                }
                (_, Some(min), Some(max)) => {
                    format!("Ensure this field has between {} and {} characters.", min, max)
                }
                _ => "Invalid length.".to_string(),
            }
        }
        _ => "Invalid value.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::{LoginInput, SignUpInput};

    fn valid_signup() -> SignUpInput {
        SignUpInput {
            email: "pablo@example.com".into(),
            username: "pablo".into(),
            phone_number: "+5215512345678".into(),
            password: "ride-sharing-42".into(),
            password_confirmation: "ride-sharing-42".into(),
            first_name: "Pablo".into(),
            last_name: "Trinidad".into(),
        }
    }

    #[test]
    fn phone_pattern() {
        for ok in ["+999999999", "999999999", "+1999999999", "123456789012345", "tel:5512345678", "abc123456789"] {
            assert!(PHONE_NUMBER_RE.is_match(ok), "{ok} should match");
        }
        for bad in ["12345678", "+12-345-678-90", "5512345678 ext", "+52 55 1234 5678", ""] {
            assert!(!PHONE_NUMBER_RE.is_match(bad), "{bad} should not match");
        }
    }

    #[test]
    fn valid_signup_has_no_errors() {
        assert!(validate_fields(&valid_signup()).is_empty());
    }

    #[test]
    fn length_bounds_are_reported_per_field() {
        let mut input = valid_signup();
        input.username = "abc".into();
        input.first_name = "P".into();
        input.last_name = "x".repeat(31);
        let errors = validate_fields(&input);
        assert_eq!(errors.get("username").unwrap(), ["Ensure this field has at least 4 characters.".to_string()]);
        assert_eq!(errors.get("first_name").unwrap(), ["Ensure this field has at least 2 characters.".to_string()]);
        assert_eq!(errors.get("last_name").unwrap(), ["Ensure this field has no more than 30 characters.".to_string()]);
        assert!(!errors.contains("email"));
    }

    #[test]
    fn phone_mismatch_uses_format_message() {
        let mut input = valid_signup();
        input.phone_number = "55-1234".into();
        let errors = validate_fields(&input);
        assert_eq!(
            errors.get("phone_number").unwrap(),
            ["Phone number must be entered in the format: +999999999. Up to 15 digits allowed.".to_string()]
        );
    }

    #[test]
    fn blank_and_malformed_email() {
        let login = LoginInput { email: String::new(), password: "long-enough".into() };
        let errors = validate_fields(&login);
        assert_eq!(errors.get("email").unwrap(), ["This field may not be blank.".to_string()]);

        let login = LoginInput { email: "not-an-email".into(), password: "long-enough".into() };
        let errors = validate_fields(&login);
        assert_eq!(errors.get("email").unwrap(), ["Enter a valid email address.".to_string()]);
    }

    #[test]
    fn password_upper_bound() {
        let mut input = valid_signup();
        input.password = "p".repeat(65);
        let errors = validate_fields(&input);
        assert_eq!(errors.get("password").unwrap(), ["Ensure this field has no more than 64 characters.".to_string()]);
    }
}
