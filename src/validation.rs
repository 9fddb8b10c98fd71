use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;
use crate::services::auth::Registration;
use crate::services::company::CompanyPatch;
use crate::services::users::{NewUserRequest, UserPatch};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").unwrap()
});

const FULL_NAME: (usize, usize) = (3, 100);
const PASSWORD: (usize, usize) = (6, 100);
const COMPANY_NAME: (usize, usize) = (2, 150);
const TAX_ID: (usize, usize) = (3, 50);

fn email(field: &str, value: &str) -> Result<(), AppError> {
    if value.len() > 254 || !EMAIL_RE.is_match(value) {
        return Err(AppError::BadRequest(format!("{field} must be a valid email")));
    }
    Ok(())
}

/// Length in characters, inclusive on both ends.
fn length(field: &str, value: &str, (min, max): (usize, usize)) -> Result<(), AppError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::BadRequest(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

fn role_id(field: &str, value: i32) -> Result<(), AppError> {
    if value <= 0 {
        return Err(AppError::BadRequest(format!("{field} must be a positive integer")));
    }
    Ok(())
}

pub fn registration(input: &Registration) -> Result<(), AppError> {
    length("user.fullName", &input.user.full_name, FULL_NAME)?;
    email("user.email", &input.user.email)?;
    length("user.password", &input.user.password, PASSWORD)?;
    length("company.name", &input.company.name, COMPANY_NAME)?;
    length("company.taxId", &input.company.tax_id, TAX_ID)
}

pub fn login(user_email: &str, password: &str) -> Result<(), AppError> {
    email("email", user_email)?;
    length("password", password, PASSWORD)
}

pub fn new_user(input: &NewUserRequest) -> Result<(), AppError> {
    email("email", &input.email)?;
    length("fullName", &input.full_name, FULL_NAME)?;
    length("password", &input.password, PASSWORD)?;
    role_id("roleId", input.role_id)
}

pub fn user_patch(patch: &UserPatch) -> Result<(), AppError> {
    if patch.is_empty() {
        return Err(AppError::BadRequest(
            "At least one field must be provided".to_string(),
        ));
    }
    if let Some(full_name) = &patch.full_name {
        length("fullName", full_name, FULL_NAME)?;
    }
    if let Some(value) = &patch.email {
        email("email", value)?;
    }
    if let Some(password) = &patch.password {
        length("password", password, PASSWORD)?;
    }
    if let Some(value) = patch.role_id {
        role_id("roleId", value)?;
    }
    Ok(())
}

pub fn company_patch(patch: &CompanyPatch) -> Result<(), AppError> {
    if patch.is_empty() {
        return Err(AppError::BadRequest(
            "At least one field must be provided".to_string(),
        ));
    }
    if let Some(name) = &patch.name {
        length("name", name, COMPANY_NAME)?;
    }
    if let Some(tax_id) = &patch.tax_id {
        length("taxId", tax_id, TAX_ID)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::{RegisterCompany, RegisterUser};

    fn message(result: Result<(), AppError>) -> String {
        match result {
            Err(AppError::BadRequest(msg)) => msg,
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    fn registration_with(full_name: &str, email: &str, tax_id: &str) -> Registration {
        Registration {
            user: RegisterUser {
                full_name: full_name.to_string(),
                email: email.to_string(),
                password: "123456".to_string(),
            },
            company: RegisterCompany {
                name: "ACME".to_string(),
                tax_id: tax_id.to_string(),
            },
        }
    }

    #[test]
    fn accepts_common_addresses() {
        for addr in ["juan@x.com", "a.b+tag@sub.example.co", "x_y@dom-ain.io"] {
            assert!(email("email", addr).is_ok(), "{addr}");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for addr in ["", "plain", "@x.com", "a@", "a@b", "a b@x.com", "a@x.c"] {
            assert!(email("email", addr).is_err(), "{addr}");
        }
    }

    #[test]
    fn registration_accepts_minimal_valid_input() {
        assert!(registration(&registration_with("Juan Pérez", "juan@x.com", "123")).is_ok());
    }

    #[test]
    fn registration_reports_first_failing_field() {
        let msg = message(registration(&registration_with("Jo", "bad", "1")));
        assert!(msg.starts_with("user.fullName"), "{msg}");

        let msg = message(registration(&registration_with("Juan", "juan@x.com", "12")));
        assert!(msg.starts_with("company.taxId"), "{msg}");
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        // three two-byte characters
        assert!(length("fullName", "ñáé", FULL_NAME).is_ok());
        assert!(length("fullName", "ñá", FULL_NAME).is_err());
    }

    #[test]
    fn empty_patches_are_rejected() {
        assert!(user_patch(&UserPatch::default()).is_err());
        assert!(company_patch(&CompanyPatch::default()).is_err());
    }

    #[test]
    fn patch_fields_are_checked_when_present() {
        let patch = UserPatch {
            role_id: Some(0),
            ..Default::default()
        };
        assert!(message(user_patch(&patch)).starts_with("roleId"));

        let patch = UserPatch {
            active: Some(false),
            ..Default::default()
        };
        assert!(user_patch(&patch).is_ok());

        let patch = CompanyPatch {
            name: Some("X".to_string()),
            tax_id: None,
        };
        assert!(message(company_patch(&patch)).starts_with("name"));
    }

    #[test]
    fn new_user_requires_positive_role() {
        let input = NewUserRequest {
            email: "op@x.com".to_string(),
            full_name: "Operator".to_string(),
            password: "123456".to_string(),
            role_id: -1,
            company_id: None,
        };
        assert!(message(new_user(&input)).starts_with("roleId"));
    }
}
