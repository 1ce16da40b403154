//! API endpoint handlers, one module per resource.

pub mod assist;
pub mod auth;
pub mod departments;
pub mod health;
pub mod patients;
pub mod records;
pub mod templates;

use crate::api::error::ApiError;
use crate::models::enums::Department;

/// Parse a department name, rejecting unknown values with 400.
pub(crate) fn parse_department(raw: &str) -> Result<Department, ApiError> {
    raw.trim()
        .parse::<Department>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid department: {raw}")))
}

/// Trimmed, non-empty value of an optional text field.
pub(crate) fn required_text(value: Option<String>, what: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{what} is required")))
}
