//! Domain models for school records
//!
//! `School` is the persisted record as returned to API consumers.
//! `SchoolInput` is the raw scalar field set received from a multipart form;
//! `validate()` turns it into a trimmed, normalized `SchoolFields` or the
//! full list of violated constraints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::FieldViolation;

/// A persisted school record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct School {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact: String,
    pub image: String,
    pub email_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw scalar fields from a create/update request, prior to validation
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SchoolInput {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact: String,
    pub email_id: String,
}

/// Validated and normalized scalar fields, ready for persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolFields {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact: String,
    pub email_id: String,
}

impl SchoolInput {
    /// Validate all fields, aggregating every violation rather than
    /// stopping at the first. Text fields are trimmed and the email is
    /// normalized to lower case before the checks run.
    pub fn validate(&self) -> Result<SchoolFields, Vec<FieldViolation>> {
        let mut violations = Vec::new();

        let name = self.name.trim();
        check_length(&mut violations, "name", name, 2, 100, "School name");

        let address = self.address.trim();
        check_length(&mut violations, "address", address, 5, 200, "Address");

        let city = self.city.trim();
        check_length(&mut violations, "city", city, 2, 50, "City");

        let state = self.state.trim();
        check_length(&mut violations, "state", state, 2, 50, "State");

        let contact = self.contact.trim();
        if contact.is_empty() {
            violations.push(FieldViolation::new("contact", "Contact number is required"));
        } else if contact.len() != 10 || !contact.chars().all(|c| c.is_ascii_digit()) {
            violations.push(FieldViolation::new(
                "contact",
                "Contact number must be exactly 10 digits",
            ));
        }

        let email_id = normalize_email(&self.email_id);
        if email_id.is_empty() {
            violations.push(FieldViolation::new("email_id", "Email is required"));
        } else if !is_valid_email(&email_id) {
            violations.push(FieldViolation::new(
                "email_id",
                "Please provide a valid email address",
            ));
        }

        if !violations.is_empty() {
            return Err(violations);
        }

        Ok(SchoolFields {
            name: name.to_string(),
            address: address.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            contact: contact.to_string(),
            email_id,
        })
    }
}

fn check_length(
    violations: &mut Vec<FieldViolation>,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
    label: &str,
) {
    if value.is_empty() {
        violations.push(FieldViolation::new(field, format!("{label} is required")));
    } else {
        let len = value.chars().count();
        if len < min || len > max {
            violations.push(FieldViolation::new(
                field,
                format!("{label} must be between {min} and {max} characters"),
            ));
        }
    }
}

/// Normalize an email address: trim surrounding whitespace and lower-case it.
/// Lookups and the storage-level unique index both work on this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Syntactic email check: one `@`, a non-empty local part, and a domain
/// with at least one dot-separated label pair, no whitespace anywhere.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let Some(domain) = parts.next() else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let mut labels = domain.split('.');
    domain.contains('.') && labels.all(|l| !l.is_empty())
}
