//! Input checks applied before any remote call is made.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::errors::ModelError;

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let invalid = || ModelError::Validation("invalid email".into());
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_itinerary_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    if name.chars().count() > 200 {
        return Err(ModelError::Validation("name too long (<=200)".into()));
    }
    Ok(())
}

/// Calendar day of a date or date-time string.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

pub fn validate_date_value(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() || parse_day(value).is_some() {
        Ok(())
    } else {
        Err(ModelError::Validation(format!(
            "{field} must be YYYY-MM-DD or an RFC 3339 date-time"
        )))
    }
}

pub fn validate_date_range(start: &str, end: &str) -> Result<(), ModelError> {
    match (parse_day(start), parse_day(end)) {
        (Some(s), Some(e)) if e < s => Err(ModelError::Validation(
            "date_end must not be before date_start".into(),
        )),
        _ => Ok(()),
    }
}
