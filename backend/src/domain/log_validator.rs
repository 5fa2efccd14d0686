//! Validation of a single raw activity log entry.
//!
//! Rules are independent and all collected, so one invalid item reports
//! every violation it has. The only coupling is the combined
//! `DATE_AND_VALUE_REQUIRED` code, which supersedes the two individual
//! "required" violations when both fields are absent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::errors::{ValidationCode, ValidationFailure};
use crate::domain::models::activity_log::ResourceType;

/// A raw, possibly partial log entry as submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawLogEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl RawLogEntry {
    /// The entry as a JSON payload, for echoing back in error reports.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// A structurally valid log entry, ready to be persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedLog {
    pub date: NaiveDate,
    pub value: i64,
}

fn failure(code: ValidationCode, message: String, description: String, entry: &RawLogEntry) -> ValidationFailure {
    ValidationFailure {
        code,
        message,
        description,
        item: entry.payload(),
    }
}

/// Validate one raw entry. Returns every violation found.
pub fn validate(entry: &RawLogEntry) -> Result<ValidatedLog, Vec<ValidationFailure>> {
    let mut failures = Vec::new();

    if entry.date.is_none() && entry.value.is_none() {
        // Combined code supersedes the two individual "required" errors.
        return Err(vec![failure(
            ValidationCode::DateAndValueRequired,
            "date and value are required".to_string(),
            "An activity log entry must carry both a date and a value.".to_string(),
            entry,
        )]);
    }

    let date = match &entry.date {
        None => {
            failures.push(failure(
                ValidationCode::DateRequired,
                "date is required".to_string(),
                "An activity log entry must carry a date.".to_string(),
                entry,
            ));
            None
        }
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                failures.push(failure(
                    ValidationCode::InvalidDateFormat,
                    format!("'{}' is not a valid yyyy-MM-dd date", raw),
                    "Dates must be real calendar days in yyyy-MM-dd format.".to_string(),
                    entry,
                ));
                None
            }
        },
    };

    let value = match &entry.value {
        None => {
            failures.push(failure(
                ValidationCode::ValueRequired,
                "value is required".to_string(),
                "An activity log entry must carry a value.".to_string(),
                entry,
            ));
            None
        }
        Some(raw) => match parse_value(raw) {
            Some(number) if number < 0.0 => {
                failures.push(failure(
                    ValidationCode::ValueNegative,
                    "value must not be negative".to_string(),
                    "Activity values are daily totals and cannot be negative.".to_string(),
                    entry,
                ));
                None
            }
            Some(number) => Some(number as i64),
            None => {
                failures.push(failure(
                    ValidationCode::ValueNotANumber,
                    "value is not a finite number".to_string(),
                    "Activity values must be finite numbers.".to_string(),
                    entry,
                ));
                None
            }
        },
    };

    match (date, value) {
        (Some(date), Some(value)) if failures.is_empty() => Ok(ValidatedLog { date, value }),
        _ => Err(failures),
    }
}

/// Extract a finite number from the raw JSON value. Numeric strings are
/// accepted; anything non-finite or non-numeric is rejected.
fn parse_value(raw: &serde_json::Value) -> Option<f64> {
    let number = match raw {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Validate a resource name against the five supported types.
pub fn validate_resource_name(name: &str) -> Result<ResourceType, ValidationFailure> {
    ResourceType::from_name(name).ok_or_else(|| ValidationFailure {
        code: ValidationCode::UnsupportedResourceType,
        message: format!(
            "resource type '{}' is not supported; allowed: {}",
            name,
            ResourceType::allowed_names()
        ),
        description: format!(
            "Supported resource types are: {}.",
            ResourceType::allowed_names()
        ),
        item: serde_json::json!({ "resource": name }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(date: Option<&str>, value: Option<serde_json::Value>) -> RawLogEntry {
        RawLogEntry {
            date: date.map(|d| d.to_string()),
            value,
        }
    }

    #[test]
    fn test_valid_entry() {
        let validated = validate(&entry(Some("2019-01-01"), Some(json!(100)))).unwrap();
        assert_eq!(validated.date.to_string(), "2019-01-01");
        assert_eq!(validated.value, 100);
    }

    #[test]
    fn test_numeric_string_value_accepted() {
        let validated = validate(&entry(Some("2019-01-01"), Some(json!("42")))).unwrap();
        assert_eq!(validated.value, 42);
    }

    #[test]
    fn test_missing_date() {
        let failures = validate(&entry(None, Some(json!(10)))).unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].code, ValidationCode::DateRequired);
        assert_eq!(failures[0].item, json!({ "value": 10 }));
    }

    #[test]
    fn test_missing_value() {
        let failures = validate(&entry(Some("2019-01-01"), None)).unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].code, ValidationCode::ValueRequired);
    }

    #[test]
    fn test_both_missing_collapses_to_combined_code() {
        let failures = validate(&RawLogEntry::default()).unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].code, ValidationCode::DateAndValueRequired);
    }

    #[test]
    fn test_invalid_date_format_echoes_raw_string() {
        let failures = validate(&entry(Some("01/02/2019"), Some(json!(5)))).unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].code, ValidationCode::InvalidDateFormat);
        assert!(failures[0].message.contains("01/02/2019"));
    }

    #[test]
    fn test_impossible_calendar_date_rejected() {
        let failures = validate(&entry(Some("2019-02-30"), Some(json!(5)))).unwrap_err();
        assert_eq!(failures[0].code, ValidationCode::InvalidDateFormat);
    }

    #[test]
    fn test_value_not_a_number() {
        let failures = validate(&entry(Some("2019-01-01"), Some(json!("abc")))).unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].code, ValidationCode::ValueNotANumber);

        let failures = validate(&entry(Some("2019-01-01"), Some(json!("Infinity")))).unwrap_err();
        assert_eq!(failures[0].code, ValidationCode::ValueNotANumber);

        let failures = validate(&entry(Some("2019-01-01"), Some(json!([1, 2])))).unwrap_err();
        assert_eq!(failures[0].code, ValidationCode::ValueNotANumber);
    }

    #[test]
    fn test_negative_value() {
        let failures = validate(&entry(Some("2019-01-01"), Some(json!(-1)))).unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].code, ValidationCode::ValueNegative);
    }

    #[test]
    fn test_multiple_violations_all_collected() {
        let failures = validate(&entry(Some("not-a-date"), Some(json!(-5)))).unwrap_err();
        let codes: Vec<_> = failures.iter().map(|f| f.code).collect();
        assert_eq!(
            codes,
            vec![ValidationCode::InvalidDateFormat, ValidationCode::ValueNegative]
        );
    }

    #[test]
    fn test_resource_name_validation() {
        assert_eq!(validate_resource_name("steps").unwrap(), ResourceType::Steps);
        let failure = validate_resource_name("heart_rate").unwrap_err();
        assert_eq!(failure.code, ValidationCode::UnsupportedResourceType);
        for name in ["steps", "calories", "active_minutes", "lightly_active_minutes", "sedentary_minutes"] {
            assert!(failure.message.contains(name));
        }
    }
}
