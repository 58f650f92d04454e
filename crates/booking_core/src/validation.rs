//! crates/booking_core/src/validation.rs
//!
//! Input checks run before any write is attempted.

use crate::domain::NewDoctorApplication;
use crate::error::{WorkflowError, WorkflowResult};
use chrono::NaiveTime;
use regex::Regex;
use std::sync::OnceLock;

fn time_label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(0[1-9]|1[0-2]):[0-5][0-9] (AM|PM)$").expect("time label pattern compiles")
    })
}

/// Whether `label` is a 12-hour slot label such as `09:30 AM`.
pub fn is_time_label(label: &str) -> bool {
    time_label_pattern().is_match(label)
}

/// Clock time of a slot label; `None` for anything `is_time_label` rejects.
pub fn time_of_day(label: &str) -> Option<NaiveTime> {
    if !is_time_label(label) {
        return None;
    }
    NaiveTime::parse_from_str(label, "%I:%M %p").ok()
}

fn required(field: &str, value: &str) -> WorkflowResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Checks an application and returns it normalized: text fields trimmed and
/// duplicate timings dropped (first occurrence wins).
pub fn validate_application(fields: &NewDoctorApplication) -> WorkflowResult<NewDoctorApplication> {
    if fields.experience < 0 {
        return Err(WorkflowError::Validation(
            "experience cannot be negative".to_string(),
        ));
    }
    if fields.fee < 0 {
        return Err(WorkflowError::Validation("fee cannot be negative".to_string()));
    }

    let mut timings: Vec<String> = Vec::with_capacity(fields.timings.len());
    for raw in &fields.timings {
        let label = raw.trim();
        if !is_time_label(label) {
            return Err(WorkflowError::Validation(format!(
                "'{}' is not a valid time slot",
                raw
            )));
        }
        if !timings.iter().any(|t| t == label) {
            timings.push(label.to_string());
        }
    }

    Ok(NewDoctorApplication {
        first_name: required("first_name", &fields.first_name)?,
        last_name: required("last_name", &fields.last_name)?,
        specialization: required("specialization", &fields.specialization)?,
        experience: fields.experience,
        fee: fields.fee,
        phone: required("phone", &fields.phone)?,
        address: required("address", &fields.address)?,
        timings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> NewDoctorApplication {
        NewDoctorApplication {
            first_name: " Ann ".to_string(),
            last_name: "Lee".to_string(),
            specialization: "Cardiology".to_string(),
            experience: 7,
            fee: 120,
            phone: "555-0100".to_string(),
            address: "1 Main St".to_string(),
            timings: vec![
                "09:00 AM".to_string(),
                "10:00 AM".to_string(),
                "09:00 AM".to_string(),
            ],
        }
    }

    #[test]
    fn normalizes_a_valid_application() {
        let valid = validate_application(&fields()).unwrap();
        assert_eq!(valid.first_name, "Ann");
        assert_eq!(valid.timings, vec!["09:00 AM", "10:00 AM"]);
    }

    #[test]
    fn rejects_blank_required_fields() {
        let mut input = fields();
        input.phone = "   ".to_string();
        let err = validate_application(&input).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(msg) if msg.contains("phone")));
    }

    #[test]
    fn rejects_negative_amounts() {
        let mut input = fields();
        input.fee = -1;
        assert!(validate_application(&input).is_err());

        let mut input = fields();
        input.experience = -3;
        assert!(validate_application(&input).is_err());
    }

    #[test]
    fn time_labels_use_the_twelve_hour_clock() {
        assert!(is_time_label("02:30 PM"));
        assert!(is_time_label("12:00 AM"));
        assert!(!is_time_label("14:00"));
        assert!(!is_time_label("13:00 PM"));
        assert!(!is_time_label("9:00 AM"));
    }

    #[test]
    fn afternoon_labels_sort_after_morning_ones() {
        let nine = time_of_day("09:00 AM").unwrap();
        let two = time_of_day("02:00 PM").unwrap();
        assert!(nine < two);
        assert_eq!(time_of_day("12:15 AM"), NaiveTime::from_hms_opt(0, 15, 0));
        assert_eq!(time_of_day("12:15 PM"), NaiveTime::from_hms_opt(12, 15, 0));
        assert_eq!(time_of_day("noon"), None);
    }
}
