//! crates/booking_core/src/domain.rs
//!
//! Defines the pure, core data structures for the booking application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Roles and Statuses
//=========================================================================================

/// The role attached to an account. Drives every access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Doctor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        }
    }
}

/// Lifecycle of a doctor application: pending, then approved or blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoctorStatus {
    Pending,
    Approved,
    Blocked,
}

impl DoctorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoctorStatus::Pending => "pending",
            DoctorStatus::Approved => "approved",
            DoctorStatus::Blocked => "blocked",
        }
    }
}

/// The two outcomes an administrator can give a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationDecision {
    Approved,
    Blocked,
}

impl From<ApplicationDecision> for DoctorStatus {
    fn from(decision: ApplicationDecision) -> Self {
        match decision {
            ApplicationDecision::Approved => DoctorStatus::Approved,
            ApplicationDecision::Blocked => DoctorStatus::Blocked,
        }
    }
}

/// Lifecycle of an appointment: pending, then approved or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Approved => "approved",
            AppointmentStatus::Rejected => "rejected",
        }
    }

    /// Whether an appointment in this status holds on to its slot.
    pub fn claims_slot(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Approved)
    }
}

/// The two outcomes a doctor can give a pending appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentDecision {
    Approved,
    Rejected,
}

impl From<AppointmentDecision> for AppointmentStatus {
    fn from(decision: AppointmentDecision) -> Self {
        match decision {
            AppointmentDecision::Approved => AppointmentStatus::Approved,
            AppointmentDecision::Rejected => AppointmentStatus::Rejected,
        }
    }
}

/// Error returned when a stored or submitted label does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! label_enum {
    ($ty:ty, $kind:literal, { $($label:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ParseLabelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($label => Ok($variant),)+
                    _ => Err(ParseLabelError { kind: $kind, value: s.to_string() }),
                }
            }
        }
    };
}

label_enum!(Role, "role", { "user" => Role::User, "doctor" => Role::Doctor, "admin" => Role::Admin });
label_enum!(DoctorStatus, "doctor status", {
    "pending" => DoctorStatus::Pending,
    "approved" => DoctorStatus::Approved,
    "blocked" => DoctorStatus::Blocked,
});
label_enum!(ApplicationDecision, "decision", {
    "approved" => ApplicationDecision::Approved,
    "blocked" => ApplicationDecision::Blocked,
});
label_enum!(AppointmentStatus, "appointment status", {
    "pending" => AppointmentStatus::Pending,
    "approved" => AppointmentStatus::Approved,
    "rejected" => AppointmentStatus::Rejected,
});
label_enum!(AppointmentDecision, "appointment decision", {
    "approved" => AppointmentDecision::Approved,
    "rejected" => AppointmentDecision::Rejected,
});

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DoctorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=========================================================================================
// Entities
//=========================================================================================

/// A user profile. Every signed-in identity has exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub account_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// A doctor's application, which doubles as the doctor's public profile once approved.
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorApplication {
    pub id: Uuid,
    pub account_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub experience: i32,
    pub fee: i32,
    pub phone: String,
    pub address: String,
    pub status: DoctorStatus,
    pub timings: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl DoctorApplication {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The fields an applicant fills in. Validated before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDoctorApplication {
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub experience: i32,
    pub fee: i32,
    pub phone: String,
    pub address: String,
    pub timings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub account_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub account_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
}

/// An appointment joined with the doctor it was booked with.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentWithDoctor {
    pub appointment: Appointment,
    pub doctor: DoctorApplication,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub message: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub recipient_id: Uuid,
    pub message: String,
}

impl NewNotification {
    pub fn new(recipient_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            recipient_id,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" blocked ".parse::<ApplicationDecision>(), Ok(ApplicationDecision::Blocked));
        assert_eq!("REJECTED".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Rejected));
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = "pending".parse::<AppointmentDecision>().unwrap_err();
        assert_eq!(err.kind, "appointment decision");
        assert_eq!(err.value, "pending");
    }

    #[test]
    fn only_live_appointments_claim_their_slot() {
        assert!(AppointmentStatus::Pending.claims_slot());
        assert!(AppointmentStatus::Approved.claims_slot());
        assert!(!AppointmentStatus::Rejected.claims_slot());
    }
}
