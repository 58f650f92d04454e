//! crates/booking_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete store and identity provider.

use crate::domain::{
    Account, AccountCredentials, Appointment, AppointmentStatus, AppointmentWithDoctor,
    DoctorApplication, DoctorStatus, NewAppointment, NewDoctorApplication, NewNotification,
    Notification, Role,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use futures::Stream;
use std::pin::Pin;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Live feed of notification rows inserted for a single recipient.
pub type NotificationStream = Pin<Box<dyn Stream<Item = Notification> + Send>>;

/// Which side of an appointment a listing is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentOwner {
    Patient(Uuid),
    Doctor(Uuid),
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DataGateway: Send + Sync {
    // --- Profiles ---
    async fn get_account(&self, account_id: Uuid) -> PortResult<Account>;

    async fn list_accounts_by_role(&self, role: Role) -> PortResult<Vec<Account>>;

    async fn update_account_role(&self, account_id: Uuid, role: Role) -> PortResult<()>;

    // --- Doctors ---
    async fn insert_doctor(
        &self,
        account_id: Uuid,
        application: &NewDoctorApplication,
    ) -> PortResult<DoctorApplication>;

    async fn get_doctor(&self, doctor_id: Uuid) -> PortResult<DoctorApplication>;

    /// The application owned by an account, if it has submitted one.
    async fn get_doctor_by_owner(&self, account_id: Uuid) -> PortResult<Option<DoctorApplication>>;

    /// Applications in a status, newest first.
    async fn list_doctors_by_status(
        &self,
        status: DoctorStatus,
        limit: Option<i64>,
    ) -> PortResult<Vec<DoctorApplication>>;

    async fn count_doctors_by_status(&self, status: DoctorStatus) -> PortResult<i64>;

    /// Moves a pending application to `status`. `Conflict` if the row exists
    /// but is no longer pending.
    async fn update_doctor_status(&self, doctor_id: Uuid, status: DoctorStatus) -> PortResult<()>;

    // --- Appointments ---
    async fn insert_appointment(&self, appointment: &NewAppointment) -> PortResult<Appointment>;

    async fn get_appointment(&self, appointment_id: Uuid) -> PortResult<Appointment>;

    /// Appointments for one doctor on one date whose status is in `statuses`.
    async fn list_appointments_for_slot(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> PortResult<Vec<Appointment>>;

    /// Appointments joined with their doctor, ordered by date ascending.
    async fn list_appointments(
        &self,
        owner: AppointmentOwner,
    ) -> PortResult<Vec<AppointmentWithDoctor>>;

    async fn count_appointments(&self) -> PortResult<i64>;

    /// Moves a pending appointment to `status`. `Conflict` if the row exists
    /// but is no longer pending.
    async fn update_appointment_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> PortResult<()>;

    // --- Notifications ---
    async fn insert_notifications(
        &self,
        notifications: &[NewNotification],
    ) -> PortResult<Vec<Notification>>;

    async fn get_notification(&self, notification_id: Uuid) -> PortResult<Notification>;

    /// Notifications for a recipient, newest first.
    async fn list_notifications(&self, account_id: Uuid) -> PortResult<Vec<Notification>>;

    /// Sets `seen` on an unseen notification. Returns `false` when nothing was written.
    async fn mark_notification_seen(&self, notification_id: Uuid) -> PortResult<bool>;

    /// Opens a live feed of notifications inserted for `account_id` from now on.
    async fn notification_inserts(&self, account_id: Uuid) -> PortResult<NotificationStream>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account with the `user` role.
    async fn create_account_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<Account>;

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<AccountCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}
