//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DataGateway` and `IdentityProvider` ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`, and turns the
//! `notification_inserted` channel into per-account live feeds.

use async_trait::async_trait;
use booking_core::domain::{
    Account, AccountCredentials, Appointment, AppointmentStatus, AppointmentWithDoctor,
    DoctorApplication, DoctorStatus, NewAppointment, NewDoctorApplication, NewNotification,
    Notification, Role,
};
use booking_core::ports::{
    AppointmentOwner, DataGateway, IdentityProvider, NotificationStream, PortError, PortResult,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::postgres::PgListener;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Postgres channel the notifications trigger publishes on.
pub const NOTIFICATION_CHANNEL: &str = "notification_inserted";

/// Live pushes buffered per process before slow subscribers start losing them.
const LIVE_FEED_CAPACITY: usize = 256;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DataGateway` and `IdentityProvider` ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
    inserts: broadcast::Sender<Notification>,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        let (inserts, _) = broadcast::channel(LIVE_FEED_CAPACITY);
        Self { pool, inserts }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Starts the task that relays `notification_inserted` events to live subscribers.
    ///
    /// Delivery is at-most-once: events published while the listener reconnects are lost.
    pub async fn start_notification_listener(&self) -> Result<JoinHandle<()>, sqlx::Error> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(NOTIFICATION_CHANNEL).await?;
        let inserts = self.inserts.clone();

        let handle = tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(event) => match serde_json::from_str::<NotificationPayload>(event.payload()) {
                        // No receivers simply means nobody is watching right now.
                        Ok(payload) => {
                            let _ = inserts.send(payload.to_domain());
                        }
                        Err(e) => warn!("Discarding malformed notification event: {}", e),
                    },
                    Err(e) => {
                        error!("Notification listener error: {}", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });
        info!("Listening for notification inserts on '{}'", NOTIFICATION_CHANNEL);
        Ok(handle)
    }

    /// Explains a status update that matched no pending row: the row is
    /// either gone or was already decided by someone else.
    async fn missed_transition(&self, table: &str, what: &str, id: Uuid) -> PortError {
        let exists = sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)",
            table
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await;
        match exists {
            Ok(true) => PortError::Conflict(format!("{} {} is no longer pending", what, id)),
            Ok(false) => PortError::NotFound(format!("{} {} not found", what, id)),
            Err(e) => unexpected(e),
        }
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

fn unexpected(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            PortError::Conflict(db.message().to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

fn not_found_or(what: &str, id: impl std::fmt::Display) -> impl FnOnce(sqlx::Error) -> PortError {
    let message = format!("{} {} not found", what, id);
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(message),
        other => unexpected(other),
    }
}

fn parse_label<T>(value: &str) -> PortResult<T>
where
    T: FromStr<Err = booking_core::ParseLabelError>,
{
    value
        .parse::<T>()
        .map_err(|e| PortError::Unexpected(format!("corrupt row: {}", e)))
}

fn status_labels(statuses: &[AppointmentStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const ACCOUNT_COLUMNS: &str = "id, email, role, created_at";
const DOCTOR_COLUMNS: &str = "id, user_id, first_name, last_name, specialization, experience, \
     fee, phone, address, status, timings, created_at";
const APPOINTMENT_COLUMNS: &str = "id, user_id, doctor_id, date, time, status, created_at";
const NOTIFICATION_COLUMNS: &str = "id, user_id, message, seen, created_at";

#[derive(FromRow)]
struct AccountRecord {
    id: Uuid,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}
impl AccountRecord {
    fn to_domain(self) -> PortResult<Account> {
        Ok(Account {
            id: self.id,
            email: self.email,
            role: parse_label::<Role>(&self.role)?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> AccountCredentials {
        AccountCredentials {
            account_id: self.id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct DoctorRecord {
    id: Uuid,
    user_id: Uuid,
    first_name: String,
    last_name: String,
    specialization: String,
    experience: i32,
    fee: i32,
    phone: String,
    address: String,
    status: String,
    timings: Vec<String>,
    created_at: DateTime<Utc>,
}
impl DoctorRecord {
    fn to_domain(self) -> PortResult<DoctorApplication> {
        Ok(DoctorApplication {
            id: self.id,
            account_id: self.user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            specialization: self.specialization,
            experience: self.experience,
            fee: self.fee,
            phone: self.phone,
            address: self.address,
            status: parse_label::<DoctorStatus>(&self.status)?,
            timings: self.timings,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct AppointmentRecord {
    id: Uuid,
    user_id: Uuid,
    doctor_id: Uuid,
    date: NaiveDate,
    time: String,
    status: String,
    created_at: DateTime<Utc>,
}
impl AppointmentRecord {
    fn to_domain(self) -> PortResult<Appointment> {
        Ok(Appointment {
            id: self.id,
            account_id: self.user_id,
            doctor_id: self.doctor_id,
            date: self.date,
            time: self.time,
            status: parse_label::<AppointmentStatus>(&self.status)?,
            created_at: self.created_at,
        })
    }
}

/// One row of `appointments JOIN doctors`, doctor columns prefixed with `d_`.
#[derive(FromRow)]
struct AppointmentWithDoctorRecord {
    #[sqlx(flatten)]
    appointment: AppointmentRecord,
    d_id: Uuid,
    d_user_id: Uuid,
    d_first_name: String,
    d_last_name: String,
    d_specialization: String,
    d_experience: i32,
    d_fee: i32,
    d_phone: String,
    d_address: String,
    d_status: String,
    d_timings: Vec<String>,
    d_created_at: DateTime<Utc>,
}
impl AppointmentWithDoctorRecord {
    fn to_domain(self) -> PortResult<AppointmentWithDoctor> {
        let doctor = DoctorRecord {
            id: self.d_id,
            user_id: self.d_user_id,
            first_name: self.d_first_name,
            last_name: self.d_last_name,
            specialization: self.d_specialization,
            experience: self.d_experience,
            fee: self.d_fee,
            phone: self.d_phone,
            address: self.d_address,
            status: self.d_status,
            timings: self.d_timings,
            created_at: self.d_created_at,
        };
        Ok(AppointmentWithDoctor {
            appointment: self.appointment.to_domain()?,
            doctor: doctor.to_domain()?,
        })
    }
}

#[derive(FromRow)]
struct NotificationRecord {
    id: Uuid,
    user_id: Uuid,
    message: String,
    seen: bool,
    created_at: DateTime<Utc>,
}
impl NotificationRecord {
    fn to_domain(self) -> Notification {
        Notification {
            id: self.id,
            recipient_id: self.user_id,
            message: self.message,
            seen: self.seen,
            created_at: self.created_at,
        }
    }
}

/// The JSON row the insert trigger publishes.
#[derive(Deserialize)]
struct NotificationPayload {
    id: Uuid,
    user_id: Uuid,
    message: String,
    seen: bool,
    created_at: DateTime<Utc>,
}
impl NotificationPayload {
    fn to_domain(self) -> Notification {
        Notification {
            id: self.id,
            recipient_id: self.user_id,
            message: self.message,
            seen: self.seen,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `DataGateway` Trait Implementation
//=========================================================================================

#[async_trait]
impl DataGateway for DbAdapter {
    async fn get_account(&self, account_id: Uuid) -> PortResult<Account> {
        let record = sqlx::query_as::<_, AccountRecord>(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or("Account", account_id))?;
        record.to_domain()
    }

    async fn list_accounts_by_role(&self, role: Role) -> PortResult<Vec<Account>> {
        let records = sqlx::query_as::<_, AccountRecord>(&format!(
            "SELECT {} FROM profiles WHERE role = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn update_account_role(&self, account_id: Uuid, role: Role) -> PortResult<()> {
        let result = sqlx::query("UPDATE profiles SET role = $1 WHERE id = $2")
            .bind(role.as_str())
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Account {} not found", account_id)));
        }
        Ok(())
    }

    async fn insert_doctor(
        &self,
        account_id: Uuid,
        application: &NewDoctorApplication,
    ) -> PortResult<DoctorApplication> {
        let record = sqlx::query_as::<_, DoctorRecord>(&format!(
            "INSERT INTO doctors \
             (id, user_id, first_name, last_name, specialization, experience, fee, phone, address, timings) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            DOCTOR_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(&application.first_name)
        .bind(&application.last_name)
        .bind(&application.specialization)
        .bind(application.experience)
        .bind(application.fee)
        .bind(&application.phone)
        .bind(&application.address)
        .bind(&application.timings)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn get_doctor(&self, doctor_id: Uuid) -> PortResult<DoctorApplication> {
        let record = sqlx::query_as::<_, DoctorRecord>(&format!(
            "SELECT {} FROM doctors WHERE id = $1",
            DOCTOR_COLUMNS
        ))
        .bind(doctor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or("Doctor", doctor_id))?;
        record.to_domain()
    }

    async fn get_doctor_by_owner(&self, account_id: Uuid) -> PortResult<Option<DoctorApplication>> {
        let record = sqlx::query_as::<_, DoctorRecord>(&format!(
            "SELECT {} FROM doctors WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
            DOCTOR_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(|r| r.to_domain()).transpose()
    }

    async fn list_doctors_by_status(
        &self,
        status: DoctorStatus,
        limit: Option<i64>,
    ) -> PortResult<Vec<DoctorApplication>> {
        // A NULL limit means no limit in Postgres.
        let records = sqlx::query_as::<_, DoctorRecord>(&format!(
            "SELECT {} FROM doctors WHERE status = $1 ORDER BY created_at DESC LIMIT $2",
            DOCTOR_COLUMNS
        ))
        .bind(status.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn count_doctors_by_status(&self, status: DoctorStatus) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM doctors WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn update_doctor_status(&self, doctor_id: Uuid, status: DoctorStatus) -> PortResult<()> {
        let result =
            sqlx::query("UPDATE doctors SET status = $1 WHERE id = $2 AND status = 'pending'")
                .bind(status.as_str())
                .bind(doctor_id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(self.missed_transition("doctors", "Doctor", doctor_id).await);
        }
        Ok(())
    }

    async fn insert_appointment(&self, appointment: &NewAppointment) -> PortResult<Appointment> {
        let record = sqlx::query_as::<_, AppointmentRecord>(&format!(
            "INSERT INTO appointments (id, user_id, doctor_id, date, time) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            APPOINTMENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(appointment.account_id)
        .bind(appointment.doctor_id)
        .bind(appointment.date)
        .bind(&appointment.time)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unexpected(e) {
            PortError::Conflict(_) => PortError::Conflict(format!(
                "{} at {} is already booked",
                appointment.date, appointment.time
            )),
            other => other,
        })?;
        record.to_domain()
    }

    async fn get_appointment(&self, appointment_id: Uuid) -> PortResult<Appointment> {
        let record = sqlx::query_as::<_, AppointmentRecord>(&format!(
            "SELECT {} FROM appointments WHERE id = $1",
            APPOINTMENT_COLUMNS
        ))
        .bind(appointment_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or("Appointment", appointment_id))?;
        record.to_domain()
    }

    async fn list_appointments_for_slot(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> PortResult<Vec<Appointment>> {
        let records = sqlx::query_as::<_, AppointmentRecord>(&format!(
            "SELECT {} FROM appointments WHERE doctor_id = $1 AND date = $2 AND status = ANY($3)",
            APPOINTMENT_COLUMNS
        ))
        .bind(doctor_id)
        .bind(date)
        .bind(status_labels(statuses))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_appointments(
        &self,
        owner: AppointmentOwner,
    ) -> PortResult<Vec<AppointmentWithDoctor>> {
        let (filter, id) = match owner {
            AppointmentOwner::Patient(id) => ("a.user_id", id),
            AppointmentOwner::Doctor(id) => ("a.doctor_id", id),
        };
        let query = format!(
            "SELECT a.id, a.user_id, a.doctor_id, a.date, a.time, a.status, a.created_at, \
             d.id AS d_id, d.user_id AS d_user_id, d.first_name AS d_first_name, \
             d.last_name AS d_last_name, d.specialization AS d_specialization, \
             d.experience AS d_experience, d.fee AS d_fee, d.phone AS d_phone, \
             d.address AS d_address, d.status AS d_status, d.timings AS d_timings, \
             d.created_at AS d_created_at \
             FROM appointments a JOIN doctors d ON d.id = a.doctor_id \
             WHERE {} = $1 ORDER BY a.date ASC, a.created_at ASC",
            filter
        );
        let records = sqlx::query_as::<_, AppointmentWithDoctorRecord>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn count_appointments(&self) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments")
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn update_appointment_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> PortResult<()> {
        let result =
            sqlx::query("UPDATE appointments SET status = $1 WHERE id = $2 AND status = 'pending'")
                .bind(status.as_str())
                .bind(appointment_id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(self
                .missed_transition("appointments", "Appointment", appointment_id)
                .await);
        }
        Ok(())
    }

    async fn insert_notifications(
        &self,
        notifications: &[NewNotification],
    ) -> PortResult<Vec<Notification>> {
        if notifications.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = notifications.iter().map(|_| Uuid::new_v4()).collect();
        let recipients: Vec<Uuid> = notifications.iter().map(|n| n.recipient_id).collect();
        let messages: Vec<String> = notifications.iter().map(|n| n.message.clone()).collect();

        let records = sqlx::query_as::<_, NotificationRecord>(&format!(
            "INSERT INTO notifications (id, user_id, message) \
             SELECT * FROM UNNEST($1::uuid[], $2::uuid[], $3::text[]) RETURNING {}",
            NOTIFICATION_COLUMNS
        ))
        .bind(ids)
        .bind(recipients)
        .bind(messages)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_notification(&self, notification_id: Uuid) -> PortResult<Notification> {
        let record = sqlx::query_as::<_, NotificationRecord>(&format!(
            "SELECT {} FROM notifications WHERE id = $1",
            NOTIFICATION_COLUMNS
        ))
        .bind(notification_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or("Notification", notification_id))?;
        Ok(record.to_domain())
    }

    async fn list_notifications(&self, account_id: Uuid) -> PortResult<Vec<Notification>> {
        let records = sqlx::query_as::<_, NotificationRecord>(&format!(
            "SELECT {} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn mark_notification_seen(&self, notification_id: Uuid) -> PortResult<bool> {
        let result = sqlx::query("UPDATE notifications SET seen = true WHERE id = $1 AND NOT seen")
            .bind(notification_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }

    async fn notification_inserts(&self, account_id: Uuid) -> PortResult<NotificationStream> {
        let mut receiver = self.inserts.subscribe();
        let stream = async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(notification) if notification.recipient_id == account_id => {
                        yield notification;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Live feed for {} dropped {} notification(s)", account_id, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };
        Ok(Box::pin(stream))
    }
}

//=========================================================================================
// `IdentityProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityProvider for DbAdapter {
    async fn create_account_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<Account> {
        let record = sqlx::query_as::<_, AccountRecord>(&format!(
            "INSERT INTO profiles (id, email, hashed_password) VALUES ($1, $2, $3) RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<AccountCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, hashed_password FROM profiles WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or("Account", email))?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(account_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_payload_decodes_into_a_notification() {
        let payload = r#"{
            "id": "6f1c2a52-8d7e-4c43-9a57-1f0b6de0c001",
            "user_id": "0b6a1e0e-3c4f-4f5e-8a1d-2c9f7b1d0002",
            "message": "Your appointment for 2025-06-01 at 10:00 AM has been approved",
            "seen": false,
            "created_at": "2025-05-30T12:34:56.789012+00:00"
        }"#;

        let notification = serde_json::from_str::<NotificationPayload>(payload)
            .unwrap()
            .to_domain();

        assert_eq!(
            notification.recipient_id,
            Uuid::parse_str("0b6a1e0e-3c4f-4f5e-8a1d-2c9f7b1d0002").unwrap()
        );
        assert!(!notification.seen);
        assert!(notification.message.contains("10:00 AM"));
    }

    #[test]
    fn corrupt_labels_are_unexpected_errors() {
        assert!(matches!(parse_label::<Role>("superuser"), Err(PortError::Unexpected(_))));
        assert_eq!(parse_label::<DoctorStatus>("approved").unwrap(), DoctorStatus::Approved);
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = not_found_or("Doctor", "abc")(sqlx::Error::RowNotFound);
        assert!(matches!(err, PortError::NotFound(msg) if msg == "Doctor abc not found"));
    }
}
