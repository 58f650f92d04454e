//! crates/booking_core/src/testing.rs
//!
//! An in-memory implementation of the ports with fault injection, used by the
//! unit tests here and the api crate's integration tests.

use crate::domain::{
    Account, AccountCredentials, Appointment, AppointmentStatus, AppointmentWithDoctor,
    DoctorApplication, DoctorStatus, NewAppointment, NewDoctorApplication, NewNotification,
    Notification, Role,
};
use crate::ports::{
    AppointmentOwner, DataGateway, IdentityProvider, NotificationStream, PortError, PortResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures::channel::mpsc::{unbounded, UnboundedSender};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Barrier;
use uuid::Uuid;

/// A gateway call that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Role updates to this specific role fail.
    RoleUpdateTo(Role),
    DoctorStatusUpdate,
    AppointmentStatusUpdate,
    AppointmentInsert,
    NotificationInsert,
    AccountListing,
    SessionLookup,
}

/// Holds the next `remaining` doctor/appointment reads at a barrier so
/// concurrent workflows all read before any of them writes.
struct ReadGate {
    barrier: Arc<Barrier>,
    remaining: usize,
}

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    password_hashes: HashMap<Uuid, String>,
    doctors: Vec<DoctorApplication>,
    appointments: Vec<Appointment>,
    notifications: Vec<Notification>,
    auth_sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    subscribers: Vec<(Uuid, UnboundedSender<Notification>)>,
    clock: i64,
}

impl Tables {
    /// Strictly increasing timestamps so "newest first" is deterministic.
    fn now(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000) + Duration::milliseconds(self.clock)
    }
}

#[derive(Default)]
pub struct InMemoryGateway {
    tables: Mutex<Tables>,
    faults: Mutex<Vec<Fault>>,
    read_gate: Mutex<Option<ReadGate>>,
    seen_writes: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self, fault: Fault) -> PortResult<()> {
        let faults = self.faults.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if faults.contains(&fault) {
            return Err(PortError::Unexpected(format!("injected fault: {:?}", fault)));
        }
        Ok(())
    }

    pub fn fail(&self, fault: Fault) {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(fault);
    }

    pub fn heal(&self, fault: Fault) {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|f| *f != fault);
    }

    /// Makes the next `parties` calls to `get_doctor` / `get_appointment`
    /// wait for each other before returning.
    pub fn hold_reads(&self, parties: usize) {
        *self.read_gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(ReadGate {
            barrier: Arc::new(Barrier::new(parties)),
            remaining: parties,
        });
    }

    async fn pass_read_gate(&self) {
        let barrier = {
            let mut gate = self.read_gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            match gate.as_mut() {
                Some(held) => {
                    held.remaining -= 1;
                    let barrier = held.barrier.clone();
                    if held.remaining == 0 {
                        *gate = None;
                    }
                    Some(barrier)
                }
                None => None,
            }
        };
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }
    }

    // --- Seeding ---

    pub fn seed_account(&self, email: &str, role: Role) -> Account {
        let mut tables = self.tables();
        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            role,
            created_at: tables.now(),
        };
        tables.accounts.push(account.clone());
        account
    }

    pub fn seed_doctor(
        &self,
        account_id: Uuid,
        first_name: &str,
        last_name: &str,
        specialization: &str,
        status: DoctorStatus,
        timings: &[&str],
    ) -> DoctorApplication {
        let mut tables = self.tables();
        let doctor = DoctorApplication {
            id: Uuid::new_v4(),
            account_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            specialization: specialization.to_string(),
            experience: 5,
            fee: 100,
            phone: "555-0100".to_string(),
            address: "1 Main St".to_string(),
            status,
            timings: timings.iter().map(|t| t.to_string()).collect(),
            created_at: tables.now(),
        };
        tables.doctors.push(doctor.clone());
        doctor
    }

    pub fn seed_appointment(
        &self,
        account_id: Uuid,
        doctor_id: Uuid,
        date: NaiveDate,
        time: &str,
        status: AppointmentStatus,
    ) -> Appointment {
        let mut tables = self.tables();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            account_id,
            doctor_id,
            date,
            time: time.to_string(),
            status,
            created_at: tables.now(),
        };
        tables.appointments.push(appointment.clone());
        appointment
    }

    // --- Inspection ---

    pub fn account(&self, account_id: Uuid) -> Option<Account> {
        self.tables().accounts.iter().find(|a| a.id == account_id).cloned()
    }

    pub fn doctor(&self, doctor_id: Uuid) -> Option<DoctorApplication> {
        self.tables().doctors.iter().find(|d| d.id == doctor_id).cloned()
    }

    pub fn doctors(&self) -> Vec<DoctorApplication> {
        self.tables().doctors.clone()
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.tables().appointments.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.tables().notifications.clone()
    }

    pub fn notifications_for(&self, account_id: Uuid) -> Vec<Notification> {
        self.tables()
            .notifications
            .iter()
            .filter(|n| n.recipient_id == account_id)
            .cloned()
            .collect()
    }

    /// Number of writes `mark_notification_seen` actually performed.
    pub fn seen_writes(&self) -> usize {
        self.seen_writes.load(Ordering::SeqCst)
    }

    /// Live feed subscribers whose receiving end is still open.
    pub fn live_subscribers(&self) -> usize {
        self.tables()
            .subscribers
            .iter()
            .filter(|(_, tx)| !tx.is_closed())
            .count()
    }
}

fn not_found(what: &str, id: impl std::fmt::Display) -> PortError {
    PortError::NotFound(format!("{} {} not found", what, id))
}

#[async_trait]
impl DataGateway for InMemoryGateway {
    async fn get_account(&self, account_id: Uuid) -> PortResult<Account> {
        self.account(account_id)
            .ok_or_else(|| not_found("Account", account_id))
    }

    async fn list_accounts_by_role(&self, role: Role) -> PortResult<Vec<Account>> {
        self.check(Fault::AccountListing)?;
        Ok(self
            .tables()
            .accounts
            .iter()
            .filter(|a| a.role == role)
            .cloned()
            .collect())
    }

    async fn update_account_role(&self, account_id: Uuid, role: Role) -> PortResult<()> {
        self.check(Fault::RoleUpdateTo(role))?;
        let mut tables = self.tables();
        let account = tables
            .accounts
            .iter_mut()
            .find(|a| a.id == account_id)
            .ok_or_else(|| not_found("Account", account_id))?;
        account.role = role;
        Ok(())
    }

    async fn insert_doctor(
        &self,
        account_id: Uuid,
        application: &NewDoctorApplication,
    ) -> PortResult<DoctorApplication> {
        let mut tables = self.tables();
        let doctor = DoctorApplication {
            id: Uuid::new_v4(),
            account_id,
            first_name: application.first_name.clone(),
            last_name: application.last_name.clone(),
            specialization: application.specialization.clone(),
            experience: application.experience,
            fee: application.fee,
            phone: application.phone.clone(),
            address: application.address.clone(),
            status: DoctorStatus::Pending,
            timings: application.timings.clone(),
            created_at: tables.now(),
        };
        tables.doctors.push(doctor.clone());
        Ok(doctor)
    }

    async fn get_doctor(&self, doctor_id: Uuid) -> PortResult<DoctorApplication> {
        let doctor = self
            .doctor(doctor_id)
            .ok_or_else(|| not_found("Doctor", doctor_id))?;
        self.pass_read_gate().await;
        Ok(doctor)
    }

    async fn get_doctor_by_owner(&self, account_id: Uuid) -> PortResult<Option<DoctorApplication>> {
        Ok(self
            .tables()
            .doctors
            .iter()
            .rev()
            .find(|d| d.account_id == account_id)
            .cloned())
    }

    async fn list_doctors_by_status(
        &self,
        status: DoctorStatus,
        limit: Option<i64>,
    ) -> PortResult<Vec<DoctorApplication>> {
        let mut doctors: Vec<DoctorApplication> = self
            .tables()
            .doctors
            .iter()
            .filter(|d| d.status == status)
            .cloned()
            .collect();
        doctors.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            doctors.truncate(limit.max(0) as usize);
        }
        Ok(doctors)
    }

    async fn count_doctors_by_status(&self, status: DoctorStatus) -> PortResult<i64> {
        Ok(self
            .tables()
            .doctors
            .iter()
            .filter(|d| d.status == status)
            .count() as i64)
    }

    async fn update_doctor_status(&self, doctor_id: Uuid, status: DoctorStatus) -> PortResult<()> {
        self.check(Fault::DoctorStatusUpdate)?;
        let mut tables = self.tables();
        let doctor = tables
            .doctors
            .iter_mut()
            .find(|d| d.id == doctor_id)
            .ok_or_else(|| not_found("Doctor", doctor_id))?;
        if doctor.status != DoctorStatus::Pending {
            return Err(PortError::Conflict(format!(
                "Doctor {} is no longer pending",
                doctor_id
            )));
        }
        doctor.status = status;
        Ok(())
    }

    async fn insert_appointment(&self, appointment: &NewAppointment) -> PortResult<Appointment> {
        self.check(Fault::AppointmentInsert)?;
        let mut tables = self.tables();
        // Mirrors the partial unique index on live slots.
        let taken = tables.appointments.iter().any(|a| {
            a.doctor_id == appointment.doctor_id
                && a.date == appointment.date
                && a.time == appointment.time
                && a.status.claims_slot()
        });
        if taken {
            return Err(PortError::Conflict(format!(
                "{} at {} is already booked",
                appointment.date, appointment.time
            )));
        }
        let row = Appointment {
            id: Uuid::new_v4(),
            account_id: appointment.account_id,
            doctor_id: appointment.doctor_id,
            date: appointment.date,
            time: appointment.time.clone(),
            status: AppointmentStatus::Pending,
            created_at: tables.now(),
        };
        tables.appointments.push(row.clone());
        Ok(row)
    }

    async fn get_appointment(&self, appointment_id: Uuid) -> PortResult<Appointment> {
        let appointment = self
            .tables()
            .appointments
            .iter()
            .find(|a| a.id == appointment_id)
            .cloned()
            .ok_or_else(|| not_found("Appointment", appointment_id))?;
        self.pass_read_gate().await;
        Ok(appointment)
    }

    async fn list_appointments_for_slot(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> PortResult<Vec<Appointment>> {
        Ok(self
            .tables()
            .appointments
            .iter()
            .filter(|a| a.doctor_id == doctor_id && a.date == date && statuses.contains(&a.status))
            .cloned()
            .collect())
    }

    async fn list_appointments(
        &self,
        owner: AppointmentOwner,
    ) -> PortResult<Vec<AppointmentWithDoctor>> {
        let tables = self.tables();
        let mut rows: Vec<AppointmentWithDoctor> = tables
            .appointments
            .iter()
            .filter(|a| match owner {
                AppointmentOwner::Patient(id) => a.account_id == id,
                AppointmentOwner::Doctor(id) => a.doctor_id == id,
            })
            .filter_map(|a| {
                tables
                    .doctors
                    .iter()
                    .find(|d| d.id == a.doctor_id)
                    .map(|d| AppointmentWithDoctor {
                        appointment: a.clone(),
                        doctor: d.clone(),
                    })
            })
            .collect();
        rows.sort_by(|a, b| {
            (a.appointment.date, a.appointment.created_at)
                .cmp(&(b.appointment.date, b.appointment.created_at))
        });
        Ok(rows)
    }

    async fn count_appointments(&self) -> PortResult<i64> {
        Ok(self.tables().appointments.len() as i64)
    }

    async fn update_appointment_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> PortResult<()> {
        self.check(Fault::AppointmentStatusUpdate)?;
        let mut tables = self.tables();
        let appointment = tables
            .appointments
            .iter_mut()
            .find(|a| a.id == appointment_id)
            .ok_or_else(|| not_found("Appointment", appointment_id))?;
        if appointment.status != AppointmentStatus::Pending {
            return Err(PortError::Conflict(format!(
                "Appointment {} is no longer pending",
                appointment_id
            )));
        }
        appointment.status = status;
        Ok(())
    }

    async fn insert_notifications(
        &self,
        notifications: &[NewNotification],
    ) -> PortResult<Vec<Notification>> {
        self.check(Fault::NotificationInsert)?;
        let mut tables = self.tables();
        let mut inserted = Vec::with_capacity(notifications.len());
        for new in notifications {
            let row = Notification {
                id: Uuid::new_v4(),
                recipient_id: new.recipient_id,
                message: new.message.clone(),
                seen: false,
                created_at: tables.now(),
            };
            tables.notifications.push(row.clone());
            inserted.push(row);
        }
        tables.subscribers.retain(|(_, tx)| !tx.is_closed());
        for row in &inserted {
            for (account_id, tx) in &tables.subscribers {
                if *account_id == row.recipient_id {
                    let _ = tx.unbounded_send(row.clone());
                }
            }
        }
        Ok(inserted)
    }

    async fn get_notification(&self, notification_id: Uuid) -> PortResult<Notification> {
        self.tables()
            .notifications
            .iter()
            .find(|n| n.id == notification_id)
            .cloned()
            .ok_or_else(|| not_found("Notification", notification_id))
    }

    async fn list_notifications(&self, account_id: Uuid) -> PortResult<Vec<Notification>> {
        let mut rows = self.notifications_for(account_id);
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn mark_notification_seen(&self, notification_id: Uuid) -> PortResult<bool> {
        let mut tables = self.tables();
        let row = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| not_found("Notification", notification_id))?;
        if row.seen {
            return Ok(false);
        }
        row.seen = true;
        self.seen_writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn notification_inserts(&self, account_id: Uuid) -> PortResult<NotificationStream> {
        let (tx, rx) = unbounded();
        self.tables().subscribers.push((account_id, tx));
        Ok(Box::pin(rx))
    }
}

#[async_trait]
impl IdentityProvider for InMemoryGateway {
    async fn create_account_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<Account> {
        let mut tables = self.tables();
        if tables.accounts.iter().any(|a| a.email == email) {
            return Err(PortError::Conflict(format!("Email {} already registered", email)));
        }
        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            role: Role::User,
            created_at: tables.now(),
        };
        tables.accounts.push(account.clone());
        tables
            .password_hashes
            .insert(account.id, hashed_password.to_string());
        Ok(account)
    }

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<AccountCredentials> {
        let tables = self.tables();
        let account = tables
            .accounts
            .iter()
            .find(|a| a.email == email)
            .ok_or_else(|| not_found("Account", email))?;
        let hashed_password = tables
            .password_hashes
            .get(&account.id)
            .cloned()
            .ok_or(PortError::Unauthorized)?;
        Ok(AccountCredentials {
            account_id: account.id,
            email: account.email.clone(),
            hashed_password,
        })
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.tables()
            .auth_sessions
            .insert(session_id.to_string(), (account_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        self.check(Fault::SessionLookup)?;
        match self.tables().auth_sessions.get(session_id) {
            Some((account_id, expires_at)) if *expires_at > Utc::now() => Ok(*account_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.tables().auth_sessions.remove(session_id);
        Ok(())
    }
}
