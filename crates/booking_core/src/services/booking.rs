//! crates/booking_core/src/services/booking.rs
//!
//! Slot availability, booking, and the doctor's approve/reject step.
//!
//! Availability and booking are separate calls with no lock in between; two
//! patients can both see a slot as free. The store is expected to reject the
//! second insert (see the partial unique index in the api migrations).

use crate::domain::{
    Account, Appointment, AppointmentDecision, AppointmentStatus, AppointmentWithDoctor,
    DoctorStatus, NewAppointment, NewNotification, Role,
};
use crate::error::{WorkflowError, WorkflowResult};
use crate::ports::{AppointmentOwner, DataGateway};
use crate::services::notify_best_effort;
use crate::validation::time_of_day;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const CLAIMING_STATUSES: [AppointmentStatus; 2] =
    [AppointmentStatus::Pending, AppointmentStatus::Approved];

#[derive(Clone)]
pub struct BookingWorkflow {
    gateway: Arc<dyn DataGateway>,
}

impl BookingWorkflow {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self { gateway }
    }

    /// The doctor's configured timings, in order, minus those already held by a
    /// pending or approved appointment on `date`.
    pub async fn list_available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> WorkflowResult<Vec<String>> {
        let doctor = self.gateway.get_doctor(doctor_id).await?;
        let claimed = self
            .gateway
            .list_appointments_for_slot(doctor_id, date, &CLAIMING_STATUSES)
            .await?;
        let taken: HashSet<&str> = claimed
            .iter()
            .filter(|a| a.status.claims_slot())
            .map(|a| a.time.as_str())
            .collect();

        Ok(doctor
            .timings
            .iter()
            .filter(|time| !taken.contains(time.as_str()))
            .cloned()
            .collect())
    }

    /// Requests an appointment and lets the doctor know.
    pub async fn book(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
        date: NaiveDate,
        time: &str,
    ) -> WorkflowResult<Appointment> {
        let time = time.trim();
        if time.is_empty() {
            return Err(WorkflowError::Validation("time is required".to_string()));
        }

        let doctor = self.gateway.get_doctor(doctor_id).await?;
        if doctor.status != DoctorStatus::Approved {
            return Err(WorkflowError::Validation(format!(
                "doctor {} is not accepting appointments",
                doctor_id
            )));
        }
        if !doctor.timings.iter().any(|t| t == time) {
            return Err(WorkflowError::Validation(format!(
                "'{}' is not one of the doctor's time slots",
                time
            )));
        }

        let appointment = self
            .gateway
            .insert_appointment(&NewAppointment {
                account_id: patient_id,
                doctor_id,
                date,
                time: time.to_string(),
            })
            .await?;
        info!(
            "Appointment {} requested by {} with doctor {} on {} at {}",
            appointment.id, patient_id, doctor_id, date, time
        );

        let notification = NewNotification::new(
            doctor.account_id,
            format!("New appointment request for {} at {}", date, time),
        );
        notify_best_effort(self.gateway.as_ref(), &[notification]).await;

        Ok(appointment)
    }

    /// Approves or rejects a pending appointment on behalf of `actor`.
    ///
    /// Admins may act on any appointment; doctors only on their own.
    pub async fn set_status(
        &self,
        actor: &Account,
        appointment_id: Uuid,
        decision: AppointmentDecision,
    ) -> WorkflowResult<Appointment> {
        let mut appointment = self.gateway.get_appointment(appointment_id).await?;

        match actor.role {
            Role::Admin => {}
            Role::Doctor => {
                let own = self.gateway.get_doctor_by_owner(actor.id).await?;
                if own.map(|d| d.id) != Some(appointment.doctor_id) {
                    return Err(WorkflowError::Forbidden(format!(
                        "appointment {} does not belong to this doctor",
                        appointment_id
                    )));
                }
            }
            Role::User => {
                return Err(WorkflowError::Forbidden(
                    "only doctors and admins can change an appointment's status".to_string(),
                ))
            }
        }

        if appointment.status != AppointmentStatus::Pending {
            return Err(WorkflowError::Validation(format!(
                "appointment {} is already {}",
                appointment_id, appointment.status
            )));
        }

        let status = AppointmentStatus::from(decision);
        self.gateway
            .update_appointment_status(appointment_id, status)
            .await?;
        appointment.status = status;
        info!("Appointment {} {} by {}", appointment_id, status, actor.id);

        let notification = NewNotification::new(
            appointment.account_id,
            format!(
                "Your appointment for {} at {} has been {}",
                appointment.date, appointment.time, status
            ),
        );
        notify_best_effort(self.gateway.as_ref(), &[notification]).await;

        Ok(appointment)
    }

    /// Appointments visible to `account`: a doctor sees those booked with their
    /// practice, everyone else sees the ones they booked. Ordered by date, then
    /// by the slot's clock time.
    pub async fn list_for_account(
        &self,
        account: &Account,
        status: Option<AppointmentStatus>,
    ) -> WorkflowResult<Vec<AppointmentWithDoctor>> {
        let owner = match account.role {
            Role::Doctor => match self.gateway.get_doctor_by_owner(account.id).await? {
                Some(doctor) => AppointmentOwner::Doctor(doctor.id),
                None => return Ok(Vec::new()),
            },
            Role::User | Role::Admin => AppointmentOwner::Patient(account.id),
        };
        let mut appointments: Vec<AppointmentWithDoctor> = self
            .gateway
            .list_appointments(owner)
            .await?
            .into_iter()
            .filter(|row| status.map_or(true, |s| row.appointment.status == s))
            .collect();
        // Labels compare as text ("02:00 PM" < "09:00 AM"), so order on the parsed time.
        appointments.sort_by_key(|row| {
            (
                row.appointment.date,
                time_of_day(&row.appointment.time),
                row.appointment.created_at,
            )
        });
        Ok(appointments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DoctorApplication;
    use crate::ports::PortError;
    use crate::testing::{Fault, InMemoryGateway};

    struct Fixture {
        gateway: Arc<InMemoryGateway>,
        workflow: BookingWorkflow,
        patient: Account,
        doctor_account: Account,
        doctor: DoctorApplication,
    }

    fn june_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn fixture() -> Fixture {
        let gateway = Arc::new(InMemoryGateway::new());
        let patient = gateway.seed_account("p1@example.com", Role::User);
        let doctor_account = gateway.seed_account("d1@example.com", Role::Doctor);
        let doctor = gateway.seed_doctor(
            doctor_account.id,
            "Ann",
            "Lee",
            "Neurology",
            DoctorStatus::Approved,
            &["09:00 AM", "10:00 AM", "11:00 AM"],
        );
        let workflow = BookingWorkflow::new(gateway.clone());
        Fixture {
            gateway,
            workflow,
            patient,
            doctor_account,
            doctor,
        }
    }

    #[tokio::test]
    async fn claimed_slots_are_hidden_and_rejected_ones_freed() {
        let f = fixture();
        let other = june_first().succ_opt().unwrap();
        f.gateway.seed_appointment(f.patient.id, f.doctor.id, june_first(), "09:00 AM", AppointmentStatus::Pending);
        f.gateway.seed_appointment(f.patient.id, f.doctor.id, june_first(), "10:00 AM", AppointmentStatus::Rejected);
        f.gateway.seed_appointment(f.patient.id, f.doctor.id, june_first(), "11:00 AM", AppointmentStatus::Approved);
        f.gateway.seed_appointment(f.patient.id, f.doctor.id, other, "10:00 AM", AppointmentStatus::Approved);

        let slots = f.workflow.list_available_slots(f.doctor.id, june_first()).await.unwrap();
        assert_eq!(slots, vec!["10:00 AM"]);

        let slots = f.workflow.list_available_slots(f.doctor.id, other).await.unwrap();
        assert_eq!(slots, vec!["09:00 AM", "11:00 AM"]);
    }

    #[tokio::test]
    async fn booking_creates_a_pending_request_and_tells_the_doctor() {
        let f = fixture();

        let appointment = f
            .workflow
            .book(f.patient.id, f.doctor.id, june_first(), "10:00 AM")
            .await
            .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(f.gateway.appointments().len(), 1);
        let received = f.gateway.notifications_for(f.doctor_account.id);
        assert_eq!(received.len(), 1);
        assert!(received[0].message.contains("2025-06-01"));
        assert!(received[0].message.contains("10:00 AM"));
        assert!(f.gateway.notifications_for(f.patient.id).is_empty());
    }

    #[tokio::test]
    async fn booking_validates_before_writing() {
        let f = fixture();

        let blank = f.workflow.book(f.patient.id, f.doctor.id, june_first(), "  ").await;
        assert!(matches!(blank, Err(WorkflowError::Validation(_))));

        let off_schedule = f.workflow.book(f.patient.id, f.doctor.id, june_first(), "03:00 PM").await;
        assert!(matches!(off_schedule, Err(WorkflowError::Validation(_))));

        let pending = f.gateway.seed_doctor(
            f.doctor_account.id,
            "Eve",
            "Stone",
            "Oncology",
            DoctorStatus::Pending,
            &["09:00 AM"],
        );
        let unapproved = f.workflow.book(f.patient.id, pending.id, june_first(), "09:00 AM").await;
        assert!(matches!(unapproved, Err(WorkflowError::Validation(_))));

        assert!(f.gateway.appointments().is_empty());
        assert!(f.gateway.notifications().is_empty());
    }

    #[tokio::test]
    async fn failed_insert_sends_nothing() {
        let f = fixture();
        f.gateway.fail(Fault::AppointmentInsert);

        let err = f
            .workflow
            .book(f.patient.id, f.doctor.id, june_first(), "10:00 AM")
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Gateway(_)));
        assert!(f.gateway.notifications().is_empty());
    }

    #[tokio::test]
    async fn a_live_slot_cannot_be_booked_twice() {
        let f = fixture();
        let rival = f.gateway.seed_account("p2@example.com", Role::User);
        f.workflow
            .book(f.patient.id, f.doctor.id, june_first(), "10:00 AM")
            .await
            .unwrap();

        let err = f
            .workflow
            .book(rival.id, f.doctor.id, june_first(), "10:00 AM")
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Gateway(PortError::Conflict(_))));
        assert_eq!(f.gateway.appointments().len(), 1);
        assert_eq!(f.gateway.notifications_for(f.doctor_account.id).len(), 1);
    }

    #[tokio::test]
    async fn doctor_approval_notifies_the_patient_with_date_and_time() {
        let f = fixture();
        let appt = f.gateway.seed_appointment(
            f.patient.id,
            f.doctor.id,
            june_first(),
            "10:00 AM",
            AppointmentStatus::Pending,
        );

        let updated = f
            .workflow
            .set_status(&f.doctor_account, appt.id, AppointmentDecision::Approved)
            .await
            .unwrap();

        assert_eq!(updated.status, AppointmentStatus::Approved);
        assert_eq!(f.gateway.appointments()[0].status, AppointmentStatus::Approved);
        let received = f.gateway.notifications_for(f.patient.id);
        assert_eq!(received.len(), 1);
        assert!(received[0].message.contains("2025-06-01"));
        assert!(received[0].message.contains("10:00 AM"));
        assert!(received[0].message.contains("approved"));
    }

    #[tokio::test]
    async fn only_the_owning_doctor_or_an_admin_may_decide() {
        let f = fixture();
        let appt = f.gateway.seed_appointment(
            f.patient.id,
            f.doctor.id,
            june_first(),
            "10:00 AM",
            AppointmentStatus::Pending,
        );
        let stranger = f.gateway.seed_account("d2@example.com", Role::Doctor);
        f.gateway.seed_doctor(stranger.id, "Raj", "Patel", "Cardiology", DoctorStatus::Approved, &[]);
        let admin = f.gateway.seed_account("admin@example.com", Role::Admin);

        let as_patient = f.workflow.set_status(&f.patient, appt.id, AppointmentDecision::Approved).await;
        assert!(matches!(as_patient, Err(WorkflowError::Forbidden(_))));
        let as_stranger = f.workflow.set_status(&stranger, appt.id, AppointmentDecision::Approved).await;
        assert!(matches!(as_stranger, Err(WorkflowError::Forbidden(_))));
        assert_eq!(f.gateway.appointments()[0].status, AppointmentStatus::Pending);

        let as_admin = f.workflow.set_status(&admin, appt.id, AppointmentDecision::Rejected).await;
        assert_eq!(as_admin.unwrap().status, AppointmentStatus::Rejected);
    }

    #[tokio::test]
    async fn decided_appointments_stay_decided() {
        let f = fixture();
        let appt = f.gateway.seed_appointment(
            f.patient.id,
            f.doctor.id,
            june_first(),
            "10:00 AM",
            AppointmentStatus::Rejected,
        );

        let err = f
            .workflow
            .set_status(&f.doctor_account, appt.id, AppointmentDecision::Approved)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Validation(_)));
        assert!(f.gateway.notifications().is_empty());
    }

    #[tokio::test]
    async fn racing_decisions_on_an_appointment_apply_once() {
        let f = fixture();
        let appt = f.gateway.seed_appointment(
            f.patient.id,
            f.doctor.id,
            june_first(),
            "10:00 AM",
            AppointmentStatus::Pending,
        );
        let admin = f.gateway.seed_account("admin@example.com", Role::Admin);
        f.gateway.hold_reads(2);

        let (approve, reject) = tokio::join!(
            f.workflow.set_status(&admin, appt.id, AppointmentDecision::Approved),
            f.workflow.set_status(&admin, appt.id, AppointmentDecision::Rejected),
        );

        assert_eq!(approve.is_ok() as u8 + reject.is_ok() as u8, 1);
        let (winner, loser) = if approve.is_ok() { (approve, reject) } else { (reject, approve) };
        assert!(matches!(loser, Err(WorkflowError::Gateway(PortError::Conflict(_)))));
        assert_eq!(f.gateway.appointments()[0].status, winner.unwrap().status);
        assert_eq!(f.gateway.notifications_for(f.patient.id).len(), 1);
    }

    #[tokio::test]
    async fn status_write_failure_surfaces_without_notifying() {
        let f = fixture();
        let appt = f.gateway.seed_appointment(
            f.patient.id,
            f.doctor.id,
            june_first(),
            "10:00 AM",
            AppointmentStatus::Pending,
        );
        f.gateway.fail(Fault::AppointmentStatusUpdate);

        let err = f
            .workflow
            .set_status(&f.doctor_account, appt.id, AppointmentDecision::Approved)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Gateway(PortError::Unexpected(_))));
        assert!(f.gateway.notifications().is_empty());
    }

    #[tokio::test]
    async fn listings_follow_the_clock_within_a_day() {
        let f = fixture();
        f.gateway.seed_appointment(f.patient.id, f.doctor.id, june_first(), "02:00 PM", AppointmentStatus::Pending);
        f.gateway.seed_appointment(f.patient.id, f.doctor.id, june_first(), "09:00 AM", AppointmentStatus::Pending);
        f.gateway.seed_appointment(f.patient.id, f.doctor.id, june_first(), "12:30 PM", AppointmentStatus::Pending);

        let mine = f.workflow.list_for_account(&f.patient, None).await.unwrap();
        let times: Vec<&str> = mine.iter().map(|row| row.appointment.time.as_str()).collect();
        assert_eq!(times, vec!["09:00 AM", "12:30 PM", "02:00 PM"]);
    }

    #[tokio::test]
    async fn listings_depend_on_who_is_asking() {
        let f = fixture();
        let second_patient = f.gateway.seed_account("p2@example.com", Role::User);
        let later = june_first().succ_opt().unwrap();
        f.gateway.seed_appointment(f.patient.id, f.doctor.id, later, "09:00 AM", AppointmentStatus::Pending);
        f.gateway.seed_appointment(f.patient.id, f.doctor.id, june_first(), "10:00 AM", AppointmentStatus::Approved);
        f.gateway.seed_appointment(second_patient.id, f.doctor.id, june_first(), "11:00 AM", AppointmentStatus::Pending);

        let mine = f.workflow.list_for_account(&f.patient, None).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].appointment.date, june_first());
        assert_eq!(mine[0].doctor.id, f.doctor.id);

        let practice = f.workflow.list_for_account(&f.doctor_account, None).await.unwrap();
        assert_eq!(practice.len(), 3);

        let pending = f
            .workflow
            .list_for_account(&f.doctor_account, Some(AppointmentStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);

        let doctor_without_practice = f.gateway.seed_account("d3@example.com", Role::Doctor);
        assert!(f
            .workflow
            .list_for_account(&doctor_without_practice, None)
            .await
            .unwrap()
            .is_empty());
    }
}
