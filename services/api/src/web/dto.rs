//! services/api/src/web/dto.rs
//!
//! JSON payloads for the REST and WebSocket surfaces, and their conversions
//! from the core domain types.

use booking_core::{
    Account, AdminStats, Appointment, AppointmentWithDoctor, DoctorApplication,
    NewDoctorApplication, Notification,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Responses
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    /// One of `user`, `doctor`, `admin`.
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            role: account.role.to_string(),
            created_at: account.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct DoctorResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub experience: i32,
    pub fee: i32,
    pub phone: String,
    pub address: String,
    /// One of `pending`, `approved`, `blocked`.
    pub status: String,
    pub timings: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DoctorApplication> for DoctorResponse {
    fn from(doctor: DoctorApplication) -> Self {
        Self {
            id: doctor.id,
            account_id: doctor.account_id,
            first_name: doctor.first_name,
            last_name: doctor.last_name,
            specialization: doctor.specialization,
            experience: doctor.experience,
            fee: doctor.fee,
            phone: doctor.phone,
            address: doctor.address,
            status: doctor.status.to_string(),
            timings: doctor.timings,
            created_at: doctor.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct AppointmentResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    /// One of `pending`, `approved`, `rejected`.
    pub status: String,
    pub created_at: DateTime<Utc>,
    /// Present on listings, which join the doctor in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorResponse>,
}

impl From<Appointment> for AppointmentResponse {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id,
            account_id: appointment.account_id,
            doctor_id: appointment.doctor_id,
            date: appointment.date,
            time: appointment.time,
            status: appointment.status.to_string(),
            created_at: appointment.created_at,
            doctor: None,
        }
    }
}

impl From<AppointmentWithDoctor> for AppointmentResponse {
    fn from(joined: AppointmentWithDoctor) -> Self {
        Self {
            doctor: Some(joined.doctor.into()),
            ..joined.appointment.into()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub message: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationResponse {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            message: notification.message.clone(),
            seen: notification.seen,
            created_at: notification.created_at,
        }
    }
}

/// An account's notifications split the way the inbox shows them.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct InboxResponse {
    pub unseen: Vec<NotificationResponse>,
    pub seen: Vec<NotificationResponse>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct MarkSeenResponse {
    /// False when the notification had already been seen.
    pub updated: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct SlotsResponse {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub available: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct AdminStatsResponse {
    pub total_doctors: i64,
    pub pending_applications: i64,
    pub total_appointments: i64,
    pub recent_applications: Vec<DoctorResponse>,
}

impl From<AdminStats> for AdminStatsResponse {
    fn from(stats: AdminStats) -> Self {
        Self {
            total_doctors: stats.total_doctors,
            pending_applications: stats.pending_applications,
            total_appointments: stats.total_appointments,
            recent_applications: stats
                .recent_applications
                .into_iter()
                .map(DoctorResponse::from)
                .collect(),
        }
    }
}

//=========================================================================================
// Requests
//=========================================================================================

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct DoctorApplicationRequest {
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub experience: i32,
    pub fee: i32,
    pub phone: String,
    pub address: String,
    /// Offered times, each formatted `hh:mm AM|PM`.
    pub timings: Vec<String>,
}

impl From<DoctorApplicationRequest> for NewDoctorApplication {
    fn from(req: DoctorApplicationRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            specialization: req.specialization,
            experience: req.experience,
            fee: req.fee,
            phone: req.phone,
            address: req.address,
            timings: req.timings,
        }
    }
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct DecisionRequest {
    /// `approved` or `blocked` for applications, `approved` or `rejected` for appointments.
    pub decision: String,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct RoleRequest {
    pub role: String,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
}

//=========================================================================================
// Query Parameters
//=========================================================================================

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DoctorSearchParams {
    /// Case-insensitive match on name or specialization.
    pub search: Option<String>,
    pub specialization: Option<String>,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlotParams {
    /// Day to check, `YYYY-MM-DD`.
    pub date: NaiveDate,
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppointmentFilter {
    pub status: Option<String>,
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLimit {
    pub limit: Option<i64>,
}
