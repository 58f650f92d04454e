//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::workflow_error;
use crate::web::{auth, dto::*, state::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use booking_core::{
    Account, ApplicationDecision, AppointmentDecision, AppointmentStatus, DoctorQuery,
    ParseLabelError, Role, SessionContext,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        me_handler,
        list_doctors_handler,
        list_specializations_handler,
        get_doctor_handler,
        list_slots_handler,
        submit_application_handler,
        list_applications_handler,
        decide_application_handler,
        admin_stats_handler,
        assign_role_handler,
        book_appointment_handler,
        list_appointments_handler,
        set_appointment_status_handler,
        list_notifications_handler,
        mark_seen_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            AccountResponse,
            DoctorResponse,
            AppointmentResponse,
            NotificationResponse,
            InboxResponse,
            MarkSeenResponse,
            SlotsResponse,
            AdminStatsResponse,
            DoctorApplicationRequest,
            DecisionRequest,
            RoleRequest,
            BookAppointmentRequest,
        )
    ),
    tags(
        (name = "Doctor Booking API", description = "Doctor applications, appointment booking and notifications.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Helpers
//=========================================================================================

type HandlerError = (StatusCode, String);

/// The signed-in account's profile. A session without one may not act.
fn current_account(session: &SessionContext) -> Result<&Account, HandlerError> {
    session
        .account()
        .ok_or((StatusCode::FORBIDDEN, "No profile for this session".to_string()))
}

fn parse_label<T>(value: &str) -> Result<T, HandlerError>
where
    T: FromStr<Err = ParseLabelError>,
{
    value
        .parse()
        .map_err(|e: ParseLabelError| (StatusCode::BAD_REQUEST, e.to_string()))
}

//=========================================================================================
// Account
//=========================================================================================

/// The signed-in account's profile.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Current account", body = AccountResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Session has no profile")
    )
)]
pub async fn me_handler(
    Extension(session): Extension<SessionContext>,
) -> Result<Json<AccountResponse>, HandlerError> {
    let account = current_account(&session)?;
    Ok(Json(account.clone().into()))
}

//=========================================================================================
// Doctor Directory
//=========================================================================================

/// Approved doctors matching the optional filters.
#[utoipa::path(
    get,
    path = "/doctors",
    params(DoctorSearchParams),
    responses(
        (status = 200, description = "Matching doctors", body = [DoctorResponse]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_doctors_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DoctorSearchParams>,
) -> Result<Json<Vec<DoctorResponse>>, HandlerError> {
    let query = DoctorQuery {
        search: params.search,
        specialization: params.specialization,
    };
    let doctors = state
        .directory
        .search(&query)
        .await
        .map_err(|e| workflow_error("Failed to list doctors", e))?;
    Ok(Json(doctors.into_iter().map(DoctorResponse::from).collect()))
}

/// Distinct specializations among approved doctors.
#[utoipa::path(
    get,
    path = "/doctors/specializations",
    responses((status = 200, description = "Sorted specializations", body = [String]))
)]
pub async fn list_specializations_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, HandlerError> {
    let specializations = state
        .directory
        .specializations()
        .await
        .map_err(|e| workflow_error("Failed to list specializations", e))?;
    Ok(Json(specializations))
}

#[utoipa::path(
    get,
    path = "/doctors/{id}",
    params(("id" = Uuid, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "The doctor", body = DoctorResponse),
        (status = 404, description = "No approved doctor with that id")
    )
)]
pub async fn get_doctor_handler(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<DoctorResponse>, HandlerError> {
    let doctor = state
        .directory
        .get(doctor_id)
        .await
        .map_err(|e| workflow_error("Failed to load doctor", e))?;
    Ok(Json(doctor.into()))
}

/// Times still open with a doctor on the given day.
#[utoipa::path(
    get,
    path = "/doctors/{id}/slots",
    params(("id" = Uuid, Path, description = "Doctor id"), SlotParams),
    responses(
        (status = 200, description = "Open times in the doctor's order", body = SlotsResponse),
        (status = 404, description = "Unknown doctor")
    )
)]
pub async fn list_slots_handler(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    Query(params): Query<SlotParams>,
) -> Result<Json<SlotsResponse>, HandlerError> {
    let available = state
        .booking
        .list_available_slots(doctor_id, params.date)
        .await
        .map_err(|e| workflow_error("Failed to list available slots", e))?;
    Ok(Json(SlotsResponse {
        doctor_id,
        date: params.date,
        available,
    }))
}

//=========================================================================================
// Doctor Applications
//=========================================================================================

/// Apply to become a doctor. Every admin is notified.
#[utoipa::path(
    post,
    path = "/doctor-applications",
    request_body = DoctorApplicationRequest,
    responses(
        (status = 201, description = "Application filed", body = DoctorResponse),
        (status = 400, description = "Invalid application")
    )
)]
pub async fn submit_application_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<DoctorApplicationRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let applicant = current_account(&session)?;
    let application = state
        .applications
        .submit(applicant.id, &req.into())
        .await
        .map_err(|e| workflow_error("Failed to submit application", e))?;
    Ok((StatusCode::CREATED, Json(DoctorResponse::from(application))))
}

/// Pending applications, newest first.
#[utoipa::path(
    get,
    path = "/doctor-applications",
    params(ListLimit),
    responses(
        (status = 200, description = "Pending applications", body = [DoctorResponse]),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_applications_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListLimit>,
) -> Result<Json<Vec<DoctorResponse>>, HandlerError> {
    let pending = state
        .applications
        .list_pending(params.limit)
        .await
        .map_err(|e| workflow_error("Failed to list applications", e))?;
    Ok(Json(pending.into_iter().map(DoctorResponse::from).collect()))
}

/// Approve or block a pending application.
#[utoipa::path(
    post,
    path = "/doctor-applications/{id}/decision",
    params(("id" = Uuid, Path, description = "Application id")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Application decided", body = DoctorResponse),
        (status = 400, description = "Unknown decision or application already decided"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Unknown application")
    )
)]
pub async fn decide_application_handler(
    State(state): State<Arc<AppState>>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<DoctorResponse>, HandlerError> {
    let decision: ApplicationDecision = parse_label(&req.decision)?;
    let application = state
        .applications
        .decide(application_id, decision)
        .await
        .map_err(|e| workflow_error("Failed to decide application", e))?;
    Ok(Json(application.into()))
}

//=========================================================================================
// Administration
//=========================================================================================

#[utoipa::path(
    get,
    path = "/admin/stats",
    responses(
        (status = 200, description = "Dashboard figures", body = AdminStatsResponse),
        (status = 403, description = "Admins only")
    )
)]
pub async fn admin_stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AdminStatsResponse>, HandlerError> {
    let stats = state
        .applications
        .dashboard_stats()
        .await
        .map_err(|e| workflow_error("Failed to load dashboard", e))?;
    Ok(Json(stats.into()))
}

/// Set an account's role.
#[utoipa::path(
    put,
    path = "/admin/accounts/{id}/role",
    params(("id" = Uuid, Path, description = "Account id")),
    request_body = RoleRequest,
    responses(
        (status = 204, description = "Role set"),
        (status = 400, description = "Unknown role or unsupported change"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Unknown account")
    )
)]
pub async fn assign_role_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(account_id): Path<Uuid>,
    Json(req): Json<RoleRequest>,
) -> Result<StatusCode, HandlerError> {
    let role: Role = parse_label(&req.role)?;
    state
        .applications
        .assign_role(account_id, role)
        .await
        .map_err(|e| workflow_error("Failed to assign role", e))?;
    info!(
        "Admin {:?} set role of {} to {}",
        session.account_id(),
        account_id,
        role
    );
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Appointments
//=========================================================================================

/// Request an appointment. The doctor is notified.
#[utoipa::path(
    post,
    path = "/appointments",
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment requested", body = AppointmentResponse),
        (status = 400, description = "Doctor not bookable or time not offered"),
        (status = 404, description = "Unknown doctor"),
        (status = 409, description = "Slot already taken")
    )
)]
pub async fn book_appointment_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<BookAppointmentRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let patient = current_account(&session)?;
    let appointment = state
        .booking
        .book(patient.id, req.doctor_id, req.date, &req.time)
        .await
        .map_err(|e| workflow_error("Failed to book appointment", e))?;
    Ok((
        StatusCode::CREATED,
        Json(AppointmentResponse::from(appointment)),
    ))
}

/// The caller's appointments: booked ones for patients, received ones for doctors.
#[utoipa::path(
    get,
    path = "/appointments",
    params(AppointmentFilter),
    responses(
        (status = 200, description = "Appointments with their doctor", body = [AppointmentResponse]),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_appointments_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Vec<AppointmentResponse>>, HandlerError> {
    let account = current_account(&session)?;
    let status = filter
        .status
        .as_deref()
        .map(parse_label::<AppointmentStatus>)
        .transpose()?;
    let appointments = state
        .booking
        .list_for_account(account, status)
        .await
        .map_err(|e| workflow_error("Failed to list appointments", e))?;
    Ok(Json(
        appointments
            .into_iter()
            .map(AppointmentResponse::from)
            .collect(),
    ))
}

/// Approve or reject a pending appointment.
#[utoipa::path(
    post,
    path = "/appointments/{id}/status",
    params(("id" = Uuid, Path, description = "Appointment id")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Appointment decided", body = AppointmentResponse),
        (status = 400, description = "Unknown decision or appointment already decided"),
        (status = 403, description = "Not this appointment's doctor"),
        (status = 404, description = "Unknown appointment")
    )
)]
pub async fn set_appointment_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(appointment_id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<AppointmentResponse>, HandlerError> {
    let actor = current_account(&session)?;
    let decision: AppointmentDecision = parse_label(&req.decision)?;
    let appointment = state
        .booking
        .set_status(actor, appointment_id, decision)
        .await
        .map_err(|e| workflow_error("Failed to update appointment", e))?;
    Ok(Json(appointment.into()))
}

//=========================================================================================
// Notifications
//=========================================================================================

#[utoipa::path(
    get,
    path = "/notifications",
    responses((status = 200, description = "The caller's inbox", body = InboxResponse))
)]
pub async fn list_notifications_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<InboxResponse>, HandlerError> {
    let account = current_account(&session)?;
    let inbox = state
        .notifications
        .list(account.id)
        .await
        .map_err(|e| workflow_error("Failed to list notifications", e))?;
    Ok(Json(InboxResponse {
        unseen: inbox.unseen().into_iter().map(NotificationResponse::from).collect(),
        seen: inbox.seen().into_iter().map(NotificationResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/notifications/{id}/seen",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked seen", body = MarkSeenResponse),
        (status = 403, description = "Notification belongs to someone else"),
        (status = 404, description = "Unknown notification")
    )
)]
pub async fn mark_seen_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<MarkSeenResponse>, HandlerError> {
    let account = current_account(&session)?;
    let updated = state
        .notifications
        .mark_seen(account.id, notification_id)
        .await
        .map_err(|e| workflow_error("Failed to mark notification seen", e))?;
    Ok(Json(MarkSeenResponse { updated }))
}
