//! End-to-end tests for the HTTP surface, run against the in-memory gateway.

use api_lib::{
    config::Config,
    web::{router, state::AppState},
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use booking_core::testing::{Fault, InMemoryGateway};
use booking_core::{
    Account, AppointmentStatus, DataGateway, DoctorStatus, IdentityProvider, NewNotification, Role,
};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    gateway: Arc<InMemoryGateway>,
    app: Router,
}

impl TestApp {
    fn new() -> Self {
        let gateway = Arc::new(InMemoryGateway::new());
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://unused/clinic".to_string()),
            _ => None,
        })
        .unwrap();
        let state = Arc::new(AppState::new(
            gateway.clone(),
            gateway.clone(),
            Arc::new(config),
        ));
        let app = router(state).unwrap();
        Self { gateway, app }
    }

    /// Opens a session for `account` directly, skipping password hashing.
    async fn cookie_for(&self, account: &Account) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.gateway
            .create_auth_session(&session_id, account.id, Utc::now() + Duration::days(1))
            .await
            .unwrap();
        format!("session={}", session_id)
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }
}

fn june_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

#[tokio::test]
async fn signup_login_and_logout_round_trip() {
    let t = TestApp::new();
    let credentials = json!({ "email": "Ann@Example.com", "password": "correct horse" });

    let (status, body) = t
        .call(Method::POST, "/auth/signup", None, Some(credentials.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "ann@example.com");

    let (status, _) = t
        .call(Method::POST, "/auth/signup", None, Some(credentials.clone()))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = t
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "ann@example.com", "password": "wrong password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(credentials.to_string()))
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let (status, me) = t.call(Method::GET, "/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "user");

    let (status, _) = t.call(Method::POST, "/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = t.call(Method::GET, "/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_need_a_session() {
    let t = TestApp::new();

    let (status, _) = t.call(Method::GET, "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = t
        .call(Method::GET, "/doctors", Some("session=made-up"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_store_outage_is_a_server_error() {
    let t = TestApp::new();
    let user = t.gateway.seed_account("u@example.com", Role::User);
    let cookie = t.cookie_for(&user).await;
    t.gateway.fail(Fault::SessionLookup);

    let (status, _) = t.call(Method::GET, "/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    t.gateway.heal(Fault::SessionLookup);
    let (status, _) = t.call(Method::GET, "/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_routes_reject_other_roles() {
    let t = TestApp::new();
    let user = t.gateway.seed_account("user@example.com", Role::User);
    let doctor = t.gateway.seed_account("doc@example.com", Role::Doctor);
    let admin = t.gateway.seed_account("admin@example.com", Role::Admin);

    for account in [&user, &doctor] {
        let cookie = t.cookie_for(account).await;
        let (status, _) = t.call(Method::GET, "/admin/stats", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let cookie = t.cookie_for(&admin).await;
    let (status, stats) = t.call(Method::GET, "/admin/stats", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["pending_applications"], 0);
}

#[tokio::test]
async fn application_approval_promotes_the_applicant() {
    let t = TestApp::new();
    let applicant = t.gateway.seed_account("ann@example.com", Role::User);
    let admin = t.gateway.seed_account("admin@example.com", Role::Admin);
    let applicant_cookie = t.cookie_for(&applicant).await;
    let admin_cookie = t.cookie_for(&admin).await;

    let (status, application) = t
        .call(
            Method::POST,
            "/doctor-applications",
            Some(&applicant_cookie),
            Some(json!({
                "first_name": "Ann",
                "last_name": "Lee",
                "specialization": "Neurology",
                "experience": 7,
                "fee": 150,
                "phone": "555-0100",
                "address": "1 Main St",
                "timings": ["09:00 AM", "10:00 AM"]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(application["status"], "pending");
    let admin_inbox = t.gateway.notifications_for(admin.id);
    assert_eq!(admin_inbox.len(), 1);
    assert!(admin_inbox[0].message.contains("Ann Lee"));

    let (status, pending) = t
        .call(Method::GET, "/doctor-applications", Some(&admin_cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let uri = format!("/doctor-applications/{}/decision", application["id"].as_str().unwrap());
    let (status, _) = t
        .call(Method::POST, &uri, Some(&admin_cookie), Some(json!({ "decision": "maybe" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, decided) = t
        .call(Method::POST, &uri, Some(&admin_cookie), Some(json!({ "decision": "approved" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decided["status"], "approved");
    assert_eq!(t.gateway.account(applicant.id).unwrap().role, Role::Doctor);

    let (_, me) = t.call(Method::GET, "/me", Some(&applicant_cookie), None).await;
    assert_eq!(me["role"], "doctor");
}

#[tokio::test]
async fn booking_flow_through_the_api() {
    let t = TestApp::new();
    let patient = t.gateway.seed_account("p1@example.com", Role::User);
    let rival = t.gateway.seed_account("p2@example.com", Role::User);
    let doctor_account = t.gateway.seed_account("d1@example.com", Role::Doctor);
    let doctor = t.gateway.seed_doctor(
        doctor_account.id,
        "Ann",
        "Lee",
        "Neurology",
        DoctorStatus::Approved,
        &["09:00 AM", "10:00 AM"],
    );
    let patient_cookie = t.cookie_for(&patient).await;
    let rival_cookie = t.cookie_for(&rival).await;
    let doctor_cookie = t.cookie_for(&doctor_account).await;
    let booking = json!({ "doctor_id": doctor.id, "date": "2025-06-01", "time": "10:00 AM" });

    let (status, appointment) = t
        .call(Method::POST, "/appointments", Some(&patient_cookie), Some(booking.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(appointment["status"], "pending");

    let (status, _) = t
        .call(Method::POST, "/appointments", Some(&rival_cookie), Some(booking))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let slots_uri = format!("/doctors/{}/slots?date=2025-06-01", doctor.id);
    let (status, slots) = t.call(Method::GET, &slots_uri, Some(&rival_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slots["available"], json!(["09:00 AM"]));

    let (_, practice) = t
        .call(Method::GET, "/appointments?status=pending", Some(&doctor_cookie), None)
        .await;
    assert_eq!(practice.as_array().unwrap().len(), 1);
    assert_eq!(practice[0]["doctor"]["id"], json!(doctor.id));

    let status_uri = format!("/appointments/{}/status", appointment["id"].as_str().unwrap());
    let (status, _) = t
        .call(Method::POST, &status_uri, Some(&patient_cookie), Some(json!({ "decision": "approved" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, approved) = t
        .call(Method::POST, &status_uri, Some(&doctor_cookie), Some(json!({ "decision": "approved" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    let (_, inbox) = t.call(Method::GET, "/notifications", Some(&patient_cookie), None).await;
    let unseen = inbox["unseen"].as_array().unwrap();
    assert_eq!(unseen.len(), 1);
    let message = unseen[0]["message"].as_str().unwrap();
    assert!(message.contains("2025-06-01") && message.contains("10:00 AM"));
    assert_eq!(
        t.gateway.appointments()[0].status,
        AppointmentStatus::Approved
    );
    assert_eq!(t.gateway.appointments()[0].date, june_first());
}

#[tokio::test]
async fn notifications_can_only_be_marked_by_their_recipient() {
    let t = TestApp::new();
    let me = t.gateway.seed_account("me@example.com", Role::User);
    let other = t.gateway.seed_account("other@example.com", Role::User);
    let mine = t
        .gateway
        .insert_notifications(&[NewNotification::new(me.id, "hello")])
        .await
        .unwrap()
        .remove(0);
    let my_cookie = t.cookie_for(&me).await;
    let other_cookie = t.cookie_for(&other).await;
    let uri = format!("/notifications/{}/seen", mine.id);

    let (status, _) = t.call(Method::POST, &uri, Some(&other_cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, first) = t.call(Method::POST, &uri, Some(&my_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["updated"], true);

    let (_, second) = t.call(Method::POST, &uri, Some(&my_cookie), None).await;
    assert_eq!(second["updated"], false);
    assert_eq!(t.gateway.seen_writes(), 1);

    let (_, inbox) = t.call(Method::GET, "/notifications", Some(&my_cookie), None).await;
    assert_eq!(inbox["unseen"], json!([]));
    assert_eq!(inbox["seen"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn directory_lists_only_approved_doctors() {
    let t = TestApp::new();
    let viewer = t.gateway.seed_account("viewer@example.com", Role::User);
    let owner = t.gateway.seed_account("doc@example.com", Role::Doctor);
    t.gateway.seed_doctor(owner.id, "Ann", "Lee", "Neurology", DoctorStatus::Approved, &[]);
    t.gateway.seed_doctor(owner.id, "Raj", "Patel", "Cardiology", DoctorStatus::Approved, &[]);
    let pending = t.gateway.seed_doctor(owner.id, "Eve", "Stone", "Oncology", DoctorStatus::Pending, &[]);
    let cookie = t.cookie_for(&viewer).await;

    let (status, doctors) = t.call(Method::GET, "/doctors", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doctors.as_array().unwrap().len(), 2);

    let (_, filtered) = t
        .call(Method::GET, "/doctors?search=lee", Some(&cookie), None)
        .await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["last_name"], "Lee");

    let (_, specializations) = t
        .call(Method::GET, "/doctors/specializations", Some(&cookie), None)
        .await;
    assert_eq!(specializations, json!(["Cardiology", "Neurology"]));

    let (status, _) = t
        .call(Method::GET, &format!("/doctors/{}", Uuid::new_v4()), Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = t
        .call(Method::GET, &format!("/doctors/{}", pending.id), Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
