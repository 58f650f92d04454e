pub mod domain;
pub mod error;
pub mod guard;
pub mod ports;
pub mod services;
pub mod session;
pub mod validation;
pub mod view;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use domain::{
    Account, AccountCredentials, ApplicationDecision, Appointment, AppointmentDecision,
    AppointmentStatus, AppointmentWithDoctor, DoctorApplication, DoctorStatus, NewAppointment,
    NewDoctorApplication, NewNotification, Notification, ParseLabelError, Role,
};
pub use error::{WorkflowError, WorkflowResult};
pub use guard::{GuardDecision, RoleGuard};
pub use ports::{
    AppointmentOwner, DataGateway, IdentityProvider, NotificationStream, PortError, PortResult,
};
pub use services::{
    AdminStats, ApplicationWorkflow, BookingWorkflow, DoctorDirectory, DoctorQuery,
    NotificationInbox, NotificationRelay, Subscription,
};
pub use session::{SessionContext, SessionState};
