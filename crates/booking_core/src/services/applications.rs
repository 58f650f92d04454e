//! crates/booking_core/src/services/applications.rs
//!
//! Doctor applications: submission with admin fan-out, the approve/block
//! decision with its compensating role rollback, and the admin-side queries.

use crate::domain::{
    ApplicationDecision, DoctorApplication, DoctorStatus, NewDoctorApplication, NewNotification,
    Role,
};
use crate::error::{WorkflowError, WorkflowResult};
use crate::ports::{DataGateway, PortError};
use crate::services::notify_best_effort;
use crate::validation::validate_application;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// How many pending applications the admin dashboard previews.
pub const RECENT_APPLICATIONS: i64 = 5;

/// Figures shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminStats {
    pub total_doctors: i64,
    pub pending_applications: i64,
    pub total_appointments: i64,
    pub recent_applications: Vec<DoctorApplication>,
}

#[derive(Clone)]
pub struct ApplicationWorkflow {
    gateway: Arc<dyn DataGateway>,
}

impl ApplicationWorkflow {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self { gateway }
    }

    /// Files a new application for `applicant_id` and tells every admin about it.
    pub async fn submit(
        &self,
        applicant_id: Uuid,
        fields: &NewDoctorApplication,
    ) -> WorkflowResult<DoctorApplication> {
        let fields = validate_application(fields)?;
        let application = self.gateway.insert_doctor(applicant_id, &fields).await?;
        info!(
            "Doctor application {} submitted by account {}",
            application.id, applicant_id
        );

        match self.gateway.list_accounts_by_role(Role::Admin).await {
            Ok(admins) => {
                let message = format!(
                    "New doctor application received from {}",
                    application.full_name()
                );
                let notifications: Vec<NewNotification> = admins
                    .iter()
                    .map(|admin| NewNotification::new(admin.id, message.clone()))
                    .collect();
                notify_best_effort(self.gateway.as_ref(), &notifications).await;
            }
            Err(e) => warn!(
                "Could not look up admins to notify about application {}: {}",
                application.id, e
            ),
        }

        Ok(application)
    }

    /// Approves or blocks a pending application.
    ///
    /// Approval promotes the owner to `doctor` before the application row is
    /// touched. The status write only succeeds on a still-pending row; if it
    /// fails the promotion is reverted unless a concurrent request approved
    /// the same application. Once this returns the pair (role, status) is
    /// (doctor, approved), (user, blocked) or still (user, pending).
    pub async fn decide(
        &self,
        application_id: Uuid,
        decision: ApplicationDecision,
    ) -> WorkflowResult<DoctorApplication> {
        let mut application = self.gateway.get_doctor(application_id).await?;
        if application.status != DoctorStatus::Pending {
            return Err(WorkflowError::Validation(format!(
                "application {} has already been {}",
                application_id, application.status
            )));
        }
        let status = DoctorStatus::from(decision);

        match decision {
            ApplicationDecision::Approved => {
                self.gateway
                    .update_account_role(application.account_id, Role::Doctor)
                    .await?;

                if let Err(e) = self.gateway.update_doctor_status(application_id, status).await {
                    if self.approved_elsewhere(application_id, &e).await {
                        // A concurrent approval won; the promotion stands.
                        return Err(e.into());
                    }
                    error!(
                        "Failed to approve application {}, reverting role of account {}: {}",
                        application_id, application.account_id, e
                    );
                    if let Err(rollback) = self
                        .gateway
                        .update_account_role(application.account_id, Role::User)
                        .await
                    {
                        error!(
                            "Role rollback for account {} failed: {}",
                            application.account_id, rollback
                        );
                    }
                    return Err(e.into());
                }
            }
            ApplicationDecision::Blocked => {
                self.gateway.update_doctor_status(application_id, status).await?;
            }
        }
        application.status = status;
        info!("Doctor application {} {}", application_id, status);

        let follow_up = match decision {
            ApplicationDecision::Approved => {
                "You can now log in as a doctor and start accepting appointments."
            }
            ApplicationDecision::Blocked => "Please contact support for more information.",
        };
        let notification = NewNotification::new(
            application.account_id,
            format!("Your doctor application has been {}. {}", status, follow_up),
        );
        notify_best_effort(self.gateway.as_ref(), &[notification]).await;

        Ok(application)
    }

    /// Whether a failed approval lost to another request that approved the
    /// same application in the meantime.
    async fn approved_elsewhere(&self, application_id: Uuid, failure: &PortError) -> bool {
        if !matches!(failure, PortError::Conflict(_)) {
            return false;
        }
        match self.gateway.get_doctor(application_id).await {
            Ok(current) => current.status == DoctorStatus::Approved,
            Err(e) => {
                warn!("Could not re-read application {}: {}", application_id, e);
                false
            }
        }
    }

    /// Pending applications, newest first.
    pub async fn list_pending(&self, limit: Option<i64>) -> WorkflowResult<Vec<DoctorApplication>> {
        Ok(self
            .gateway
            .list_doctors_by_status(DoctorStatus::Pending, limit)
            .await?)
    }

    /// Sets an account's role directly. Demoting a doctor is not supported.
    pub async fn assign_role(&self, account_id: Uuid, role: Role) -> WorkflowResult<()> {
        let account = self.gateway.get_account(account_id).await?;
        if account.role == Role::Doctor && role == Role::User {
            return Err(WorkflowError::Validation(
                "doctors cannot be demoted to user".to_string(),
            ));
        }
        if account.role == role {
            return Ok(());
        }
        self.gateway.update_account_role(account_id, role).await?;
        info!("Account {} role set from {} to {}", account_id, account.role, role);
        Ok(())
    }

    pub async fn dashboard_stats(&self) -> WorkflowResult<AdminStats> {
        let total_doctors = self
            .gateway
            .count_doctors_by_status(DoctorStatus::Approved)
            .await?;
        let pending_applications = self
            .gateway
            .count_doctors_by_status(DoctorStatus::Pending)
            .await?;
        let total_appointments = self.gateway.count_appointments().await?;
        let recent_applications = self
            .gateway
            .list_doctors_by_status(DoctorStatus::Pending, Some(RECENT_APPLICATIONS))
            .await?;

        Ok(AdminStats {
            total_doctors,
            pending_applications,
            total_appointments,
            recent_applications,
        })
    }
}
