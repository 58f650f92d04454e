//! crates/booking_core/src/services/directory.rs
//!
//! Read-only search over approved doctors.

use crate::domain::{DoctorApplication, DoctorStatus};
use crate::error::WorkflowResult;
use crate::ports::{DataGateway, PortError};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// Filters for a directory search. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorQuery {
    /// Case-insensitive substring of first name, last name or specialization.
    pub search: Option<String>,
    /// Exact specialization.
    pub specialization: Option<String>,
}

impl DoctorQuery {
    pub fn matches(&self, doctor: &DoctorApplication) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                doctor.first_name.to_lowercase().contains(&term)
                    || doctor.last_name.to_lowercase().contains(&term)
                    || doctor.specialization.to_lowercase().contains(&term)
            }
        };
        let matches_specialization = match self.specialization.as_deref() {
            None | Some("") => true,
            Some(specialization) => doctor.specialization == specialization,
        };
        matches_search && matches_specialization
    }
}

#[derive(Clone)]
pub struct DoctorDirectory {
    gateway: Arc<dyn DataGateway>,
}

impl DoctorDirectory {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self { gateway }
    }

    /// Approved doctors matching `query`, newest first.
    pub async fn search(&self, query: &DoctorQuery) -> WorkflowResult<Vec<DoctorApplication>> {
        let doctors = self
            .gateway
            .list_doctors_by_status(DoctorStatus::Approved, None)
            .await?;
        Ok(doctors.into_iter().filter(|d| query.matches(d)).collect())
    }

    /// Distinct specializations among approved doctors, sorted.
    pub async fn specializations(&self) -> WorkflowResult<Vec<String>> {
        let doctors = self
            .gateway
            .list_doctors_by_status(DoctorStatus::Approved, None)
            .await?;
        let distinct: BTreeSet<String> = doctors.into_iter().map(|d| d.specialization).collect();
        Ok(distinct.into_iter().collect())
    }

    /// One approved doctor. Pending and blocked applications read as not found.
    pub async fn get(&self, doctor_id: Uuid) -> WorkflowResult<DoctorApplication> {
        let doctor = self.gateway.get_doctor(doctor_id).await?;
        if doctor.status != DoctorStatus::Approved {
            return Err(PortError::NotFound(format!("Doctor {} not found", doctor_id)).into());
        }
        Ok(doctor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::error::WorkflowError;
    use crate::testing::InMemoryGateway;

    fn setup() -> (Arc<InMemoryGateway>, DoctorDirectory) {
        let gateway = Arc::new(InMemoryGateway::new());
        let owner = gateway.seed_account("o@example.com", Role::Doctor);
        gateway.seed_doctor(owner.id, "Ann", "Lee", "Neurology", DoctorStatus::Approved, &[]);
        gateway.seed_doctor(owner.id, "Raj", "Patel", "Cardiology", DoctorStatus::Approved, &[]);
        gateway.seed_doctor(owner.id, "Eve", "Stone", "Neurology", DoctorStatus::Pending, &[]);
        let directory = DoctorDirectory::new(gateway.clone());
        (gateway, directory)
    }

    #[tokio::test]
    async fn only_approved_doctors_are_listed_newest_first() {
        let (_gateway, directory) = setup();
        let all = directory.search(&DoctorQuery::default()).await.unwrap();
        let names: Vec<String> = all.iter().map(|d| d.full_name()).collect();
        assert_eq!(names, vec!["Raj Patel", "Ann Lee"]);
    }

    #[tokio::test]
    async fn search_term_matches_names_and_specialization() {
        let (_gateway, directory) = setup();
        let by_name = DoctorQuery {
            search: Some("lee".to_string()),
            ..Default::default()
        };
        assert_eq!(directory.search(&by_name).await.unwrap().len(), 1);

        let by_specialty = DoctorQuery {
            search: Some("CARDIO".to_string()),
            ..Default::default()
        };
        let found = directory.search(&by_specialty).await.unwrap();
        assert_eq!(found[0].last_name, "Patel");
    }

    #[tokio::test]
    async fn specialization_filter_is_exact() {
        let (_gateway, directory) = setup();
        let query = DoctorQuery {
            search: None,
            specialization: Some("Neuro".to_string()),
        };
        assert!(directory.search(&query).await.unwrap().is_empty());
        assert_eq!(
            directory.specializations().await.unwrap(),
            vec!["Cardiology", "Neurology"]
        );
    }

    #[tokio::test]
    async fn unapproved_applications_are_not_visible_by_id() {
        let (gateway, directory) = setup();
        let doctors = gateway.doctors();
        let pending = doctors.iter().find(|d| d.status == DoctorStatus::Pending).unwrap();
        let approved = doctors.iter().find(|d| d.status == DoctorStatus::Approved).unwrap();

        let err = directory.get(pending.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Gateway(PortError::NotFound(_))));
        assert_eq!(directory.get(approved.id).await.unwrap().id, approved.id);

        let owner = gateway.seed_account("b@example.com", Role::User);
        let blocked = gateway.seed_doctor(owner.id, "Ty", "Cole", "Oncology", DoctorStatus::Blocked, &[]);
        assert!(directory.get(blocked.id).await.is_err());
    }
}
