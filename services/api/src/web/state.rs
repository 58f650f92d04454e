//! services/api/src/web/state.rs
//!
//! Defines the application state shared by every handler.

use crate::config::Config;
use booking_core::ports::{DataGateway, IdentityProvider};
use booking_core::services::{
    ApplicationWorkflow, BookingWorkflow, DoctorDirectory, NotificationRelay,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn DataGateway>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<Config>,
    pub applications: ApplicationWorkflow,
    pub booking: BookingWorkflow,
    pub directory: DoctorDirectory,
    pub notifications: NotificationRelay,
}

impl AppState {
    /// Wires every workflow to the same gateway.
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        identity: Arc<dyn IdentityProvider>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            applications: ApplicationWorkflow::new(gateway.clone()),
            booking: BookingWorkflow::new(gateway.clone()),
            directory: DoctorDirectory::new(gateway.clone()),
            notifications: NotificationRelay::new(gateway.clone()),
            gateway,
            identity,
            config,
        }
    }
}
