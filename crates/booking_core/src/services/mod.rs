pub mod applications;
pub mod booking;
pub mod directory;
pub mod notifications;

pub use applications::{AdminStats, ApplicationWorkflow};
pub use booking::BookingWorkflow;
pub use directory::{DoctorDirectory, DoctorQuery};
pub use notifications::{NotificationInbox, NotificationRelay, Subscription};

use crate::domain::NewNotification;
use crate::ports::DataGateway;
use tracing::warn;

/// Writes side-effect notifications. A failure is logged and otherwise ignored:
/// the write that triggered them has already committed and stays committed.
pub(crate) async fn notify_best_effort(gateway: &dyn DataGateway, notifications: &[NewNotification]) {
    if notifications.is_empty() {
        return;
    }
    if let Err(e) = gateway.insert_notifications(notifications).await {
        warn!("Failed to create {} notification(s): {}", notifications.len(), e);
    }
}
