//! crates/booking_core/src/session.rs
//!
//! The explicit session context handed to the role guard and the workflows.
//! It replaces any process-wide "current user" state: the web layer builds
//! one per request, and the WebSocket loop owns one for its lifetime.

use crate::domain::{Account, Role};
use crate::ports::DataGateway;
use tracing::warn;
use uuid::Uuid;

/// Where the identity lookup for a session currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Identity is still being resolved; no access decision can be made yet.
    Loading,
    SignedOut,
    /// A verified identity. `profile` is `None` if the profile row could not be loaded.
    SignedIn {
        account_id: Uuid,
        profile: Option<Account>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    state: SessionState,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::loading()
    }
}

impl SessionContext {
    pub fn from_state(state: SessionState) -> Self {
        Self { state }
    }

    pub fn loading() -> Self {
        Self {
            state: SessionState::Loading,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            state: SessionState::SignedOut,
        }
    }

    /// A session with an already loaded profile.
    pub fn signed_in(account: Account) -> Self {
        Self {
            state: SessionState::SignedIn {
                account_id: account.id,
                profile: Some(account),
            },
        }
    }

    /// Resolves the session at its start. `account_id` is the identity the
    /// identity provider vouched for, if any.
    pub async fn initialize(&mut self, gateway: &dyn DataGateway, account_id: Option<Uuid>) {
        self.state = match account_id {
            None => SessionState::SignedOut,
            Some(account_id) => SessionState::SignedIn {
                account_id,
                profile: load_profile(gateway, account_id).await,
            },
        };
    }

    /// Re-reads the profile after something changed it (e.g. a role promotion).
    pub async fn refresh(&mut self, gateway: &dyn DataGateway) {
        if let SessionState::SignedIn { account_id, profile } = &mut self.state {
            *profile = load_profile(gateway, *account_id).await;
        }
    }

    pub fn clear(&mut self) {
        self.state = SessionState::SignedOut;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Loading)
    }

    pub fn account_id(&self) -> Option<Uuid> {
        match &self.state {
            SessionState::SignedIn { account_id, .. } => Some(*account_id),
            _ => None,
        }
    }

    pub fn account(&self) -> Option<&Account> {
        match &self.state {
            SessionState::SignedIn { profile, .. } => profile.as_ref(),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.account().map(|account| account.role)
    }
}

async fn load_profile(gateway: &dyn DataGateway, account_id: Uuid) -> Option<Account> {
    match gateway.get_account(account_id).await {
        Ok(account) => Some(account),
        Err(e) => {
            warn!("Failed to load profile for account {}: {}", account_id, e);
            None
        }
    }
}
