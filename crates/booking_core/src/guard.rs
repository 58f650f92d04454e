//! crates/booking_core/src/guard.rs
//!
//! Role-based access decisions.

use crate::domain::Role;
use crate::session::{SessionContext, SessionState};

/// The outcome of checking a session against a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Identity is still loading. Show a neutral state and decide later.
    Pending,
    Render,
    RedirectToLogin,
    RedirectToUnauthorized,
}

/// Gates a view or route on the current role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGuard {
    allowed: Option<Vec<Role>>,
}

impl RoleGuard {
    /// Any signed-in account passes.
    pub fn authenticated() -> Self {
        Self { allowed: None }
    }

    pub fn only(roles: &[Role]) -> Self {
        Self {
            allowed: Some(roles.to_vec()),
        }
    }

    pub fn evaluate(&self, session: &SessionContext) -> GuardDecision {
        match session.state() {
            SessionState::Loading => GuardDecision::Pending,
            SessionState::SignedOut => GuardDecision::RedirectToLogin,
            SessionState::SignedIn { profile, .. } => match &self.allowed {
                None => GuardDecision::Render,
                Some(allowed) => match profile {
                    Some(account) if allowed.contains(&account.role) => GuardDecision::Render,
                    _ => GuardDecision::RedirectToUnauthorized,
                },
            },
        }
    }
}
