//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the single planner it hosts.

use crate::config::Config;
use meal_plan_core::{GenerationProvider, PlannerSession};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub provider: Arc<dyn GenerationProvider>,
    /// The planner session. Never hold this lock across a provider call.
    pub planner: Mutex<PlannerState>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        provider: Arc<dyn GenerationProvider>,
        session: PlannerSession,
    ) -> Self {
        Self {
            config,
            provider,
            planner: Mutex::new(PlannerState::new(session)),
        }
    }
}

//=========================================================================================
// PlannerState (The Single Writer)
//=========================================================================================

/// The planner session plus the cancellation tokens of its in-flight provider calls.
pub struct PlannerState {
    pub session: PlannerSession,
    plan_token: Option<CancellationToken>,
    swap_token: Option<CancellationToken>,
}

impl PlannerState {
    pub fn new(session: PlannerSession) -> Self {
        Self {
            session,
            plan_token: None,
            swap_token: None,
        }
    }

    /// Cancels the in-flight plan generation, if any, and hands out a fresh token for
    /// the one about to start.
    pub fn replace_plan_token(&mut self) -> CancellationToken {
        replace_token(&mut self.plan_token)
    }

    pub fn replace_swap_token(&mut self) -> CancellationToken {
        replace_token(&mut self.swap_token)
    }

    /// Cancels the in-flight plan generation, if any.
    pub fn cancel_plan(&mut self) {
        if let Some(token) = self.plan_token.take() {
            token.cancel();
        }
    }

    /// Cancels the in-flight alternatives request, if any.
    pub fn cancel_swap(&mut self) {
        if let Some(token) = self.swap_token.take() {
            token.cancel();
        }
    }
}

fn replace_token(slot: &mut Option<CancellationToken>) -> CancellationToken {
    if let Some(previous) = slot.take() {
        previous.cancel();
    }
    let token = CancellationToken::new();
    *slot = Some(token.clone());
    token
}
