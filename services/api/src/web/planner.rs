//! services/api/src/web/planner.rs
//!
//! The asynchronous "worker" functions that drive one provider round trip each:
//! a full plan generation or a meal-alternatives fetch.
//!
//! Both follow the same shape: lock, begin (ticket + request), unlock, await the
//! provider, lock, complete. A newer call cancels the older call's token, so the
//! superseded provider future is dropped instead of running to completion.

use crate::web::state::AppState;
use meal_plan_core::{Completion, Meal, PlanError, PlanResult, ProviderRequest, SwapKey};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Represents the outcome of a `generate_plan` task.
#[derive(Debug, PartialEq, Eq)]
pub enum PlanOutcome {
    /// The new plan replaced the previous one.
    Applied,
    /// A newer generation started first; this one's result was dropped.
    Superseded,
}

/// Represents the outcome of a `fetch_alternatives` task.
#[derive(Debug, PartialEq)]
pub enum SwapOutcome {
    /// Alternatives are ready and the swap is open.
    Opened(Vec<Meal>),
    /// The requested day is not in the current plan.
    DayNotFound,
    /// The swap was dismissed or replaced before the alternatives arrived.
    Superseded,
}

/// Runs one full plan generation against the provider and loads the result.
pub async fn generate_plan(app_state: Arc<AppState>) -> PlanResult<PlanOutcome> {
    let start_time = Instant::now();

    let (ticket, request, token) = {
        let mut planner = app_state.planner.lock().await;
        let (ticket, request) = planner.session.begin_plan_generation()?;
        let token = planner.replace_plan_token();
        (ticket, request, token)
    };
    info!("Plan generation {} started.", ticket);

    let Some(outcome) = call_provider(&app_state, &request, &token).await else {
        info!("Plan generation {} was superseded.", ticket);
        return Ok(PlanOutcome::Superseded);
    };
    info!("⏱️ Plan provider call took: {:?}", start_time.elapsed());

    let mut planner = app_state.planner.lock().await;
    match planner.session.complete_plan_generation(ticket, outcome) {
        Ok(Completion::Applied) => Ok(PlanOutcome::Applied),
        Ok(Completion::Stale) => Ok(PlanOutcome::Superseded),
        Err(e) => {
            error!("Plan generation {} failed: {}", ticket, e);
            Err(e)
        }
    }
}

/// Starts a plan generation in the background. Used after settings are saved or
/// restored, where nobody waits on the result.
pub fn spawn_generation(app_state: Arc<AppState>) -> JoinHandle<PlanResult<PlanOutcome>> {
    tokio::spawn(async move {
        let result = generate_plan(app_state).await;
        match &result {
            Ok(outcome) => info!("Background plan generation finished: {:?}", outcome),
            Err(e) => warn!("Background plan generation failed: {}", e),
        }
        result
    })
}

/// Stops the in-flight plan generation. The current plan stays loaded.
pub async fn cancel_generation(app_state: &AppState) {
    let mut planner = app_state.planner.lock().await;
    if planner.session.plan_generation_pending() {
        info!("Cancelling the in-flight plan generation.");
    }
    planner.cancel_plan();
    planner.session.abandon_plan_generation();
}

/// Fetches alternatives for one meal and opens the swap.
pub async fn fetch_alternatives(app_state: Arc<AppState>, key: SwapKey) -> PlanResult<SwapOutcome> {
    let (ticket, request, token) = {
        let mut planner = app_state.planner.lock().await;
        let Some((ticket, request)) = planner.session.begin_swap(key.clone())? else {
            return Ok(SwapOutcome::DayNotFound);
        };
        let token = planner.replace_swap_token();
        (ticket, request, token)
    };

    let Some(outcome) = call_provider(&app_state, &request, &token).await else {
        info!("Alternatives for {} were dismissed.", key);
        return Ok(SwapOutcome::Superseded);
    };

    let mut planner = app_state.planner.lock().await;
    match planner.session.complete_swap(&key, ticket, outcome)? {
        Completion::Applied => Ok(SwapOutcome::Opened(
            planner
                .session
                .open_swap()
                .map(|open| open.alternatives.clone())
                .unwrap_or_default(),
        )),
        Completion::Stale => Ok(SwapOutcome::Superseded),
    }
}

/// Closes the open swap and drops any alternatives still on their way.
pub async fn dismiss_swap(app_state: &AppState) {
    let mut planner = app_state.planner.lock().await;
    planner.cancel_swap();
    planner.session.dismiss_swap();
}

/// Awaits the provider under the configured timeout. `None` means the token was
/// cancelled first.
async fn call_provider(
    app_state: &AppState,
    request: &ProviderRequest,
    token: &CancellationToken,
) -> Option<PlanResult<String>> {
    let timeout = app_state.config.provider_timeout;
    tokio::select! {
        _ = token.cancelled() => None,
        result = tokio::time::timeout(timeout, app_state.provider.generate(request)) => {
            Some(result.unwrap_or_else(|_| {
                warn!("Provider did not answer within {:?}.", timeout);
                Err(PlanError::ProviderUnavailable(format!(
                    "no response within {} seconds",
                    timeout.as_secs_f64()
                )))
            }))
        }
    }
}
