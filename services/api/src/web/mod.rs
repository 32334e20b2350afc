pub mod planner;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use rest::{
    cancel_generation_handler, confirm_swap_handler, day_summary_handler, dismiss_swap_handler,
    generate_plan_handler, get_plan_handler, get_settings_handler, open_swap_handler,
    profile_display_handler, put_settings_handler, toggle_item_handler, update_profile_handler,
};
use state::AppState;

/// Builds the planner's API router. CORS and the Swagger UI are layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/settings", get(get_settings_handler).put(put_settings_handler))
        .route("/profiles/{person}", patch(update_profile_handler))
        .route("/profiles/{person}/display", get(profile_display_handler))
        .route("/plan", get(get_plan_handler))
        .route(
            "/plan/generate",
            post(generate_plan_handler).delete(cancel_generation_handler),
        )
        .route("/plan/days/{day}/summary", get(day_summary_handler))
        .route(
            "/plan/swaps",
            post(open_swap_handler).delete(dismiss_swap_handler),
        )
        .route("/plan/swaps/confirm", post(confirm_swap_handler))
        .route(
            "/shopping/{category}/items/{item_id}/toggle",
            post(toggle_item_handler),
        )
        .with_state(app_state)
}
