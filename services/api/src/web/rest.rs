//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    planner::{self, PlanOutcome, SwapOutcome},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Datelike;
use meal_plan_core::{
    session::DaySummary, Meal, MealSlot, Person, PersonProfile, PlanError, PlannerSession,
    ProfileDisplay, ProfileUpdate, SavedSettings, ShoppingCategory, SwapKey, UnitSystem,
    WeekPlan,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

type HandlerError = (StatusCode, String);

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_settings_handler,
        put_settings_handler,
        update_profile_handler,
        profile_display_handler,
        generate_plan_handler,
        cancel_generation_handler,
        get_plan_handler,
        day_summary_handler,
        open_swap_handler,
        confirm_swap_handler,
        dismiss_swap_handler,
        toggle_item_handler,
    ),
    components(
        schemas(SettingsPayload, PlanResponse, SwapRequest, ConfirmSwapRequest, SwapResponse, ProfileUpdateBody, ToggleResponse)
    ),
    tags(
        (name = "Meal Planner API", description = "Weekly meal plans for two people with individual nutrition targets.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The unit system and both profiles. Derived targets in a request body are ignored
/// and re-computed from the biometrics.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    #[serde(default)]
    #[schema(value_type = String, example = "imperial")]
    pub unit_system: UnitSystem,
    #[schema(value_type = Object)]
    pub her: PersonProfile,
    #[schema(value_type = Object)]
    pub his: PersonProfile,
}

impl From<SavedSettings> for SettingsPayload {
    fn from(saved: SavedSettings) -> Self {
        Self {
            unit_system: saved.unit_system,
            her: saved.her,
            his: saved.his,
        }
    }
}

impl From<SettingsPayload> for SavedSettings {
    fn from(payload: SettingsPayload) -> Self {
        Self {
            unit_system: payload.unit_system,
            her: payload.her,
            his: payload.his,
        }
    }
}

/// The current plan with the read-only values a client needs to render it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    #[schema(value_type = Option<Vec<Object>>)]
    pub week_plan: Option<WeekPlan>,
    #[schema(value_type = Vec<Object>)]
    pub shopping_list: Vec<ShoppingCategory>,
    pub tips: Vec<String>,
    /// Today's weekday if the plan has it, otherwise the first day.
    pub selected_day: Option<String>,
    pub shopping_checked: usize,
    pub shopping_total: usize,
    pub generation_pending: bool,
}

impl PlanResponse {
    fn from_session(session: &PlannerSession) -> Self {
        let plan = session.plan();
        let (shopping_checked, shopping_total) = plan.shopping_progress();
        Self {
            week_plan: plan.week_plan().cloned(),
            shopping_list: plan.shopping_list().to_vec(),
            tips: plan.tips().to_vec(),
            selected_day: session
                .default_selected_day(chrono::Local::now().weekday())
                .map(str::to_string),
            shopping_checked,
            shopping_total,
            generation_pending: session.plan_generation_pending(),
        }
    }
}

/// Identifies the meal to swap.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub day: String,
    #[schema(value_type = String, example = "her")]
    pub person: Person,
    #[schema(value_type = String, example = "lunch")]
    pub slot: MealSlot,
}

impl From<SwapRequest> for SwapKey {
    fn from(request: SwapRequest) -> Self {
        Self {
            day: request.day,
            person: request.person,
            slot: request.slot,
        }
    }
}

/// Picks one of the alternatives offered for the open swap.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmSwapRequest {
    pub day: String,
    #[schema(value_type = String, example = "her")]
    pub person: Person,
    #[schema(value_type = String, example = "lunch")]
    pub slot: MealSlot,
    /// Index into the offered alternatives.
    pub choice: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    pub day: String,
    #[schema(value_type = String)]
    pub person: Person,
    #[schema(value_type = String)]
    pub slot: MealSlot,
    #[schema(value_type = Vec<Object>)]
    pub alternatives: Vec<Meal>,
}

/// Documents the shape of a profile edit, e.g. `{"field": "goal", "value": "gain"}` or
/// `{"field": "weight", "value": {"unit": "lbs", "amount": 176}}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileUpdateBody {
    #[schema(example = "goal")]
    pub field: String,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub category: String,
    pub item_id: String,
    pub checked: bool,
}

//=========================================================================================
// Error Mapping
//=========================================================================================

fn plan_error_response(e: PlanError) -> HandlerError {
    let status = match e {
        PlanError::InvalidProfile(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PlanError::MalformedProviderResponse(_) | PlanError::ProviderUnavailable(_) => {
            StatusCode::BAD_GATEWAY
        }
    };
    (status, e.to_string())
}

fn parse_person(raw: &str) -> Result<Person, HandlerError> {
    match raw.to_ascii_lowercase().as_str() {
        "her" => Ok(Person::Her),
        "his" => Ok(Person::His),
        _ => Err((StatusCode::NOT_FOUND, format!("Unknown person '{}'", raw))),
    }
}

fn not_onboarded() -> HandlerError {
    (
        StatusCode::NOT_FOUND,
        "Profiles have not been set up yet".to_string(),
    )
}

//=========================================================================================
// Settings and Profiles
//=========================================================================================

/// Get the unit system and both profiles.
#[utoipa::path(
    get,
    path = "/settings",
    responses(
        (status = 200, description = "Current settings", body = SettingsPayload),
        (status = 404, description = "Profiles have not been set up yet")
    )
)]
pub async fn get_settings_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<SettingsPayload>, HandlerError> {
    let planner = app_state.planner.lock().await;
    planner
        .session
        .saved_settings()
        .map(|saved| Json(saved.into()))
        .ok_or_else(not_onboarded)
}

/// Replace the unit system and both profiles, then start a new plan generation.
#[utoipa::path(
    put,
    path = "/settings",
    request_body = SettingsPayload,
    responses(
        (status = 202, description = "Settings saved; a new plan is being generated", body = SettingsPayload),
        (status = 422, description = "A profile is invalid")
    )
)]
pub async fn put_settings_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<SettingsPayload>,
) -> Result<impl IntoResponse, HandlerError> {
    let saved = {
        let mut planner = app_state.planner.lock().await;
        planner.session.save_settings(payload.into());
        planner.session.saved_settings().ok_or_else(not_onboarded)?
    };

    planner::spawn_generation(app_state.clone());

    Ok((StatusCode::ACCEPTED, Json(SettingsPayload::from(saved))))
}

/// Edit one field of a person's profile.
///
/// The body is a tagged update such as `{"field": "goal", "value": "gain"}`.
#[utoipa::path(
    patch,
    path = "/profiles/{person}",
    request_body = ProfileUpdateBody,
    params(
        ("person" = String, Path, description = "`her` or `his`")
    ),
    responses(
        (status = 200, description = "The updated profile with re-derived targets"),
        (status = 404, description = "Unknown person or profiles not set up"),
        (status = 422, description = "The edit would make the profile invalid")
    )
)]
pub async fn update_profile_handler(
    State(app_state): State<Arc<AppState>>,
    Path(person): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<PersonProfile>, HandlerError> {
    let person = parse_person(&person)?;
    let mut planner = app_state.planner.lock().await;
    if planner.session.profiles().is_none() {
        return Err(not_onboarded());
    }
    let profile = planner
        .session
        .update_profile(person, update)
        .map_err(plan_error_response)?;
    Ok(Json(profile.clone()))
}

/// Get a person's profile converted to the active unit system.
#[utoipa::path(
    get,
    path = "/profiles/{person}/display",
    params(
        ("person" = String, Path, description = "`her` or `his`")
    ),
    responses(
        (status = 200, description = "Display view of the profile"),
        (status = 404, description = "Unknown person or profiles not set up")
    )
)]
pub async fn profile_display_handler(
    State(app_state): State<Arc<AppState>>,
    Path(person): Path<String>,
) -> Result<Json<ProfileDisplay>, HandlerError> {
    let person = parse_person(&person)?;
    let planner = app_state.planner.lock().await;
    planner
        .session
        .profile_display(person)
        .map(Json)
        .ok_or_else(not_onboarded)
}

//=========================================================================================
// Plan
//=========================================================================================

/// Generate a new weekly plan and shopping list for both profiles.
///
/// Starting a generation supersedes any generation still in flight.
#[utoipa::path(
    post,
    path = "/plan/generate",
    responses(
        (status = 200, description = "The new plan", body = PlanResponse),
        (status = 409, description = "A newer generation superseded this one"),
        (status = 422, description = "Profiles are missing or invalid"),
        (status = 502, description = "The provider failed or returned an unusable plan")
    )
)]
pub async fn generate_plan_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<PlanResponse>, HandlerError> {
    match planner::generate_plan(app_state.clone()).await {
        Ok(PlanOutcome::Applied) => {
            let planner = app_state.planner.lock().await;
            Ok(Json(PlanResponse::from_session(&planner.session)))
        }
        Ok(PlanOutcome::Superseded) => Err((
            StatusCode::CONFLICT,
            "A newer plan generation superseded this one".to_string(),
        )),
        Err(e) => {
            error!("Failed to generate plan: {}", e);
            Err(plan_error_response(e))
        }
    }
}

/// Cancel the in-flight plan generation.
///
/// The current plan is kept. A waiting `POST /plan/generate` answers 409.
#[utoipa::path(
    delete,
    path = "/plan/generate",
    responses(
        (status = 204, description = "No generation is in flight any more")
    )
)]
pub async fn cancel_generation_handler(State(app_state): State<Arc<AppState>>) -> StatusCode {
    planner::cancel_generation(&app_state).await;
    StatusCode::NO_CONTENT
}

/// Get the current plan.
#[utoipa::path(
    get,
    path = "/plan",
    responses(
        (status = 200, description = "The current plan; `weekPlan` is null before the first generation", body = PlanResponse)
    )
)]
pub async fn get_plan_handler(State(app_state): State<Arc<AppState>>) -> Json<PlanResponse> {
    let planner = app_state.planner.lock().await;
    Json(PlanResponse::from_session(&planner.session))
}

/// Get each person's macro totals for one day next to their targets.
#[utoipa::path(
    get,
    path = "/plan/days/{day}/summary",
    params(
        ("day" = String, Path, description = "Day label as it appears in the plan")
    ),
    responses(
        (status = 200, description = "Daily totals and targets"),
        (status = 404, description = "Day not in the current plan")
    )
)]
pub async fn day_summary_handler(
    State(app_state): State<Arc<AppState>>,
    Path(day): Path<String>,
) -> Result<Json<DaySummary>, HandlerError> {
    let planner = app_state.planner.lock().await;
    planner
        .session
        .day_summary(&day)
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("No plan for day '{}'", day)))
}

//=========================================================================================
// Meal Swaps
//=========================================================================================

/// Fetch alternatives for one meal and open a swap for it.
#[utoipa::path(
    post,
    path = "/plan/swaps",
    request_body = SwapRequest,
    responses(
        (status = 200, description = "Alternatives for the meal", body = SwapResponse),
        (status = 404, description = "Day not in the current plan"),
        (status = 409, description = "The swap was dismissed or replaced first"),
        (status = 502, description = "The provider failed or returned unusable alternatives")
    )
)]
pub async fn open_swap_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<SwapRequest>,
) -> Result<Json<SwapResponse>, HandlerError> {
    let key = SwapKey::from(request);
    match planner::fetch_alternatives(app_state, key.clone()).await {
        Ok(SwapOutcome::Opened(alternatives)) => Ok(Json(SwapResponse {
            day: key.day,
            person: key.person,
            slot: key.slot,
            alternatives,
        })),
        Ok(SwapOutcome::DayNotFound) => Err((
            StatusCode::NOT_FOUND,
            format!("No plan for day '{}'", key.day),
        )),
        Ok(SwapOutcome::Superseded) => Err((
            StatusCode::CONFLICT,
            format!("Swap {} was dismissed or replaced", key),
        )),
        Err(e) => {
            error!("Failed to fetch alternatives for {}: {}", key, e);
            Err(plan_error_response(e))
        }
    }
}

/// Replace the meal with one of the offered alternatives.
#[utoipa::path(
    post,
    path = "/plan/swaps/confirm",
    request_body = ConfirmSwapRequest,
    responses(
        (status = 200, description = "The updated plan", body = PlanResponse),
        (status = 404, description = "No matching open swap or no such alternative")
    )
)]
pub async fn confirm_swap_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ConfirmSwapRequest>,
) -> Result<Json<PlanResponse>, HandlerError> {
    let key = SwapKey {
        day: request.day,
        person: request.person,
        slot: request.slot,
    };
    let mut planner = app_state.planner.lock().await;
    if !planner.session.confirm_swap(&key, request.choice) {
        return Err((
            StatusCode::NOT_FOUND,
            format!("No alternative {} open for {}", request.choice, key),
        ));
    }
    info!("Swapped {} for alternative {}.", key, request.choice);
    Ok(Json(PlanResponse::from_session(&planner.session)))
}

/// Close the open swap. Alternatives that arrive later are discarded.
#[utoipa::path(
    delete,
    path = "/plan/swaps",
    responses(
        (status = 204, description = "Swap dismissed")
    )
)]
pub async fn dismiss_swap_handler(State(app_state): State<Arc<AppState>>) -> StatusCode {
    planner::dismiss_swap(&app_state).await;
    StatusCode::NO_CONTENT
}

//=========================================================================================
// Shopping List
//=========================================================================================

/// Check or uncheck one shopping-list item.
#[utoipa::path(
    post,
    path = "/shopping/{category}/items/{item_id}/toggle",
    params(
        ("category" = String, Path, description = "Category label"),
        ("item_id" = String, Path, description = "Item identifier")
    ),
    responses(
        (status = 200, description = "The item's new state", body = ToggleResponse),
        (status = 404, description = "No such item in that category")
    )
)]
pub async fn toggle_item_handler(
    State(app_state): State<Arc<AppState>>,
    Path((category, item_id)): Path<(String, String)>,
) -> Result<Json<ToggleResponse>, HandlerError> {
    let mut planner = app_state.planner.lock().await;
    match planner.session.toggle_shopping_item(&category, &item_id) {
        Some(checked) => Ok(Json(ToggleResponse {
            category,
            item_id,
            checked,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("No item '{}' in '{}'", item_id, category),
        )),
    }
}
