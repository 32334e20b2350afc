//! Shared fixtures for the api integration tests: a scripted in-memory provider and
//! an `AppState` wired to it.

#![allow(dead_code)]

use api_lib::{config::Config, web::state::AppState};
use async_trait::async_trait;
use meal_plan_core::{
    ActivityLevel, Gender, GenerationProvider, Goal, PersonProfile, PlanError, PlanResult,
    PlannerSession, ProfileInput, ProviderRequest, SavedSettings, Settings, UnitSystem,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

//=========================================================================================
// Scripted Provider
//=========================================================================================

/// One scripted provider answer, returned after `delay`.
pub struct Reply {
    pub delay: Duration,
    pub result: PlanResult<String>,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(body.to_string()),
        }
    }

    pub fn err(error: PlanError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Answers from a script, one reply per call. Once the script runs out it answers
/// plans with `plan_json("default")` and alternatives with `alternatives_json()`.
#[derive(Default)]
pub struct FakeProvider {
    script: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl FakeProvider {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for FakeProvider {
    async fn generate(&self, request: &ProviderRequest) -> PlanResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        let reply = next.unwrap_or_else(|| match request {
            ProviderRequest::WeeklyPlan(_) => Reply::ok(plan_json("default")),
            ProviderRequest::MealAlternatives(_) => Reply::ok(alternatives_json()),
        });
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

//=========================================================================================
// Provider Payloads
//=========================================================================================

fn meal_json(name: String, calories: f64) -> Value {
    json!({
        "name": name,
        "description": "Main ingredients\nSide",
        "macros": { "calories": calories, "protein": 30, "carbs": 40, "fat": 12 }
    })
}

fn person_json(tag: &str, day: &str, who: &str) -> Value {
    json!({
        "breakfast": meal_json(format!("{} {} {} breakfast", tag, day, who), 400.0),
        "lunch": meal_json(format!("{} {} {} lunch", tag, day, who), 600.0),
        "snack": meal_json(format!("{} {} {} snack", tag, day, who), 200.0),
        "dinner": meal_json(format!("{} {} {} dinner", tag, day, who), 700.0),
    })
}

/// A valid plan response whose meal names start with `tag`.
pub fn plan_json(tag: &str) -> Value {
    let days: Vec<Value> = WEEKDAYS
        .iter()
        .map(|day| {
            json!({
                "day": day,
                "meals": { "her": person_json(tag, day, "her"), "his": person_json(tag, day, "his") },
                "workout": "Tonal Upper Body Strength"
            })
        })
        .collect();
    json!({
        "weekPlan": days,
        "shoppingList": [
            { "category": "Produce", "items": [
                { "name": "Spinach", "quantity": "2 bags" },
                { "name": "Lemons", "quantity": "4" }
            ] },
            { "category": "Meat", "items": [ { "name": "Chicken Breast", "quantity": "3 lbs" } ] }
        ],
        "tips": [format!("{} tip", tag)]
    })
}

pub fn alternatives_json() -> Value {
    json!([
        meal_json("Shakshuka".to_string(), 410.0),
        meal_json("Protein pancakes".to_string(), 395.0),
        meal_json("Egg muffins".to_string(), 402.0)
    ])
}

//=========================================================================================
// App State
//=========================================================================================

pub fn saved_settings() -> SavedSettings {
    let mut her = ProfileInput::onboarding_default("Ana", Gender::Female);
    her.goal = Goal::Lose;
    let his = ProfileInput {
        name: "Ben".to_string(),
        gender: Gender::Male,
        age: 30,
        weight: 80.0,
        height: 180.0,
        activity_level: ActivityLevel::Moderate,
        goal: Goal::Maintain,
        dietary_restrictions: Default::default(),
    };
    SavedSettings {
        unit_system: UnitSystem::Metric,
        her: PersonProfile::new(her).unwrap(),
        his: PersonProfile::new(his).unwrap(),
    }
}

pub fn test_config(timeout: Duration) -> Config {
    let mut config = Config::from_lookup(|key| match key {
        "GEMINI_API_KEY" => Some("test-key".to_string()),
        _ => None,
    })
    .unwrap();
    config.provider_timeout = timeout;
    config
}

/// App state with both profiles set up and no plan loaded yet.
pub fn app_state(provider: Arc<FakeProvider>) -> Arc<AppState> {
    Arc::new(AppState::new(
        Arc::new(test_config(Duration::from_secs(5))),
        provider,
        PlannerSession::from_saved(saved_settings()),
    ))
}

/// App state before onboarding.
pub fn empty_app_state(provider: Arc<FakeProvider>) -> Arc<AppState> {
    Arc::new(AppState::new(
        Arc::new(test_config(Duration::from_secs(5))),
        provider,
        PlannerSession::new(Settings::default()),
    ))
}
