//! services/api/src/adapters/plan_llm.rs
//!
//! This module contains the adapter for the plan-generating LLM.
//! It implements the `GenerationProvider` port from the `core` crate against any
//! OpenAI-compatible chat-completions endpoint (OpenAI itself or Gemini's
//! OpenAI-compatible API).

use crate::config::ModelSettings;
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use meal_plan_core::{
    request::{AlternativesRequest, PersonTargets, PlanRequest},
    GenerationProvider, PlanError, PlanResult, ProviderRequest,
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

const SYSTEM_INSTRUCTIONS: &str = "You are a nutrition-focused meal planning assistant. \
You respond with a single JSON document that follows the requested shape exactly. \
Do not add commentary, markdown or any text outside the JSON.";

const MEAL_SHAPE: &str = r#"{ "name": string, "description": string (main ingredients; use newline characters for lists), "macros": { "calories": number, "protein": number, "carbs": number, "fat": number } }"#;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerationProvider` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiPlanAdapter {
    client: Client<OpenAIConfig>,
    plan_model: ModelSettings,
    alternatives_model: ModelSettings,
}

impl OpenAiPlanAdapter {
    /// Creates a new `OpenAiPlanAdapter`.
    pub fn new(
        client: Client<OpenAIConfig>,
        plan_model: ModelSettings,
        alternatives_model: ModelSettings,
    ) -> Self {
        Self {
            client,
            plan_model,
            alternatives_model,
        }
    }

    fn model_for(&self, request: &ProviderRequest) -> &ModelSettings {
        match request {
            ProviderRequest::WeeklyPlan(_) => &self.plan_model,
            ProviderRequest::MealAlternatives(_) => &self.alternatives_model,
        }
    }
}

//=========================================================================================
// `GenerationProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerationProvider for OpenAiPlanAdapter {
    /// Sends the rendered prompt and returns the JSON text of the first choice.
    async fn generate(&self, request: &ProviderRequest) -> PlanResult<String> {
        let settings = self.model_for(request);
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_INSTRUCTIONS)
                    .build()
                    .map_err(|e| PlanError::ProviderUnavailable(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(render_prompt(request))
                    .build()
                    .map_err(|e| PlanError::ProviderUnavailable(e.to_string()))?,
            ),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&settings.model)
            .messages(messages)
            .temperature(settings.temperature)
            .n(1)
            .build()
            .map_err(|e| PlanError::ProviderUnavailable(e.to_string()))?;

        debug!("Sending {} request to model '{}'.", request_kind(request), settings.model);

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| PlanError::ProviderUnavailable(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PlanError::MalformedProviderResponse(
                    "Plan LLM response contained no text content.".to_string(),
                )
            })?;

        info!(
            "Received {} response ({} chars).",
            request_kind(request),
            content.len()
        );
        Ok(strip_code_fences(&content).to_string())
    }
}

fn request_kind(request: &ProviderRequest) -> &'static str {
    match request {
        ProviderRequest::WeeklyPlan(_) => "weekly plan",
        ProviderRequest::MealAlternatives(_) => "meal alternatives",
    }
}

//=========================================================================================
// Prompt Rendering
//=========================================================================================

/// Renders a structured provider request into the user prompt.
pub fn render_prompt(request: &ProviderRequest) -> String {
    match request {
        ProviderRequest::WeeklyPlan(plan) => render_plan_prompt(plan),
        ProviderRequest::MealAlternatives(alternatives) => render_alternatives_prompt(alternatives),
    }
}

fn restrictions(targets: &PersonTargets) -> String {
    if targets.dietary_restrictions.is_empty() {
        "None".to_string()
    } else {
        targets.dietary_restrictions.join(", ")
    }
}

fn profile_block(title: &str, targets: &PersonTargets) -> String {
    format!(
        "**{} Profile:**\n\
         - Goal: {}\n\
         - Daily Calories: ~{} kcal\n\
         - Macros: Protein ~{}g, Carbs ~{}g, Fat ~{}g\n\
         - Dietary Restrictions: {}\n",
        title,
        targets.goal,
        targets.daily_calories,
        targets.macros.protein,
        targets.macros.carbs,
        targets.macros.fat,
        restrictions(targets)
    )
}

fn render_plan_prompt(plan: &PlanRequest) -> String {
    format!(
        "Create a comprehensive 7-day meal plan for a couple, \"Her\" and \"His\", based on their profiles. \
The goal is to provide meals they can often cook together, but portioned differently to meet their individual nutritional needs.\n\n\
{her}\n{his}\n\
**Instructions:**\n\
1. Variety: Provide a varied and appealing menu for the week (Monday to Sunday).\n\
2. Shared Meals: Meals should be similar for both, with adjustments in portion sizes or small additions to meet macro targets. The meal description should reflect this.\n\
3. Accuracy: Keep each person's total daily macros as close as possible to their targets.\n\
4. Shopping List: Create one consolidated shopping list for the whole week, grouped into categories such as Produce, Dairy, Meat and Pantry.\n\
5. Tips: Provide 3-5 actionable tips for meal prepping and staying on track.\n\
6. Workouts: Suggest a realistic workout for each day, alternating between activities like Tonal, Peloton, Pickleball or Rest.\n\n\
Respond with JSON of this shape:\n\
{{ \"weekPlan\": [ exactly 7 entries, one per weekday: {{ \"day\": \"Monday\", \"meals\": {{ \"her\": {{ \"breakfast\": MEAL, \"lunch\": MEAL, \"snack\": MEAL, \"dinner\": MEAL }}, \"his\": {{ same four slots }} }}, \"workout\": string }} ], \
\"shoppingList\": [ {{ \"category\": string, \"items\": [ {{ \"name\": string, \"quantity\": string }} ] }} ], \
\"tips\": [ string ] }}\n\
where MEAL is {meal}\n",
        her = profile_block("Her", &plan.her),
        his = profile_block("His", &plan.his),
        meal = MEAL_SHAPE,
    )
}

fn render_alternatives_prompt(request: &AlternativesRequest) -> String {
    let slot = request.meal_slot.label().to_lowercase();
    let m = request.target_macros;
    format!(
        "Generate {count} alternative {slot} options for a person with the following profile:\n\
- Goal: {goal}\n\
- Daily Calories: ~{calories} kcal\n\
- Target {slot} macros: ~{kcal} kcal, P:{p}g, C:{c}g, F:{f}g\n\
- Dietary Restrictions: {restrictions}\n\n\
The original meal was \"{original}\". The alternatives should be different but nutritionally similar.\n\n\
Respond with a JSON array of {count} meals, each shaped as {meal}\n",
        count = request.count,
        slot = slot,
        goal = request.person.goal,
        calories = request.person.daily_calories,
        kcal = m.calories,
        p = m.protein,
        c = m.carbs,
        f = m.fat,
        restrictions = restrictions(&request.person),
        original = request.original_meal_name,
        meal = MEAL_SHAPE,
    )
}

static FENCE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\s*```$").ok());

/// Removes a surrounding markdown code fence (```json ... ```) if the model added one.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(fence_regex) = FENCE_PATTERN.as_ref() else {
        return trimmed;
    };
    fence_regex
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str().trim())
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meal_plan_core::{
        build_alternatives_request, build_plan_request, ActivityLevel, Gender, Goal, Macros,
        Meal, MealSlot, PersonProfile, ProfileInput,
    };

    fn profile(name: &str, gender: Gender, goal: Goal, restriction: Option<&str>) -> PersonProfile {
        let mut input = ProfileInput::onboarding_default(name, gender);
        input.weight = 80.0;
        input.height = 180.0;
        input.activity_level = ActivityLevel::Moderate;
        input.goal = goal;
        if let Some(id) = restriction {
            input.dietary_restrictions.insert(id.to_string());
        }
        PersonProfile::new(input).unwrap()
    }

    #[test]
    fn plan_prompt_lists_both_profiles() {
        let her = profile("Ana", Gender::Female, Goal::Lose, Some("vegetarian"));
        let his = profile("Ben", Gender::Male, Goal::Maintain, None);
        let prompt = render_prompt(&build_plan_request(&her, &his));

        assert!(prompt.contains("**Her Profile:**\n- Goal: lose"));
        assert!(prompt.contains("- Dietary Restrictions: vegetarian"));
        assert!(prompt.contains("- Daily Calories: ~2873 kcal"));
        assert!(prompt.contains("- Dietary Restrictions: None"));
        assert!(prompt.contains("\"weekPlan\""));
        assert!(prompt.contains("Tonal, Peloton, Pickleball or Rest"));
    }

    #[test]
    fn alternatives_prompt_uses_rounded_targets() {
        let his = profile("Ben", Gender::Male, Goal::Gain, None);
        let original = Meal {
            name: "Turkey chili".to_string(),
            description: "Turkey\nBeans".to_string(),
            macros: Macros {
                calories: 702.4,
                protein: 51.6,
                carbs: 60.2,
                fat: 22.5,
            },
        };
        let prompt = render_prompt(&build_alternatives_request(
            &his,
            MealSlot::Dinner,
            &original,
        ));

        assert!(prompt.starts_with("Generate 3 alternative dinner options"));
        assert!(prompt.contains("~702 kcal, P:52g, C:60g, F:23g"));
        assert!(prompt.contains("The original meal was \"Turkey chili\"."));
    }

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  ```\n[]\n```  "), "[]");
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("\n[1, 2]\n"), "[1, 2]");
    }

    #[test]
    fn fence_pattern_compiles_once_and_is_reused() {
        assert!(FENCE_PATTERN.is_some());
        for _ in 0..3 {
            assert_eq!(strip_code_fences("```JSON\r\n{}\r\n```"), "{}");
        }
    }
}
