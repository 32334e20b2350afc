//! crates/meal_plan_core/src/request.rs
//!
//! Maps profiles into the generation provider's request shape and maps its JSON
//! responses back into domain types.
//!
//! Parsing is the trust boundary: anything that comes out of here satisfies the
//! seven-day / two-person / four-slot shape the plan state relies on.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::domain::{
    DayPlan, GeneratedPlan, Goal, MacroTargets, Macros, Meal, MealSlot, ShoppingCategory,
    ShoppingItem, WeekPlan,
};
use crate::ports::{PlanError, PlanResult};
use crate::profile::PersonProfile;

/// How many alternatives a swap asks for.
pub const ALTERNATIVE_COUNT: u8 = 3;

//=========================================================================================
// Request Shapes
//=========================================================================================

/// One person's targets as the provider sees them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonTargets {
    pub goal: Goal,
    pub daily_calories: u32,
    pub macros: MacroTargets,
    /// Empty means no restrictions.
    pub dietary_restrictions: Vec<String>,
}

impl From<&PersonProfile> for PersonTargets {
    fn from(profile: &PersonProfile) -> Self {
        Self {
            goal: profile.goal(),
            daily_calories: profile.daily_calories(),
            macros: profile.macros(),
            dietary_restrictions: profile.dietary_restrictions().iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRequest {
    pub her: PersonTargets,
    pub his: PersonTargets,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativesRequest {
    pub person: PersonTargets,
    pub meal_slot: MealSlot,
    /// The meal the alternatives should differ from.
    pub original_meal_name: String,
    /// Rounded macros of the original meal; alternatives should land close to these.
    pub target_macros: Macros,
    pub count: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProviderRequest {
    WeeklyPlan(PlanRequest),
    MealAlternatives(AlternativesRequest),
}

pub fn build_plan_request(her: &PersonProfile, his: &PersonProfile) -> ProviderRequest {
    ProviderRequest::WeeklyPlan(PlanRequest {
        her: her.into(),
        his: his.into(),
    })
}

pub fn build_alternatives_request(
    profile: &PersonProfile,
    meal_slot: MealSlot,
    original_meal: &Meal,
) -> ProviderRequest {
    let m = original_meal.macros;
    ProviderRequest::MealAlternatives(AlternativesRequest {
        person: profile.into(),
        meal_slot,
        original_meal_name: original_meal.name.clone(),
        target_macros: Macros {
            calories: m.calories.round(),
            protein: m.protein.round(),
            carbs: m.carbs.round(),
            fat: m.fat.round(),
        },
        count: ALTERNATIVE_COUNT,
    })
}

//=========================================================================================
// Response Parsing
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlan {
    week_plan: Vec<DayPlan>,
    shopping_list: Vec<RawCategory>,
    tips: Vec<String>,
}

#[derive(Deserialize)]
struct RawCategory {
    category: String,
    items: Vec<RawItem>,
}

// Any `id`/`checked` the provider sends is ignored.
#[derive(Deserialize)]
struct RawItem {
    name: String,
    quantity: String,
}

/// Parses a full plan response.
///
/// # Errors
///
/// [`PlanError::MalformedProviderResponse`] when the JSON is missing a day, a person,
/// a meal slot or a macro field, or when the days are not seven distinct weekdays.
pub fn parse_plan_response(raw: &str) -> PlanResult<GeneratedPlan> {
    let parsed: RawPlan = serde_json::from_str(raw)
        .map_err(|e| PlanError::MalformedProviderResponse(e.to_string()))?;

    let week_plan = WeekPlan::new(parsed.week_plan)?;
    let shopping_list = assign_shopping_ids(parsed.shopping_list);

    Ok(GeneratedPlan {
        week_plan,
        shopping_list,
        tips: parsed.tips,
    })
}

/// Parses an alternatives response: a JSON array of meals, or an object holding one
/// under `alternatives`. An empty list is a valid answer.
pub fn parse_alternatives_response(raw: &str) -> PlanResult<Vec<Meal>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| PlanError::MalformedProviderResponse(e.to_string()))?;

    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("alternatives") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(PlanError::MalformedProviderResponse(
                    "expected an `alternatives` array".to_string(),
                ))
            }
        },
        _ => {
            return Err(PlanError::MalformedProviderResponse(
                "expected a list of meals".to_string(),
            ))
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let meal: Meal = serde_json::from_value(entry).map_err(|e| {
                PlanError::MalformedProviderResponse(format!("alternative {}: {}", index, e))
            })?;
            let m = meal.macros;
            if [m.calories, m.protein, m.carbs, m.fat]
                .iter()
                .any(|v| !v.is_finite() || *v < 0.0)
            {
                return Err(PlanError::MalformedProviderResponse(format!(
                    "alternative {} has negative or non-numeric macros",
                    index
                )));
            }
            Ok(meal)
        })
        .collect()
}

/// Gives every item an id built from its category and name, adding `-2`, `-3`, ... when
/// that id is already taken. Repeated category labels are folded into the first one.
fn assign_shopping_ids(categories: Vec<RawCategory>) -> Vec<ShoppingCategory> {
    let mut taken = HashSet::new();
    let mut list: Vec<ShoppingCategory> = Vec::with_capacity(categories.len());

    for raw in categories {
        let index = match list.iter().position(|c| c.category == raw.category) {
            Some(index) => index,
            None => {
                list.push(ShoppingCategory {
                    category: raw.category.clone(),
                    items: Vec::with_capacity(raw.items.len()),
                });
                list.len() - 1
            }
        };

        for item in raw.items {
            let base = format!("{}-{}", slug(&raw.category), slug(&item.name));
            let mut id = base.clone();
            let mut n = 2;
            while !taken.insert(id.clone()) {
                id = format!("{}-{}", base, n);
                n += 1;
            }
            list[index].items.push(ShoppingItem {
                id,
                name: item.name,
                quantity: item.quantity,
                checked: false,
            });
        }
    }

    list
}

fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("item");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slug("Greek Yogurt (plain)"), "greek-yogurt-plain");
        assert_eq!(slug("  Olive   Oil! "), "olive-oil");
        assert_eq!(slug("!!!"), "item");
    }

    #[test]
    fn repeated_names_get_numbered_ids() {
        let list = assign_shopping_ids(vec![RawCategory {
            category: "Produce".into(),
            items: vec![
                RawItem {
                    name: "Spinach".into(),
                    quantity: "1 bag".into(),
                },
                RawItem {
                    name: "spinach".into(),
                    quantity: "2 bags".into(),
                },
                RawItem {
                    name: "Spinach 2".into(),
                    quantity: "1 bunch".into(),
                },
            ],
        }]);
        let ids: Vec<&str> = list[0].items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["produce-spinach", "produce-spinach-2", "produce-spinach-2-2"]);
        assert!(list[0].items.iter().all(|i| !i.checked));
    }

    #[test]
    fn repeated_categories_are_merged() {
        let list = assign_shopping_ids(vec![
            RawCategory {
                category: "Dairy".into(),
                items: vec![RawItem {
                    name: "Milk".into(),
                    quantity: "1 gal".into(),
                }],
            },
            RawCategory {
                category: "Pantry".into(),
                items: vec![],
            },
            RawCategory {
                category: "Dairy".into(),
                items: vec![RawItem {
                    name: "Eggs".into(),
                    quantity: "12".into(),
                }],
            },
        ]);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].items.len(), 2);
        assert_eq!(list[0].items[1].id, "dairy-eggs");
    }

    #[test]
    fn alternatives_accept_bare_and_wrapped_lists() {
        let meal = r#"{"name":"Oats","description":"Rolled oats\nBerries","macros":{"calories":410.5,"protein":20,"carbs":55,"fat":9}}"#;
        let bare = parse_alternatives_response(&format!("[{}]", meal)).unwrap();
        let wrapped =
            parse_alternatives_response(&format!(r#"{{"alternatives":[{}]}}"#, meal)).unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare[0].description, "Rolled oats\nBerries");
    }

    #[test]
    fn no_alternatives_is_not_an_error() {
        assert!(parse_alternatives_response("[]").unwrap().is_empty());
        assert!(parse_alternatives_response(r#"{"alternatives":[]}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn alternative_without_macros_is_malformed() {
        let err = parse_alternatives_response(r#"[{"name":"Oats","description":"x"}]"#)
            .unwrap_err();
        assert!(matches!(err, PlanError::MalformedProviderResponse(_)));
    }

    #[test]
    fn alternatives_must_be_a_list() {
        assert!(matches!(
            parse_alternatives_response(r#""three meals""#),
            Err(PlanError::MalformedProviderResponse(_))
        ));
        assert!(matches!(
            parse_alternatives_response("not json"),
            Err(PlanError::MalformedProviderResponse(_))
        ));
    }
}
