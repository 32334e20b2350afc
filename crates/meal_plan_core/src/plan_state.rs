//! crates/meal_plan_core/src/plan_state.rs
//!
//! The current week plan, shopping list and tips: the single source of truth the UI
//! layer reads from.
//!
//! Mutations only ever replace a leaf value (one meal, one `checked` flag). Days and
//! meal slots are never added or removed after a plan is loaded.

use chrono::Weekday;
use serde::Serialize;
use tracing::debug;

use crate::domain::{
    parse_weekday, DayPlan, GeneratedPlan, Macros, Meal, MealSlot, Person, ShoppingCategory,
    WeekPlan,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanState {
    week_plan: Option<WeekPlan>,
    shopping_list: Vec<ShoppingCategory>,
    tips: Vec<String>,
}

impl PlanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole plan, including any shopping checkmarks.
    pub fn load_plan(
        &mut self,
        week_plan: WeekPlan,
        shopping_list: Vec<ShoppingCategory>,
        tips: Vec<String>,
    ) {
        self.week_plan = Some(week_plan);
        self.shopping_list = shopping_list;
        self.tips = tips;
    }

    pub fn load(&mut self, plan: GeneratedPlan) {
        self.load_plan(plan.week_plan, plan.shopping_list, plan.tips);
    }

    pub fn is_loaded(&self) -> bool {
        self.week_plan.is_some()
    }

    pub fn week_plan(&self) -> Option<&WeekPlan> {
        self.week_plan.as_ref()
    }

    pub fn shopping_list(&self) -> &[ShoppingCategory] {
        &self.shopping_list
    }

    pub fn tips(&self) -> &[String] {
        &self.tips
    }

    pub fn day(&self, day: &str) -> Option<&DayPlan> {
        self.week_plan.as_ref().and_then(|plan| plan.day(day))
    }

    /// Day labels in plan order.
    pub fn days(&self) -> Vec<&str> {
        self.week_plan
            .as_ref()
            .map(|plan| plan.days().iter().map(|d| d.day.as_str()).collect())
            .unwrap_or_default()
    }

    /// Replaces exactly one meal. Returns `false` (and changes nothing) when the day is
    /// not part of the current plan.
    pub fn swap_meal(&mut self, day: &str, person: Person, slot: MealSlot, meal: Meal) -> bool {
        let Some(day_plan) = self.week_plan.as_mut().and_then(|plan| plan.day_mut(day)) else {
            debug!("Ignoring swap for '{}': day not in the current plan.", day);
            return false;
        };
        *day_plan.meals.person_mut(person).meal_mut(slot) = meal;
        true
    }

    /// Flips one item's `checked` flag and returns the new value, or `None` when the
    /// category or item does not exist.
    pub fn toggle_shopping_item(&mut self, category: &str, item_id: &str) -> Option<bool> {
        let item = self
            .shopping_list
            .iter_mut()
            .find(|c| c.category == category)
            .and_then(|c| c.items.iter_mut().find(|i| i.id == item_id));

        match item {
            Some(item) => {
                item.checked = !item.checked;
                Some(item.checked)
            }
            None => {
                debug!(
                    "Ignoring toggle for '{}' in '{}': no such item.",
                    item_id, category
                );
                None
            }
        }
    }

    /// Sum of one person's four meals on one day.
    pub fn daily_totals(&self, day: &str, person: Person) -> Option<Macros> {
        self.day(day).map(|d| d.meals.person(person).totals())
    }

    /// Today's day when the plan has it, otherwise the plan's first day.
    pub fn default_selected_day(&self, today: Weekday) -> Option<&str> {
        let plan = self.week_plan.as_ref()?;
        plan.days()
            .iter()
            .find(|d| parse_weekday(&d.day) == Some(today))
            .or_else(|| plan.days().first())
            .map(|d| d.day.as_str())
    }

    /// `(checked, total)` across every category.
    pub fn shopping_progress(&self) -> (usize, usize) {
        self.shopping_list
            .iter()
            .flat_map(|c| c.items.iter())
            .fold((0, 0), |(checked, total), item| {
                (checked + usize::from(item.checked), total + 1)
            })
    }
}
