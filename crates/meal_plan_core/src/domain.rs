//! crates/meal_plan_core/src/domain.rs
//!
//! Defines the pure, core data structures for the meal planner.
//! Field names serialize as camelCase so the same types travel to the provider and the
//! web layer unchanged.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use crate::ports::{PlanError, PlanResult};

/// Number of days a generated plan must cover.
pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Goal::Lose => "lose",
            Goal::Maintain => "maintain",
            Goal::Gain => "gain",
        };
        f.write_str(label)
    }
}

/// The unit system used for display and entry. Storage is always metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Imperial,
    Metric,
}

/// Immutable display configuration, passed explicitly to every conversion call site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub unit_system: UnitSystem,
}

/// One of the two people sharing the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Person {
    Her,
    His,
}

impl Person {
    pub const ALL: [Person; 2] = [Person::Her, Person::His];
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Person::Her => "her",
            Person::His => "his",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
}

impl MealSlot {
    /// Display order within a day.
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Snack,
        MealSlot::Dinner,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Snack => "Snack",
            MealSlot::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Energy and macronutrient content. Calories may be a fractional aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Macros {
    fn is_valid(&self) -> bool {
        [self.calories, self.protein, self.carbs, self.fat]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl Add for Macros {
    type Output = Macros;

    fn add(self, rhs: Macros) -> Macros {
        Macros {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl<'a> Sum<&'a Macros> for Macros {
    fn sum<I: Iterator<Item = &'a Macros>>(iter: I) -> Macros {
        iter.fold(Macros::default(), |acc, m| acc + *m)
    }
}

/// Integral macro gram targets derived for a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionTargets {
    pub daily_calories: u32,
    pub macros: MacroTargets,
}

/// A single meal as produced by the provider. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    pub description: String,
    pub macros: Macros,
}

/// The four meal slots of one person for one day. Every slot is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonMeals {
    pub breakfast: Meal,
    pub lunch: Meal,
    pub snack: Meal,
    pub dinner: Meal,
}

impl PersonMeals {
    pub fn meal(&self, slot: MealSlot) -> &Meal {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Snack => &self.snack,
            MealSlot::Dinner => &self.dinner,
        }
    }

    pub(crate) fn meal_mut(&mut self, slot: MealSlot) -> &mut Meal {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Snack => &mut self.snack,
            MealSlot::Dinner => &mut self.dinner,
        }
    }

    /// Meals in display order.
    pub fn iter(&self) -> impl Iterator<Item = (MealSlot, &Meal)> {
        MealSlot::ALL.into_iter().map(move |slot| (slot, self.meal(slot)))
    }

    /// Sum of the four meals' macros.
    pub fn totals(&self) -> Macros {
        self.iter().map(|(_, meal)| &meal.macros).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayMeals {
    pub her: PersonMeals,
    pub his: PersonMeals,
}

impl DayMeals {
    pub fn person(&self, person: Person) -> &PersonMeals {
        match person {
            Person::Her => &self.her,
            Person::His => &self.his,
        }
    }

    pub(crate) fn person_mut(&mut self, person: Person) -> &mut PersonMeals {
        match person {
            Person::Her => &mut self.her,
            Person::His => &mut self.his,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: String,
    pub meals: DayMeals,
    pub workout: String,
}

impl DayPlan {
    pub fn meal(&self, person: Person, slot: MealSlot) -> &Meal {
        self.meals.person(person).meal(slot)
    }
}

/// Seven day plans, one per weekday, in provider order.
///
/// Only constructible through [`WeekPlan::new`], so a value of this type always holds
/// exactly seven distinct weekdays with four slots per person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DayPlan>", into = "Vec<DayPlan>")]
pub struct WeekPlan {
    days: Vec<DayPlan>,
}

impl WeekPlan {
    pub fn new(days: Vec<DayPlan>) -> PlanResult<Self> {
        if days.len() != DAYS_PER_WEEK {
            return Err(PlanError::MalformedProviderResponse(format!(
                "expected {} days in the week plan, got {}",
                DAYS_PER_WEEK,
                days.len()
            )));
        }

        let mut seen = HashSet::new();
        for day in &days {
            let weekday = parse_weekday(&day.day).ok_or_else(|| {
                PlanError::MalformedProviderResponse(format!(
                    "'{}' is not a weekday name",
                    day.day
                ))
            })?;
            if !seen.insert(weekday) {
                return Err(PlanError::MalformedProviderResponse(format!(
                    "weekday '{}' appears more than once",
                    day.day
                )));
            }
            for person in Person::ALL {
                for (slot, meal) in day.meals.person(person).iter() {
                    if !meal.macros.is_valid() {
                        return Err(PlanError::MalformedProviderResponse(format!(
                            "{} {} for {} has negative or non-numeric macros",
                            day.day, slot, person
                        )));
                    }
                }
            }
        }

        Ok(Self { days })
    }

    pub fn days(&self) -> &[DayPlan] {
        &self.days
    }

    pub fn day(&self, day: &str) -> Option<&DayPlan> {
        self.days.iter().find(|d| d.day == day)
    }

    pub(crate) fn day_mut(&mut self, day: &str) -> Option<&mut DayPlan> {
        self.days.iter_mut().find(|d| d.day == day)
    }
}

impl TryFrom<Vec<DayPlan>> for WeekPlan {
    type Error = PlanError;

    fn try_from(days: Vec<DayPlan>) -> Result<Self, Self::Error> {
        WeekPlan::new(days)
    }
}

impl From<WeekPlan> for Vec<DayPlan> {
    fn from(plan: WeekPlan) -> Self {
        plan.days
    }
}

/// Parses a day label ("Monday", "mon", ...) into a weekday.
pub fn parse_weekday(label: &str) -> Option<Weekday> {
    label.trim().parse::<Weekday>().ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: String,
    pub name: String,
    pub quantity: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingCategory {
    pub category: String,
    pub items: Vec<ShoppingItem>,
}

/// Everything one successful generation produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    pub week_plan: WeekPlan,
    pub shopping_list: Vec<ShoppingCategory>,
    pub tips: Vec<String>,
}
