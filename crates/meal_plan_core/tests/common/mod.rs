//! Shared fixtures for the core integration tests.

#![allow(dead_code)]

use meal_plan_core::{
    ActivityLevel, DayMeals, DayPlan, Gender, Goal, Macros, Meal, MealSlot, PersonMeals,
    PersonProfile, ProfileInput, WeekPlan,
};
use serde_json::{json, Value};
use std::collections::BTreeSet;

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub const SHORT_WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn slot_macros(slot: MealSlot) -> Macros {
    match slot {
        MealSlot::Breakfast => Macros {
            calories: 400.0,
            protein: 30.0,
            carbs: 45.0,
            fat: 12.0,
        },
        MealSlot::Lunch => Macros {
            calories: 600.0,
            protein: 45.0,
            carbs: 60.0,
            fat: 20.0,
        },
        MealSlot::Snack => Macros {
            calories: 200.0,
            protein: 10.0,
            carbs: 20.0,
            fat: 8.0,
        },
        MealSlot::Dinner => Macros {
            calories: 700.5,
            protein: 50.0,
            carbs: 70.0,
            fat: 25.0,
        },
    }
}

pub fn meal(name: &str, slot: MealSlot) -> Meal {
    Meal {
        name: name.to_string(),
        description: format!("{}\nserved warm", name),
        macros: slot_macros(slot),
    }
}

fn person_meals(tag: &str, day: &str, who: &str) -> PersonMeals {
    let m = |slot: MealSlot| meal(&format!("{} {} {} {}", tag, day, who, slot), slot);
    PersonMeals {
        breakfast: m(MealSlot::Breakfast),
        lunch: m(MealSlot::Lunch),
        snack: m(MealSlot::Snack),
        dinner: m(MealSlot::Dinner),
    }
}

pub fn day_plan(tag: &str, day: &str) -> DayPlan {
    DayPlan {
        day: day.to_string(),
        meals: DayMeals {
            her: person_meals(tag, day, "her"),
            his: person_meals(tag, day, "his"),
        },
        workout: format!("{} workout", day),
    }
}

/// A valid week whose meal names all start with `tag`.
pub fn week_plan_labeled(tag: &str, labels: &[&str; 7]) -> WeekPlan {
    WeekPlan::new(labels.iter().map(|day| day_plan(tag, day)).collect()).unwrap()
}

pub fn week_plan(tag: &str) -> WeekPlan {
    week_plan_labeled(tag, &WEEKDAYS)
}

/// Every meal in the week, in a fixed order.
pub fn all_meals(week: &WeekPlan) -> Vec<Meal> {
    week.days()
        .iter()
        .flat_map(|d| [d.meals.her.clone(), d.meals.his.clone()])
        .flat_map(|p| p.iter().map(|(_, m)| m.clone()).collect::<Vec<_>>())
        .collect()
}

/// A provider plan response as JSON, with shopping items named after `tag`.
pub fn plan_response(tag: &str) -> Value {
    json!({
        "weekPlan": serde_json::to_value(week_plan(tag)).unwrap(),
        "shoppingList": [
            {
                "category": "Produce",
                "items": [
                    { "name": format!("{} Spinach", tag), "quantity": "2 bags" },
                    { "name": format!("{} Berries", tag), "quantity": "1 lb", "checked": true, "id": "provider-id" }
                ]
            },
            {
                "category": "Dairy",
                "items": [
                    { "name": format!("{} Greek Yogurt", tag), "quantity": "32 oz" }
                ]
            }
        ],
        "tips": [format!("{} tip: prep on Sunday", tag)]
    })
}

pub fn input(name: &str, gender: Gender) -> ProfileInput {
    ProfileInput {
        name: name.to_string(),
        gender,
        age: 30,
        weight: 80.0,
        height: 180.0,
        activity_level: ActivityLevel::Moderate,
        goal: Goal::Maintain,
        dietary_restrictions: BTreeSet::new(),
    }
}

pub fn her() -> PersonProfile {
    let mut input = input("Ana", Gender::Female);
    input.weight = 60.0;
    input.height = 165.0;
    input.age = 25;
    input.activity_level = ActivityLevel::Light;
    input.goal = Goal::Lose;
    input.dietary_restrictions.insert("gluten_free".to_string());
    PersonProfile::new(input).unwrap()
}

pub fn his() -> PersonProfile {
    PersonProfile::new(input("Ben", Gender::Male)).unwrap()
}
