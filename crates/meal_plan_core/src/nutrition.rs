//! crates/meal_plan_core/src/nutrition.rs
//!
//! Derives daily energy and macronutrient targets from a person's biometrics.
//!
//! The pipeline is BMR (revised Harris-Benedict) → TDEE (activity multiplier) →
//! calorie target (goal adjustment) → fixed 40/30/30 protein/carbs/fat split.
//! Targets are always recomputed from scratch; nothing here is incremental.

use crate::domain::{ActivityLevel, Gender, Goal, MacroTargets, NutritionTargets};
use crate::ports::{PlanError, PlanResult};
use crate::profile::ProfileInput;

const PROTEIN_SHARE: f64 = 0.40;
const CARBS_SHARE: f64 = 0.30;
const FAT_SHARE: f64 = 0.30;

const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
const KCAL_PER_GRAM_CARBS: f64 = 4.0;
const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Calculate Basal Metabolic Rate using the revised Harris-Benedict equation
///
/// - Men: `88.362 + 13.397 x weight_kg + 4.799 x height_cm - 5.677 x age`
/// - Women: `447.593 + 9.247 x weight_kg + 3.098 x height_cm - 4.330 x age`
///
/// Inputs are not range-checked here; see [`compute_targets`].
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let age = f64::from(age);
    match gender {
        Gender::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age,
        Gender::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age,
    }
}

pub fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::Light => 1.375,
        ActivityLevel::Moderate => 1.55,
        ActivityLevel::Active => 1.725,
        ActivityLevel::VeryActive => 1.9,
    }
}

/// Daily kcal offset applied on top of TDEE.
pub fn goal_adjustment(goal: Goal) -> f64 {
    match goal {
        Goal::Lose => -400.0,
        Goal::Maintain => 0.0,
        Goal::Gain => 400.0,
    }
}

/// Calculate Total Daily Energy Expenditure
///
/// Formula: TDEE = BMR x activity multiplier
pub fn calculate_tdee(bmr: f64, level: ActivityLevel) -> f64 {
    bmr * activity_multiplier(level)
}

/// Split a calorie target into protein/carbs/fat grams.
///
/// Each value is rounded on its own, so `4p + 4c + 9f` can miss the calorie target by a
/// few kcal. That slack is accepted and not re-normalized.
pub fn calculate_macros(daily_calories: u32) -> MacroTargets {
    let calories = f64::from(daily_calories);
    MacroTargets {
        protein: (calories * PROTEIN_SHARE / KCAL_PER_GRAM_PROTEIN).round() as u32,
        carbs: (calories * CARBS_SHARE / KCAL_PER_GRAM_CARBS).round() as u32,
        fat: (calories * FAT_SHARE / KCAL_PER_GRAM_FAT).round() as u32,
    }
}

/// Derive the daily calorie and macro targets for a profile.
///
/// # Errors
///
/// Returns [`PlanError::InvalidProfile`] if weight or height is not a positive number,
/// if age is zero, or if the resulting calorie target is not positive.
pub fn compute_targets(input: &ProfileInput) -> PlanResult<NutritionTargets> {
    if !(input.weight.is_finite() && input.weight > 0.0) {
        return Err(PlanError::InvalidProfile(format!(
            "weight must be a positive number of kilograms, got {}",
            input.weight
        )));
    }
    if !(input.height.is_finite() && input.height > 0.0) {
        return Err(PlanError::InvalidProfile(format!(
            "height must be a positive number of centimeters, got {}",
            input.height
        )));
    }
    if input.age == 0 {
        return Err(PlanError::InvalidProfile(
            "age must be at least one year".to_string(),
        ));
    }

    let bmr = calculate_bmr(input.weight, input.height, input.age, input.gender);
    let tdee = calculate_tdee(bmr, input.activity_level);
    let calories = (tdee + goal_adjustment(input.goal)).round();
    if calories < 1.0 {
        return Err(PlanError::InvalidProfile(format!(
            "biometrics for {} produce a non-positive calorie target ({})",
            input.name, calories
        )));
    }

    let daily_calories = calories as u32;
    Ok(NutritionTargets {
        daily_calories,
        macros: calculate_macros(daily_calories),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn input(
        gender: Gender,
        age: u32,
        weight: f64,
        height: f64,
        activity_level: ActivityLevel,
        goal: Goal,
    ) -> ProfileInput {
        ProfileInput {
            name: "Test".to_string(),
            gender,
            age,
            weight,
            height,
            activity_level,
            goal,
            dietary_restrictions: BTreeSet::new(),
        }
    }

    #[test]
    fn male_moderate_maintain() {
        let bmr = calculate_bmr(80.0, 180.0, 30, Gender::Male);
        assert!((bmr - 1853.632).abs() < 1e-9);
        let tdee = calculate_tdee(bmr, ActivityLevel::Moderate);
        assert!((tdee - 2873.1296).abs() < 1e-6);

        let targets = compute_targets(&input(
            Gender::Male,
            30,
            80.0,
            180.0,
            ActivityLevel::Moderate,
            Goal::Maintain,
        ))
        .unwrap();
        assert_eq!(targets.daily_calories, 2873);
        assert_eq!(
            targets.macros,
            MacroTargets {
                protein: 287,
                carbs: 215,
                fat: 96
            }
        );
    }

    #[test]
    fn female_light_lose() {
        let targets = compute_targets(&input(
            Gender::Female,
            25,
            60.0,
            165.0,
            ActivityLevel::Light,
            Goal::Lose,
        ))
        .unwrap();
        // BMR 1405.333 x 1.375 = 1932.33, minus 400.
        assert_eq!(targets.daily_calories, 1532);
        assert_eq!(
            targets.macros,
            MacroTargets {
                protein: 153,
                carbs: 115,
                fat: 51
            }
        );
    }

    #[test]
    fn gain_adds_four_hundred_kcal() {
        let maintain = compute_targets(&input(
            Gender::Male,
            40,
            90.0,
            185.0,
            ActivityLevel::Active,
            Goal::Maintain,
        ))
        .unwrap();
        let gain = compute_targets(&input(
            Gender::Male,
            40,
            90.0,
            185.0,
            ActivityLevel::Active,
            Goal::Gain,
        ))
        .unwrap();
        assert_eq!(gain.daily_calories - maintain.daily_calories, 400);
    }

    #[test]
    fn activity_multipliers_are_increasing() {
        let levels = [
            ActivityLevel::Sedentary,
            ActivityLevel::Light,
            ActivityLevel::Moderate,
            ActivityLevel::Active,
            ActivityLevel::VeryActive,
        ];
        let factors: Vec<f64> = levels.iter().map(|l| activity_multiplier(*l)).collect();
        assert_eq!(factors, vec![1.2, 1.375, 1.55, 1.725, 1.9]);
    }

    #[test]
    fn targets_are_bit_identical_across_calls() {
        let profile = input(
            Gender::Female,
            37,
            71.3,
            168.4,
            ActivityLevel::VeryActive,
            Goal::Gain,
        );
        let first = compute_targets(&profile).unwrap();
        for _ in 0..100 {
            assert_eq!(compute_targets(&profile).unwrap(), first);
        }
        let a = calculate_bmr(71.3, 168.4, 37, Gender::Female);
        let b = calculate_bmr(71.3, 168.4, 37, Gender::Female);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn macro_energy_stays_within_rounding_slack() {
        for calories in 800..=5000 {
            let m = calculate_macros(calories);
            let energy = i64::from(m.protein * 4 + m.carbs * 4 + m.fat * 9);
            let slack = (energy - i64::from(calories)).abs();
            assert!(slack <= 9, "{} kcal split drifted by {}", calories, slack);
        }
    }

    #[test]
    fn rejects_non_positive_biometrics() {
        let mut bad = input(
            Gender::Male,
            30,
            0.0,
            180.0,
            ActivityLevel::Moderate,
            Goal::Maintain,
        );
        assert!(matches!(
            compute_targets(&bad),
            Err(PlanError::InvalidProfile(_))
        ));

        bad.weight = 80.0;
        bad.height = f64::NAN;
        assert!(matches!(
            compute_targets(&bad),
            Err(PlanError::InvalidProfile(_))
        ));

        bad.height = 180.0;
        bad.age = 0;
        assert!(matches!(
            compute_targets(&bad),
            Err(PlanError::InvalidProfile(_))
        ));
    }

    #[test]
    fn rejects_a_deficit_below_zero_kcal() {
        // Tiny, very old, sedentary and losing: TDEE - 400 goes negative.
        let profile = input(
            Gender::Male,
            120,
            1.0,
            1.0,
            ActivityLevel::Sedentary,
            Goal::Lose,
        );
        assert!(matches!(
            compute_targets(&profile),
            Err(PlanError::InvalidProfile(_))
        ));
    }
}
