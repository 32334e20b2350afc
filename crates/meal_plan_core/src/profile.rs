//! crates/meal_plan_core/src/profile.rs
//!
//! The person profile: editable attributes plus the nutrition targets derived from them.
//!
//! Targets are private and only ever written by [`compute_targets`], so a
//! `PersonProfile` can never hold targets that disagree with its biometrics. Stored
//! profiles are deserialized from their inputs alone; any derived values found in
//! storage are ignored and re-derived.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

use crate::domain::{
    ActivityLevel, Gender, Goal, MacroTargets, NutritionTargets, Settings, UnitSystem,
};
use crate::nutrition::compute_targets;
use crate::ports::PlanResult;
use crate::units::{cm_to_ft_in, ft_in_to_cm, kg_to_lbs, lbs_to_kg};

/// Known dietary restriction identifiers and their display labels.
/// Profiles may carry identifiers outside this list.
pub const DIETARY_RESTRICTIONS: &[(&str, &str)] = &[
    ("gluten_free", "Gluten-Free"),
    ("diabetic", "Diabetic Friendly"),
    ("vegetarian", "Vegetarian"),
    ("low_carb", "Low-Carb"),
];

pub fn restriction_label(id: &str) -> Option<&'static str> {
    DIETARY_RESTRICTIONS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, label)| *label)
}

//=========================================================================================
// Profile Inputs
//=========================================================================================

/// Everything a person enters about themselves. Weight is kilograms, height centimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub name: String,
    pub gender: Gender,
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
    #[serde(default)]
    pub dietary_restrictions: BTreeSet<String>,
}

impl ProfileInput {
    /// The values onboarding starts from before a person edits anything.
    /// Men start from 80 kg and 180 cm, women from 65 kg and 165 cm.
    pub fn onboarding_default(name: impl Into<String>, gender: Gender) -> Self {
        let (weight, height) = match gender {
            Gender::Male => (80.0, 180.0),
            Gender::Female => (65.0, 165.0),
        };
        Self {
            name: name.into(),
            gender,
            age: 30,
            weight,
            height,
            activity_level: ActivityLevel::Light,
            goal: Goal::Maintain,
            dietary_restrictions: BTreeSet::new(),
        }
    }
}

//=========================================================================================
// PersonProfile
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ProfileInput")]
pub struct PersonProfile {
    input: ProfileInput,
    targets: NutritionTargets,
}

impl PersonProfile {
    /// Builds a profile and derives its targets.
    pub fn new(input: ProfileInput) -> PlanResult<Self> {
        let targets = compute_targets(&input)?;
        Ok(Self { input, targets })
    }

    pub fn input(&self) -> &ProfileInput {
        &self.input
    }

    pub fn name(&self) -> &str {
        &self.input.name
    }

    pub fn goal(&self) -> Goal {
        self.input.goal
    }

    pub fn dietary_restrictions(&self) -> &BTreeSet<String> {
        &self.input.dietary_restrictions
    }

    pub fn targets(&self) -> NutritionTargets {
        self.targets
    }

    pub fn daily_calories(&self) -> u32 {
        self.targets.daily_calories
    }

    pub fn macros(&self) -> MacroTargets {
        self.targets.macros
    }

    /// Applies one field edit.
    ///
    /// Edits to biometrics, activity, or goal re-derive the targets. If the edited
    /// profile is invalid the profile is left exactly as it was.
    pub fn apply(&mut self, update: ProfileUpdate) -> PlanResult<()> {
        let mut input = self.input.clone();
        let rederive = update.affects_targets();
        match update {
            ProfileUpdate::Name(name) => input.name = name,
            ProfileUpdate::Age(age) => input.age = age,
            ProfileUpdate::Weight(weight) => input.weight = weight.to_kg(),
            ProfileUpdate::Height(height) => input.height = height.to_cm(),
            ProfileUpdate::ActivityLevel(level) => input.activity_level = level,
            ProfileUpdate::Goal(goal) => input.goal = goal,
            ProfileUpdate::DietaryRestrictions(restrictions) => {
                input.dietary_restrictions = restrictions
            }
            ProfileUpdate::ToggleDietaryRestriction(id) => {
                if !input.dietary_restrictions.remove(&id) {
                    input.dietary_restrictions.insert(id);
                }
            }
        }

        if rederive {
            self.targets = compute_targets(&input)?;
        }
        self.input = input;
        Ok(())
    }
}

impl TryFrom<ProfileInput> for PersonProfile {
    type Error = crate::ports::PlanError;

    fn try_from(input: ProfileInput) -> Result<Self, Self::Error> {
        PersonProfile::new(input)
    }
}

/// Serialized form: the inputs plus the derived `dailyCalories` and `macros`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRecord<'a> {
    #[serde(flatten)]
    input: &'a ProfileInput,
    daily_calories: u32,
    macros: MacroTargets,
}

impl Serialize for PersonProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ProfileRecord {
            input: &self.input,
            daily_calories: self.targets.daily_calories,
            macros: self.targets.macros,
        }
        .serialize(serializer)
    }
}

//=========================================================================================
// Typed Profile Updates
//=========================================================================================

/// A single edit to one profile field, carrying a properly typed payload.
///
/// JSON shape: `{"field": "weight", "value": {"unit": "lbs", "amount": 176}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum ProfileUpdate {
    Name(String),
    Age(u32),
    Weight(WeightInput),
    Height(HeightInput),
    ActivityLevel(ActivityLevel),
    Goal(Goal),
    DietaryRestrictions(BTreeSet<String>),
    ToggleDietaryRestriction(String),
}

impl ProfileUpdate {
    fn affects_targets(&self) -> bool {
        !matches!(
            self,
            ProfileUpdate::Name(_)
                | ProfileUpdate::DietaryRestrictions(_)
                | ProfileUpdate::ToggleDietaryRestriction(_)
        )
    }
}

/// A weight as the user typed it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "unit", content = "amount", rename_all = "lowercase")]
pub enum WeightInput {
    Kg(f64),
    Lbs(f64),
}

impl WeightInput {
    /// Interprets a bare number in the active unit system.
    pub fn from_entry(amount: f64, settings: &Settings) -> Self {
        match settings.unit_system {
            UnitSystem::Imperial => WeightInput::Lbs(amount),
            UnitSystem::Metric => WeightInput::Kg(amount),
        }
    }

    pub fn to_kg(self) -> f64 {
        match self {
            WeightInput::Kg(kg) => kg,
            WeightInput::Lbs(lbs) => lbs_to_kg(lbs),
        }
    }
}

/// A height as the user typed it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "unit", rename_all = "camelCase")]
pub enum HeightInput {
    Cm { amount: f64 },
    FtIn { feet: f64, inches: f64 },
}

impl HeightInput {
    pub fn to_cm(self) -> f64 {
        match self {
            HeightInput::Cm { amount } => amount,
            HeightInput::FtIn { feet, inches } => ft_in_to_cm(feet, inches),
        }
    }
}

//=========================================================================================
// Display View Model
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum WeightDisplay {
    Lbs(i64),
    Kg(f64),
}

impl fmt::Display for WeightDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightDisplay::Lbs(lbs) => write!(f, "{} lbs", lbs),
            WeightDisplay::Kg(kg) => write!(f, "{} kg", kg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "unit", rename_all = "camelCase")]
pub enum HeightDisplay {
    FtIn { feet: u32, inches: u32 },
    Cm { value: f64 },
}

impl fmt::Display for HeightDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeightDisplay::FtIn { feet, inches } => write!(f, "{}' {}\"", feet, inches),
            HeightDisplay::Cm { value } => write!(f, "{} cm", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionDisplay {
    pub id: String,
    pub label: String,
}

/// What a profile looks like in the active unit system.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDisplay {
    pub name: String,
    pub unit_system: UnitSystem,
    pub age: u32,
    pub weight: WeightDisplay,
    pub height: HeightDisplay,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
    pub daily_calories: u32,
    pub macros: MacroTargets,
    pub dietary_restrictions: Vec<RestrictionDisplay>,
}

impl ProfileDisplay {
    /// Pure derivation; call again whenever the profile or the settings change.
    pub fn derive(profile: &PersonProfile, settings: &Settings) -> Self {
        let input = profile.input();
        let (weight, height) = match settings.unit_system {
            UnitSystem::Imperial => {
                let ft_in = cm_to_ft_in(input.height);
                (
                    WeightDisplay::Lbs(kg_to_lbs(input.weight)),
                    HeightDisplay::FtIn {
                        feet: ft_in.feet,
                        inches: ft_in.inches,
                    },
                )
            }
            UnitSystem::Metric => (
                WeightDisplay::Kg(input.weight),
                HeightDisplay::Cm {
                    value: input.height,
                },
            ),
        };

        let dietary_restrictions = input
            .dietary_restrictions
            .iter()
            .map(|id| RestrictionDisplay {
                id: id.clone(),
                label: restriction_label(id)
                    .map(str::to_string)
                    .unwrap_or_else(|| id.clone()),
            })
            .collect();

        Self {
            name: input.name.clone(),
            unit_system: settings.unit_system,
            age: input.age,
            weight,
            height,
            activity_level: input.activity_level,
            goal: input.goal,
            daily_calories: profile.daily_calories(),
            macros: profile.macros(),
            dietary_restrictions,
        }
    }
}
