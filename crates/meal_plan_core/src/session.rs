//! crates/meal_plan_core/src/session.rs
//!
//! The planner session: settings, both profiles, the plan state and the request ledger,
//! mutated by a single writer.
//!
//! Provider calls are split into a synchronous `begin_*` (issue a ticket, build the
//! request) and `complete_*` (check the ticket, parse, apply). The host awaits the
//! provider in between without holding the session, so a newer request can supersede
//! an older one while it is still in flight.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{Macros, Meal, NutritionTargets, Person, Settings, UnitSystem};
use crate::ledger::{RequestLedger, SwapKey, Ticket};
use crate::plan_state::PlanState;
use crate::ports::{PlanError, PlanResult};
use crate::profile::{PersonProfile, ProfileDisplay, ProfileUpdate};
use crate::request::{
    build_alternatives_request, build_plan_request, parse_alternatives_response,
    parse_plan_response, ProviderRequest,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profiles {
    pub her: PersonProfile,
    pub his: PersonProfile,
}

impl Profiles {
    pub fn get(&self, person: Person) -> &PersonProfile {
        match person {
            Person::Her => &self.her,
            Person::His => &self.his,
        }
    }

    fn get_mut(&mut self, person: Person) -> &mut PersonProfile {
        match person {
            Person::Her => &mut self.her,
            Person::His => &mut self.his,
        }
    }
}

/// Settings as the storage collaborator hands them over: plain data. Derived targets are
/// re-computed while deserializing the profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSettings {
    #[serde(default)]
    pub unit_system: UnitSystem,
    pub her: PersonProfile,
    pub his: PersonProfile,
}

/// Alternatives that arrived for a swap the user still has open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenSwap {
    pub key: SwapKey,
    pub alternatives: Vec<Meal>,
}

/// What happened to a provider response handed to a `complete_*` method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The request was superseded or cancelled; the response was dropped.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDaySummary {
    pub name: String,
    pub totals: Macros,
    pub targets: NutritionTargets,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub day: String,
    pub workout: String,
    pub her: PersonDaySummary,
    pub his: PersonDaySummary,
}

#[derive(Debug, Default)]
pub struct PlannerSession {
    settings: Settings,
    profiles: Option<Profiles>,
    plan: PlanState,
    ledger: RequestLedger,
    open_swap: Option<OpenSwap>,
}

impl PlannerSession {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn from_saved(saved: SavedSettings) -> Self {
        let mut session = Self::new(Settings {
            unit_system: saved.unit_system,
        });
        session.profiles = Some(Profiles {
            her: saved.her,
            his: saved.his,
        });
        session
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn profiles(&self) -> Option<&Profiles> {
        self.profiles.as_ref()
    }

    pub fn profile(&self, person: Person) -> Option<&PersonProfile> {
        self.profiles.as_ref().map(|p| p.get(person))
    }

    pub fn saved_settings(&self) -> Option<SavedSettings> {
        self.profiles.as_ref().map(|p| SavedSettings {
            unit_system: self.settings.unit_system,
            her: p.her.clone(),
            his: p.his.clone(),
        })
    }

    /// Replaces settings and both profiles. The caller is expected to start a new plan
    /// generation afterwards.
    pub fn save_settings(&mut self, saved: SavedSettings) {
        self.settings = Settings {
            unit_system: saved.unit_system,
        };
        self.profiles = Some(Profiles {
            her: saved.her,
            his: saved.his,
        });
        info!("Settings saved; targets re-derived for both profiles.");
    }

    pub fn update_profile(
        &mut self,
        person: Person,
        update: ProfileUpdate,
    ) -> PlanResult<&PersonProfile> {
        let profiles = self.profiles.as_mut().ok_or_else(not_onboarded)?;
        let profile = profiles.get_mut(person);
        profile.apply(update)?;
        Ok(profile)
    }

    pub fn profile_display(&self, person: Person) -> Option<ProfileDisplay> {
        self.profile(person)
            .map(|profile| ProfileDisplay::derive(profile, &self.settings))
    }

    pub fn plan(&self) -> &PlanState {
        &self.plan
    }

    pub fn default_selected_day(&self, today: Weekday) -> Option<&str> {
        self.plan.default_selected_day(today)
    }

    //-------------------------------------------------------------------------------------
    // Full-plan generation
    //-------------------------------------------------------------------------------------

    pub fn begin_plan_generation(&mut self) -> PlanResult<(Ticket, ProviderRequest)> {
        let profiles = self.profiles.as_ref().ok_or_else(not_onboarded)?;
        let request = build_plan_request(&profiles.her, &profiles.his);
        let ticket = self.ledger.begin_plan();
        Ok((ticket, request))
    }

    /// Applies a provider response to the session if its ticket is still current.
    ///
    /// A failed or malformed response is returned as an error and leaves the loaded plan
    /// untouched.
    pub fn complete_plan_generation(
        &mut self,
        ticket: Ticket,
        outcome: PlanResult<String>,
    ) -> PlanResult<Completion> {
        if !self.ledger.finish_plan(ticket) {
            warn!("Discarding stale plan response {}.", ticket);
            return Ok(Completion::Stale);
        }

        let plan = parse_plan_response(&outcome?)?;
        self.plan.load(plan);
        // Anything swap-related referred to the previous plan.
        self.open_swap = None;
        self.ledger.cancel_alternatives();
        info!("Loaded new week plan from request {}.", ticket);
        Ok(Completion::Applied)
    }

    /// Forgets any in-flight plan generation so its response is dropped on arrival.
    pub fn abandon_plan_generation(&mut self) {
        self.ledger.cancel_plan();
    }

    pub fn plan_generation_pending(&self) -> bool {
        self.ledger.plan_pending()
    }

    //-------------------------------------------------------------------------------------
    // Meal swaps
    //-------------------------------------------------------------------------------------

    /// Opens a swap for one meal and builds the alternatives request.
    ///
    /// Returns `Ok(None)` when the day is not in the current plan.
    pub fn begin_swap(&mut self, key: SwapKey) -> PlanResult<Option<(Ticket, ProviderRequest)>> {
        let profiles = self.profiles.as_ref().ok_or_else(not_onboarded)?;
        let Some(day) = self.plan.day(&key.day) else {
            debug!("Cannot open swap {}: day not in the current plan.", key);
            return Ok(None);
        };

        let request = build_alternatives_request(
            profiles.get(key.person),
            key.slot,
            day.meal(key.person, key.slot),
        );
        self.open_swap = None;
        let ticket = self.ledger.begin_alternatives(key);
        Ok(Some((ticket, request)))
    }

    pub fn complete_swap(
        &mut self,
        key: &SwapKey,
        ticket: Ticket,
        outcome: PlanResult<String>,
    ) -> PlanResult<Completion> {
        if !self.ledger.finish_alternatives(key, ticket) {
            warn!("Discarding stale alternatives for {}.", key);
            return Ok(Completion::Stale);
        }

        let alternatives = parse_alternatives_response(&outcome?)?;
        debug!("{} alternatives ready for {}.", alternatives.len(), key);
        self.open_swap = Some(OpenSwap {
            key: key.clone(),
            alternatives,
        });
        Ok(Completion::Applied)
    }

    pub fn open_swap(&self) -> Option<&OpenSwap> {
        self.open_swap.as_ref()
    }

    /// Applies the chosen alternative of the open swap. Returns `false` when no swap is
    /// open for `key` or `choice` is out of range.
    pub fn confirm_swap(&mut self, key: &SwapKey, choice: usize) -> bool {
        let meal = match &self.open_swap {
            Some(open) if &open.key == key => match open.alternatives.get(choice) {
                Some(meal) => meal.clone(),
                None => return false,
            },
            _ => return false,
        };

        let swapped = self.plan.swap_meal(&key.day, key.person, key.slot, meal);
        if swapped {
            self.open_swap = None;
        }
        swapped
    }

    /// Closes the swap UI: late alternatives are discarded.
    pub fn dismiss_swap(&mut self) {
        self.ledger.cancel_alternatives();
        self.open_swap = None;
    }

    pub fn toggle_shopping_item(&mut self, category: &str, item_id: &str) -> Option<bool> {
        self.plan.toggle_shopping_item(category, item_id)
    }

    /// Per-person totals for one day next to each person's targets.
    pub fn day_summary(&self, day: &str) -> Option<DaySummary> {
        let profiles = self.profiles.as_ref()?;
        let day_plan = self.plan.day(day)?;
        let summary = |person: Person| {
            let profile = profiles.get(person);
            PersonDaySummary {
                name: profile.name().to_string(),
                totals: day_plan.meals.person(person).totals(),
                targets: profile.targets(),
            }
        };

        Some(DaySummary {
            day: day_plan.day.clone(),
            workout: day_plan.workout.clone(),
            her: summary(Person::Her),
            his: summary(Person::His),
        })
    }
}

fn not_onboarded() -> PlanError {
    PlanError::InvalidProfile("profiles have not been set up yet".to_string())
}
