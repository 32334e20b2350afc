pub mod domain;
pub mod ledger;
pub mod nutrition;
pub mod plan_state;
pub mod ports;
pub mod profile;
pub mod request;
pub mod session;
pub mod units;

pub use domain::{
    ActivityLevel, DayMeals, DayPlan, Gender, GeneratedPlan, Goal, MacroTargets, Macros, Meal,
    MealSlot, NutritionTargets, Person, PersonMeals, Settings, ShoppingCategory, ShoppingItem,
    UnitSystem, WeekPlan,
};
pub use ledger::{RequestLedger, SwapKey, Ticket};
pub use nutrition::compute_targets;
pub use plan_state::PlanState;
pub use ports::{GenerationProvider, PlanError, PlanResult};
pub use profile::{PersonProfile, ProfileDisplay, ProfileInput, ProfileUpdate};
pub use request::{
    build_alternatives_request, build_plan_request, parse_alternatives_response,
    parse_plan_response, ProviderRequest,
};
pub use session::{Completion, PlannerSession, Profiles, SavedSettings};
