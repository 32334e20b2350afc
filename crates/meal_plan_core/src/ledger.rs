//! crates/meal_plan_core/src/ledger.rs
//!
//! Tracks which provider requests are still wanted.
//!
//! Every begun request gets a ticket. Beginning another request of the same kind
//! supersedes the previous ticket, and a response whose ticket is no longer current is
//! stale: the caller discards it instead of applying it.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{MealSlot, Person};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(Uuid);

impl Ticket {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifies the meal a swap targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapKey {
    pub day: String,
    pub person: Person,
    pub slot: MealSlot,
}

impl fmt::Display for SwapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.day, self.person, self.slot)
    }
}

#[derive(Debug, Default)]
pub struct RequestLedger {
    plan: Option<Ticket>,
    alternatives: Option<(SwapKey, Ticket)>,
}

impl RequestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a plan generation, superseding any in flight.
    pub fn begin_plan(&mut self) -> Ticket {
        let ticket = Ticket::new();
        if let Some(previous) = self.plan.replace(ticket) {
            debug!("Plan request {} superseded by {}.", previous, ticket);
        }
        ticket
    }

    pub fn is_current_plan(&self, ticket: Ticket) -> bool {
        self.plan == Some(ticket)
    }

    pub fn plan_pending(&self) -> bool {
        self.plan.is_some()
    }

    /// Consumes the plan ticket. Returns `false` when the ticket was superseded or
    /// cancelled, meaning the response must be dropped.
    pub fn finish_plan(&mut self, ticket: Ticket) -> bool {
        if self.is_current_plan(ticket) {
            self.plan = None;
            true
        } else {
            false
        }
    }

    pub fn cancel_plan(&mut self) {
        self.plan = None;
    }

    /// Starts an alternatives request for one meal, superseding any in flight.
    pub fn begin_alternatives(&mut self, key: SwapKey) -> Ticket {
        let ticket = Ticket::new();
        if let Some((previous, _)) = self.alternatives.replace((key, ticket)) {
            debug!("Alternatives request for {} superseded.", previous);
        }
        ticket
    }

    pub fn pending_alternatives(&self) -> Option<&SwapKey> {
        self.alternatives.as_ref().map(|(key, _)| key)
    }

    /// Consumes the alternatives ticket if both the key and the ticket still match.
    pub fn finish_alternatives(&mut self, key: &SwapKey, ticket: Ticket) -> bool {
        match &self.alternatives {
            Some((current_key, current)) if current_key == key && *current == ticket => {
                self.alternatives = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel_alternatives(&mut self) {
        self.alternatives = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(day: &str) -> SwapKey {
        SwapKey {
            day: day.to_string(),
            person: Person::Her,
            slot: MealSlot::Lunch,
        }
    }

    #[test]
    fn newer_plan_request_wins() {
        let mut ledger = RequestLedger::new();
        let first = ledger.begin_plan();
        let second = ledger.begin_plan();
        assert!(!ledger.finish_plan(first));
        assert!(ledger.finish_plan(second));
        assert!(!ledger.plan_pending());
    }

    #[test]
    fn cancelled_plan_request_is_stale() {
        let mut ledger = RequestLedger::new();
        let ticket = ledger.begin_plan();
        ledger.cancel_plan();
        assert!(!ledger.finish_plan(ticket));
    }

    #[test]
    fn a_ticket_finishes_only_once() {
        let mut ledger = RequestLedger::new();
        let ticket = ledger.begin_plan();
        assert!(ledger.finish_plan(ticket));
        assert!(!ledger.finish_plan(ticket));
    }

    #[test]
    fn alternatives_are_keyed_by_meal() {
        let mut ledger = RequestLedger::new();
        let monday = ledger.begin_alternatives(key("Monday"));
        assert!(!ledger.finish_alternatives(&key("Tuesday"), monday));
        assert!(ledger.finish_alternatives(&key("Monday"), monday));
    }

    #[test]
    fn reopening_a_swap_discards_the_earlier_response() {
        let mut ledger = RequestLedger::new();
        let first = ledger.begin_alternatives(key("Monday"));
        let second = ledger.begin_alternatives(key("Monday"));
        assert!(!ledger.finish_alternatives(&key("Monday"), first));
        assert_eq!(ledger.pending_alternatives(), Some(&key("Monday")));
        assert!(ledger.finish_alternatives(&key("Monday"), second));
    }

    #[test]
    fn dismissed_swap_is_stale() {
        let mut ledger = RequestLedger::new();
        let ticket = ledger.begin_alternatives(key("Friday"));
        ledger.cancel_alternatives();
        assert!(!ledger.finish_alternatives(&key("Friday"), ticket));
    }
}
