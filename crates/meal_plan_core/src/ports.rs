//! crates/meal_plan_core/src/ports.rs
//!
//! Defines the service contract (trait) for the external generation provider and the
//! error type shared by every fallible core operation.
//! The trait forms the boundary of the hexagonal architecture, keeping the core
//! independent of which model or HTTP client produces the plan content.

use async_trait::async_trait;

use crate::request::ProviderRequest;

//=========================================================================================
// Core Error and Result Types
//=========================================================================================

/// The error type for all core operations.
///
/// None of these are fatal: each is recoverable by retrying the user action that
/// triggered it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// Biometric input that cannot produce a calorie target.
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
    /// The provider answered, but without the structure the plan model relies on.
    #[error("Malformed provider response: {0}")]
    MalformedProviderResponse(String),
    /// The provider call failed or timed out.
    #[error("Generation provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// A convenience type alias for `Result<T, PlanError>`.
pub type PlanResult<T> = Result<T, PlanError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Sends a structured request to the provider and returns the raw JSON text it produced.
    ///
    /// Implementations map transport failures and timeouts to
    /// [`PlanError::ProviderUnavailable`]; they never retry.
    async fn generate(&self, request: &ProviderRequest) -> PlanResult<String>;
}
