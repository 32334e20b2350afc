pub mod plan_llm;

pub use plan_llm::OpenAiPlanAdapter;
