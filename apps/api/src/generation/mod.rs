// Caption generation: two alternatives per prompt, primary provider with fallback.
// All LLM calls go through llm_client; no direct provider HTTP calls here.

pub mod generator;
pub mod prompts;
