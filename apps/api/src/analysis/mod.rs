// CV analysis: prompts, LLM calls, normalization of the answers and the upload pipeline.
// All LLM calls go through llm_client.

pub mod analyzer;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
