//! Resume tailoring: the structured content model, the generator-facing
//! adapters, the orchestrator and the HTTP surface around them.

pub mod analysis;
pub mod content;
pub mod extraction;
pub mod handlers;
pub mod ingest;
pub mod orchestrator;
pub mod prompts;
pub mod scoring;
pub mod store;
