// Collection pipeline: sources -> normalize -> aggregate

pub mod orchestrator;
pub mod processing;
pub mod storage;

pub use orchestrator::{Pipeline, PipelineResult};
