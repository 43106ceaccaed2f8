// src/pipeline.rs
pub mod config;
pub mod context;
pub mod extract;
pub mod filter;
pub mod payload;
pub mod stream;

pub use config::{PipelineConfig, RunMode};
pub use context::{ClientOutcome, ImportStats, Progress};
pub use stream::ImportPipeline;
