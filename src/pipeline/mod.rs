//! Pipeline resolution and execution.

pub mod resolver;
pub mod runner;

pub use resolver::{resolve, ResolvedStep};
pub use runner::PipelineRunner;
