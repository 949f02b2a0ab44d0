pub mod orchestrator;

pub use orchestrator::{
    IngestOrchestrator, IterationSummary, OrchestratorStatus, run_iteration,
};
