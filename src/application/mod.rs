//! Application layer - pipeline node handlers and the run coordinator.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Each node handler takes the run state by mutable reference, calls its
//! collaborators and appends what it produced; the coordinator decides the
//! next node and checkpoints after every transition.

pub mod pipeline;

pub use pipeline::{
    AnalyzerStep, DialogueTurnHandler, DomainAnalyzer, HumanInputGate, NodeOutput,
    PipelineError, RunCoordinator, RunOutcome, StructuredExtractor, Summarizer,
};
