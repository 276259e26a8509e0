//! Pipeline nodes and the coordinator that drives them.
//!
//! ```text
//! dialogue ──▶ ask_human ──▶ dialogue ... ──▶ extractor
//!    extractor ──▶ gdpr_analyser ⇄ gdpr_retriever
//!              ──▶ ai_act_analyser ⇄ ai_act_retriever ──▶ summary ──▶ end
//! ```

mod analyzer;
mod coordinator;
mod dialogue;
mod errors;
mod extractor;
mod human_gate;
mod messages;
mod summarizer;

pub use analyzer::{AnalyzerStep, DomainAnalyzer};
pub use coordinator::{NodeOutput, RunCoordinator, RunOutcome};
pub use dialogue::DialogueTurnHandler;
pub use errors::PipelineError;
pub use extractor::StructuredExtractor;
pub use human_gate::HumanInputGate;
pub use messages::to_provider_messages;
pub use summarizer::Summarizer;
