//! Compliance domain - the conversation state machine's types and rules.
//!
//! A run interviews the user (dialogue turn + human-input gate), extracts a
//! [`FactRecord`], runs one analyser per [`ComplianceDomain`] and finally
//! summarises both [`AnalysisResult`]s.

mod analysis;
mod domain;
mod facts;
mod node;
pub mod prompts;
mod router;
mod run_state;
mod transcript;

pub use analysis::{AnalysisResult, AnalysisSet};
pub use domain::ComplianceDomain;
pub use facts::{ExtractionError, FactRecord, FACT_SCHEMA_TOOL};
pub use node::NodeName;
pub use router::{route, route_after_dialogue, Route};
pub use run_state::{RunState, RunStatus};
pub use transcript::{Role, Transcript, TranscriptMessage};
