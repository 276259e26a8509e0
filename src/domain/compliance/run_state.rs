//! Run State - everything the coordinator checkpoints for one conversation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ThreadId;

use super::analysis::{AnalysisResult, AnalysisSet};
use super::domain::ComplianceDomain;
use super::facts::FactRecord;
use super::node::NodeName;
use super::transcript::{Transcript, TranscriptMessage};

/// Coarse lifecycle of a run, derived from the current node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Mid-pipeline; the coordinator can keep going without input.
    Running,
    /// Waiting at the human-input gate.
    Suspended,
    /// Summary produced.
    Completed,
}

/// Persisted state of one conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub thread_id: ThreadId,
    /// Node that runs next when the coordinator advances.
    pub current_node: NodeName,
    pub transcript: Transcript,
    /// Set by the dialogue turn when the completion marker is seen.
    #[serde(default)]
    pub information_complete: bool,
    #[serde(default)]
    pub facts: Option<FactRecord>,
    #[serde(default)]
    pub analyses: AnalysisSet,
    /// Retrieval round-trips spent so far in the active analyser branch.
    #[serde(default)]
    pub retrieval_rounds: BTreeMap<ComplianceDomain, u32>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Incremented on every node transition.
    #[serde(default)]
    pub checkpoint_seq: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RunState {
    /// Creates the state for a new thread, positioned at the dialogue turn.
    pub fn new(thread_id: ThreadId) -> Self {
        let now = Utc::now();
        Self {
            thread_id,
            current_node: NodeName::Dialogue,
            transcript: Transcript::new(),
            information_complete: false,
            facts: None,
            analyses: AnalysisSet::new(),
            retrieval_rounds: BTreeMap::new(),
            summary: None,
            checkpoint_seq: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> RunStatus {
        match self.current_node {
            NodeName::AskHuman => RunStatus::Suspended,
            NodeName::End => RunStatus::Completed,
            _ => RunStatus::Running,
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.status() == RunStatus::Suspended
    }

    /// Appends a message to the transcript.
    pub fn append(&mut self, message: TranscriptMessage) -> &TranscriptMessage {
        self.updated_at = Utc::now();
        self.transcript.push(message)
    }

    /// Moves to the next node.
    pub fn transition_to(&mut self, node: NodeName) {
        self.current_node = node;
        self.checkpoint_seq += 1;
        self.updated_at = Utc::now();
    }

    pub fn record_facts(&mut self, facts: FactRecord) {
        self.facts = Some(facts);
        self.updated_at = Utc::now();
    }

    pub fn record_analysis(&mut self, result: AnalysisResult) {
        self.retrieval_rounds.remove(&result.domain);
        self.analyses.record(result);
        self.updated_at = Utc::now();
    }

    pub fn record_summary(&mut self, summary: impl Into<String>) {
        self.summary = Some(summary.into());
        self.updated_at = Utc::now();
    }

    /// Rounds already spent by a domain's analyser.
    pub fn rounds_for(&self, domain: ComplianceDomain) -> u32 {
        self.retrieval_rounds.get(&domain).copied().unwrap_or(0)
    }

    /// Counts one more retrieval round-trip and returns the new total.
    pub fn count_retrieval_round(&mut self, domain: ComplianceDomain) -> u32 {
        let rounds = self.retrieval_rounds.entry(domain).or_insert(0);
        *rounds += 1;
        *rounds
    }
}
