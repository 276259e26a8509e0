//! Run coordinator - drives one thread through the pipeline graph.
//!
//! The coordinator owns no state between calls: every `advance` loads the
//! thread's checkpoint, executes nodes until the run suspends at the
//! human-input gate or reaches the end, and saves a checkpoint after each
//! transition. A run interrupted between two checkpoints restarts at the
//! node recorded in the last one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::OwnedMutexGuard;

use crate::domain::compliance::{
    prompts, ComplianceDomain, NodeName, RunState, RunStatus, TranscriptMessage,
};
use crate::domain::foundation::ThreadId;
use crate::ports::{AIProvider, CheckpointError, CheckpointStore, Retriever};

use super::analyzer::{AnalyzerStep, DomainAnalyzer};
use super::dialogue::DialogueTurnHandler;
use super::errors::PipelineError;
use super::extractor::StructuredExtractor;
use super::human_gate::HumanInputGate;
use super::summarizer::Summarizer;

/// A message produced during one `advance`, keyed by the node that wrote it.
#[derive(Debug, Clone, Serialize)]
pub struct NodeOutput {
    pub node: NodeName,
    pub message: TranscriptMessage,
}

/// Result of advancing a thread
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub thread_id: ThreadId,
    /// Messages produced by this call, in order.
    pub outputs: Vec<NodeOutput>,
    pub status: RunStatus,
    /// Set while the run waits for the user.
    pub prompt: Option<String>,
    /// Set once the run has completed.
    pub summary: Option<String>,
}

impl RunOutcome {
    fn from_state(state: &RunState, outputs: Vec<NodeOutput>, gate: &HumanInputGate) -> Self {
        let status = state.status();
        Self {
            thread_id: state.thread_id.clone(),
            outputs,
            status,
            prompt: (status == RunStatus::Suspended).then(|| gate.prompt().to_string()),
            summary: state.summary.clone(),
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.status == RunStatus::Suspended
    }
}

/// Executes pipeline nodes for any number of independent threads
pub struct RunCoordinator {
    store: Arc<dyn CheckpointStore>,
    dialogue: DialogueTurnHandler,
    gate: HumanInputGate,
    extractor: StructuredExtractor,
    gdpr: DomainAnalyzer,
    ai_act: DomainAnalyzer,
    summarizer: Summarizer,
    thread_locks: ThreadLocks,
}

type ThreadLocks = Mutex<HashMap<ThreadId, Arc<tokio::sync::Mutex<()>>>>;

/// Exclusive hold on one thread. Releasing it drops every lock entry nobody
/// else holds or waits on, so the map only tracks threads with requests in flight.
struct ThreadLease<'a> {
    locks: &'a ThreadLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ThreadLease<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

impl RunCoordinator {
    pub fn new(
        store: Arc<dyn CheckpointStore>,
        ai_provider: Arc<dyn AIProvider>,
        gdpr_retriever: Arc<dyn Retriever>,
        ai_act_retriever: Arc<dyn Retriever>,
        max_retrieval_rounds: u32,
    ) -> Self {
        Self {
            store,
            dialogue: DialogueTurnHandler::new(ai_provider.clone()),
            gate: HumanInputGate::new(),
            extractor: StructuredExtractor::new(ai_provider.clone()),
            gdpr: DomainAnalyzer::new(
                ComplianceDomain::Gdpr,
                ai_provider.clone(),
                gdpr_retriever,
                max_retrieval_rounds,
            ),
            ai_act: DomainAnalyzer::new(
                ComplianceDomain::AiAct,
                ai_provider.clone(),
                ai_act_retriever,
                max_retrieval_rounds,
            ),
            summarizer: Summarizer::new(ai_provider),
            thread_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Advances a thread with optional user input.
    ///
    /// An unknown thread is started with `input` as its opening message. A
    /// suspended thread requires input; without it the call reports the
    /// suspension and produces nothing. Input is rejected while the run is
    /// mid-pipeline or finished.
    pub async fn advance(
        &self,
        thread_id: &ThreadId,
        input: Option<&str>,
    ) -> Result<RunOutcome, PipelineError> {
        let _lease = self.lock_thread(thread_id).await;

        let mut state = match self.store.load(thread_id).await {
            Ok(state) => state,
            Err(CheckpointError::NotFound(_)) => {
                let input = input.ok_or_else(|| PipelineError::ThreadNotFound(thread_id.clone()))?;
                return self.start(thread_id, input).await;
            }
            Err(err) => return Err(err.into()),
        };

        match (state.status(), input) {
            (RunStatus::Completed, _) => Err(PipelineError::RunFinished(thread_id.clone())),
            (RunStatus::Suspended, None) => Ok(RunOutcome::from_state(&state, Vec::new(), &self.gate)),
            (RunStatus::Suspended, Some(input)) => {
                let next = self.gate.resume(&mut state, input)?;
                state.transition_to(next);
                self.store.save(&state).await?;
                tracing::info!(thread_id = %thread_id, "Run resumed with user input");
                self.drive(state).await
            }
            (RunStatus::Running, Some(_)) => Err(PipelineError::InputNotExpected {
                thread_id: thread_id.clone(),
                node: state.current_node,
            }),
            (RunStatus::Running, None) => {
                tracing::info!(
                    thread_id = %thread_id,
                    node = %state.current_node,
                    "Continuing interrupted run"
                );
                self.drive(state).await
            }
        }
    }

    /// Continues a thread from its last checkpoint without new input.
    pub async fn resume(&self, thread_id: &ThreadId) -> Result<RunOutcome, PipelineError> {
        self.advance(thread_id, None).await
    }

    /// Latest checkpointed state of a thread.
    pub async fn state(&self, thread_id: &ThreadId) -> Result<RunState, PipelineError> {
        Ok(self.store.load(thread_id).await?)
    }

    /// Forgets a thread.
    pub async fn delete(&self, thread_id: &ThreadId) -> Result<(), PipelineError> {
        let _lease = self.lock_thread(thread_id).await;

        self.store.delete(thread_id).await?;
        tracing::info!(thread_id = %thread_id, "Thread deleted");
        Ok(())
    }

    async fn start(&self, thread_id: &ThreadId, input: &str) -> Result<RunOutcome, PipelineError> {
        if input.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let mut state = RunState::new(thread_id.clone());
        state.append(TranscriptMessage::user(input));
        self.store.save(&state).await?;
        tracing::info!(thread_id = %thread_id, "Run started");

        self.drive(state).await
    }

    /// Executes nodes until the run suspends or ends.
    async fn drive(&self, mut state: RunState) -> Result<RunOutcome, PipelineError> {
        let mut outputs = Vec::new();

        loop {
            let node = state.current_node;
            if matches!(node, NodeName::AskHuman | NodeName::End) {
                break;
            }

            let produced_from = state.transcript.len();
            let next = self.execute(node, &mut state).await?;

            outputs.extend(
                state.transcript.messages()[produced_from..]
                    .iter()
                    .cloned()
                    .map(|message| NodeOutput { node, message }),
            );
            state.transition_to(next);
            self.store.save(&state).await?;

            tracing::debug!(
                thread_id = %state.thread_id,
                node = %node,
                next = %next,
                checkpoint = state.checkpoint_seq,
                "Node completed"
            );
        }

        tracing::info!(
            thread_id = %state.thread_id,
            status = ?state.status(),
            produced = outputs.len(),
            "Run advanced"
        );
        Ok(RunOutcome::from_state(&state, outputs, &self.gate))
    }

    /// Runs one node and returns the node to execute next.
    async fn execute(&self, node: NodeName, state: &mut RunState) -> Result<NodeName, PipelineError> {
        match node {
            NodeName::Dialogue => Ok(self.dialogue.handle(state).await?.next_node()),
            NodeName::Extractor => match self.extractor.handle(state).await {
                Ok(_) => Ok(next_analysis_node(state)),
                Err(PipelineError::SchemaValidationFailed(err)) => {
                    tracing::warn!(
                        thread_id = %state.thread_id,
                        error = %err,
                        "Extraction failed, asking the user to clarify"
                    );
                    state.append(
                        TranscriptMessage::assistant(prompts::clarification_request(&err.to_string()))
                            .from_node(NodeName::Extractor),
                    );
                    state.information_complete = false;
                    Ok(NodeName::AskHuman)
                }
                Err(err) => Err(err),
            },
            NodeName::GdprAnalyser | NodeName::AiActAnalyser => {
                let analyzer = self.analyzer(node)?;
                match analyzer.analyse(state).await? {
                    AnalyzerStep::Retrieve => Ok(analyzer.domain().retriever_node()),
                    AnalyzerStep::Done => Ok(next_analysis_node(state)),
                }
            }
            NodeName::GdprRetriever | NodeName::AiActRetriever => {
                let analyzer = self.analyzer(node)?;
                analyzer.retrieve(state).await?;
                Ok(analyzer.domain().analyser_node())
            }
            NodeName::Summary => {
                self.summarizer.handle(state).await?;
                Ok(NodeName::End)
            }
            NodeName::AskHuman | NodeName::End => Err(PipelineError::InvalidState(format!(
                "node {} does not execute",
                node
            ))),
        }
    }

    fn analyzer(&self, node: NodeName) -> Result<&DomainAnalyzer, PipelineError> {
        match node.domain() {
            Some(ComplianceDomain::Gdpr) => Ok(&self.gdpr),
            Some(ComplianceDomain::AiAct) => Ok(&self.ai_act),
            None => Err(PipelineError::InvalidState(format!(
                "node {} has no analyser",
                node
            ))),
        }
    }

    async fn lock_thread(&self, thread_id: &ThreadId) -> ThreadLease<'_> {
        let lock = self
            .thread_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(thread_id.clone())
            .or_default()
            .clone();

        ThreadLease {
            locks: &self.thread_locks,
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn tracked_threads(&self) -> usize {
        self.thread_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Next pending analyser, or the summary once both analyses are recorded.
fn next_analysis_node(state: &RunState) -> NodeName {
    state
        .analyses
        .pending()
        .first()
        .map(ComplianceDomain::analyser_node)
        .unwrap_or(NodeName::Summary)
}
