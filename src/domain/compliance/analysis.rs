//! Analysis results tagged by regulatory domain.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::ComplianceDomain;
use super::prompts::summary_input;

/// Final answer of one domain analyser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub domain: ComplianceDomain,
    pub content: String,
    /// Retrieval round-trips the analyser performed.
    pub retrieval_rounds: u32,
    pub completed_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(domain: ComplianceDomain, content: impl Into<String>, retrieval_rounds: u32) -> Self {
        Self {
            domain,
            content: content.into(),
            retrieval_rounds,
            completed_at: Utc::now(),
        }
    }
}

/// Analyses keyed by domain; the summarizer's join barrier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisSet(BTreeMap<ComplianceDomain, AnalysisResult>);

impl AnalysisSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a result, replacing any earlier one for the same domain.
    pub fn record(&mut self, result: AnalysisResult) {
        self.0.insert(result.domain, result);
    }

    pub fn get(&self, domain: ComplianceDomain) -> Option<&AnalysisResult> {
        self.0.get(&domain)
    }

    pub fn contains(&self, domain: ComplianceDomain) -> bool {
        self.0.contains_key(&domain)
    }

    /// True once every domain has a result.
    pub fn is_complete(&self) -> bool {
        ComplianceDomain::ALL.iter().all(|d| self.contains(*d))
    }

    /// Domains still lacking a result, in pipeline order.
    pub fn pending(&self) -> Vec<ComplianceDomain> {
        ComplianceDomain::ALL
            .iter()
            .copied()
            .filter(|d| !self.contains(*d))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Summarizer input with GDPR first and AI Act second.
    ///
    /// Returns `None` until both analyses are present.
    pub fn summary_input(&self) -> Option<String> {
        let gdpr = self.get(ComplianceDomain::Gdpr)?;
        let ai_act = self.get(ComplianceDomain::AiAct)?;
        Some(summary_input(&gdpr.content, &ai_act.content))
    }
}
