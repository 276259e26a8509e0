//! Nodes of the conversation graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::ComplianceDomain;

/// A node of the pipeline graph; the run state records the next one to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeName {
    Dialogue,
    AskHuman,
    Extractor,
    GdprAnalyser,
    GdprRetriever,
    AiActAnalyser,
    AiActRetriever,
    Summary,
    End,
}

impl NodeName {
    /// Name used when presenting messages produced by this node.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeName::Dialogue => "dialogue",
            NodeName::AskHuman => "ask_human",
            NodeName::Extractor => "extractor",
            NodeName::GdprAnalyser => "gdpr_analyser",
            NodeName::GdprRetriever => "gdpr_retriever",
            NodeName::AiActAnalyser => "ai_act_analyser",
            NodeName::AiActRetriever => "ai_act_retriever",
            NodeName::Summary => "summary",
            NodeName::End => "end",
        }
    }

    /// Domain branch this node belongs to, if any.
    pub fn domain(&self) -> Option<ComplianceDomain> {
        match self {
            NodeName::GdprAnalyser | NodeName::GdprRetriever => Some(ComplianceDomain::Gdpr),
            NodeName::AiActAnalyser | NodeName::AiActRetriever => Some(ComplianceDomain::AiAct),
            _ => None,
        }
    }

    /// True once the graph has reached its terminal node.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeName::End)
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_display_names() {
        for node in [
            NodeName::Dialogue,
            NodeName::AskHuman,
            NodeName::Extractor,
            NodeName::GdprAnalyser,
            NodeName::GdprRetriever,
            NodeName::AiActAnalyser,
            NodeName::AiActRetriever,
            NodeName::Summary,
            NodeName::End,
        ] {
            let json = serde_json::to_string(&node).unwrap();
            assert_eq!(json, format!("\"{}\"", node.as_str()));
        }
    }

    #[test]
    fn branch_nodes_report_their_domain() {
        assert_eq!(NodeName::GdprRetriever.domain(), Some(ComplianceDomain::Gdpr));
        assert_eq!(NodeName::AiActAnalyser.domain(), Some(ComplianceDomain::AiAct));
        assert_eq!(NodeName::Dialogue.domain(), None);
        assert_eq!(NodeName::Summary.domain(), None);
    }

    #[test]
    fn only_end_is_terminal() {
        assert!(NodeName::End.is_terminal());
        assert!(!NodeName::AskHuman.is_terminal());
    }
}
