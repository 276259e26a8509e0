//! Regulatory domains analysed by the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::tools::ToolDefinition;

use super::node::NodeName;
use super::prompts::{AI_ACT_ANALYSER_PROMPT, GDPR_ANALYSER_PROMPT};

/// A regulation with its own analyser branch and document index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceDomain {
    Gdpr,
    AiAct,
}

impl ComplianceDomain {
    /// Branches in the order they are scheduled.
    pub const ALL: [ComplianceDomain; 2] = [ComplianceDomain::Gdpr, ComplianceDomain::AiAct];

    /// Tag used when reporting analysis results.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceDomain::Gdpr => "gdpr",
            ComplianceDomain::AiAct => "ai_act",
        }
    }

    /// Human readable regulation name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ComplianceDomain::Gdpr => "GDPR",
            ComplianceDomain::AiAct => "AI Act",
        }
    }

    /// Name of the persisted document index backing this domain.
    pub fn index_name(&self) -> &'static str {
        match self {
            ComplianceDomain::Gdpr => "gdpr",
            ComplianceDomain::AiAct => "act",
        }
    }

    /// System prompt for this domain's analyser.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            ComplianceDomain::Gdpr => GDPR_ANALYSER_PROMPT,
            ComplianceDomain::AiAct => AI_ACT_ANALYSER_PROMPT,
        }
    }

    /// Name of the single retrieval tool bound to the analyser.
    pub fn retriever_tool_name(&self) -> &'static str {
        match self {
            ComplianceDomain::Gdpr => "gdpr_retriever",
            ComplianceDomain::AiAct => "ai_act_retriever",
        }
    }

    /// Retrieval tool bound to the analyser.
    pub fn retriever_tool(&self) -> ToolDefinition {
        ToolDefinition::new(
            self.retriever_tool_name(),
            format!("Retrieves related articles from {}", self.display_name()),
            serde_json::json!({
                "type": "object",
                "required": ["query"],
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "query to look up in retriever"
                    }
                }
            }),
        )
    }

    /// Graph node running the analyser for this domain.
    pub fn analyser_node(&self) -> NodeName {
        match self {
            ComplianceDomain::Gdpr => NodeName::GdprAnalyser,
            ComplianceDomain::AiAct => NodeName::AiActAnalyser,
        }
    }

    /// Graph node running retrieval for this domain.
    pub fn retriever_node(&self) -> NodeName {
        match self {
            ComplianceDomain::Gdpr => NodeName::GdprRetriever,
            ComplianceDomain::AiAct => NodeName::AiActRetriever,
        }
    }
}

impl fmt::Display for ComplianceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_wire_names() {
        assert_eq!(ComplianceDomain::Gdpr.as_str(), "gdpr");
        assert_eq!(ComplianceDomain::AiAct.as_str(), "ai_act");
        assert_eq!(serde_json::to_string(&ComplianceDomain::AiAct).unwrap(), "\"ai_act\"");
    }

    #[test]
    fn index_names_match_bundled_documents() {
        assert_eq!(ComplianceDomain::Gdpr.index_name(), "gdpr");
        assert_eq!(ComplianceDomain::AiAct.index_name(), "act");
    }

    #[test]
    fn each_domain_binds_one_query_tool() {
        for domain in ComplianceDomain::ALL {
            let tool = domain.retriever_tool();
            assert_eq!(tool.name(), domain.retriever_tool_name());
            assert_eq!(tool.required_parameters(), vec!["query"]);
            assert!(tool.description().contains(domain.display_name()));
        }
    }

    #[test]
    fn nodes_are_domain_specific() {
        assert_eq!(ComplianceDomain::Gdpr.analyser_node(), NodeName::GdprAnalyser);
        assert_eq!(ComplianceDomain::Gdpr.retriever_node(), NodeName::GdprRetriever);
        assert_eq!(ComplianceDomain::AiAct.analyser_node(), NodeName::AiActAnalyser);
        assert_eq!(ComplianceDomain::AiAct.retriever_node(), NodeName::AiActRetriever);
    }
}
