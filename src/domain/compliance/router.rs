//! Completion router - decides whether the dialogue has gathered enough facts.

use serde::{Deserialize, Serialize};

use super::node::NodeName;
use super::prompts::COMPLETION_SENTINEL;
use super::transcript::{Role, Transcript};

/// Where the run goes after a dialogue turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Suspend and wait for the user.
    AskHuman,
    /// Hand the conversation to the extractor.
    Extractor,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::AskHuman => "ask_human",
            Route::Extractor => "extractor",
        }
    }

    /// Node the coordinator moves to for this route.
    pub fn next_node(&self) -> NodeName {
        match self {
            Route::AskHuman => NodeName::AskHuman,
            Route::Extractor => NodeName::Extractor,
        }
    }

    /// Whether the dialogue considers every required fact collected.
    pub fn information_complete(&self) -> bool {
        matches!(self, Route::Extractor)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Routes on a single assistant utterance.
///
/// Paraphrases of the marker are not recognised and keep the loop going.
pub fn route_after_dialogue(assistant_content: &str) -> Route {
    if assistant_content.contains(COMPLETION_SENTINEL) {
        Route::Extractor
    } else {
        Route::AskHuman
    }
}

/// Routes on the latest assistant message of the transcript.
pub fn route(transcript: &Transcript) -> Route {
    transcript
        .last_with_role(Role::Assistant)
        .map(|m| route_after_dialogue(&m.content))
        .unwrap_or(Route::AskHuman)
}
