//! Intent classification.
//!
//! One completion call maps a free-text question onto an [`Intent`]. The
//! response is matched by substring, so chatty answers such as
//! `"This is a DQ question."` still route correctly. Precedence is
//! `dq`, then `sql`, then `root`; anything else falls back to metadata.

use crate::error::AssistantResult;
use crate::llm::CompletionService;
use crate::models::Intent;
use tracing::debug;

/// Ordered substring candidates. First match wins.
const CANDIDATES: [(&str, Intent); 3] = [
    ("dq", Intent::Dq),
    ("sql", Intent::Sql),
    ("root", Intent::RootCause),
];

pub struct IntentClassifier;

impl IntentClassifier {
    pub fn prompt(question: &str) -> String {
        format!(
            "You are Dr. Database's intent classifier.\n\
             \n\
             Classify the user request into exactly one of:\n\
             - metadata\n\
             - dq\n\
             - sql\n\
             - rootcause\n\
             \n\
             User question:\n\
             {question}\n\
             \n\
             Respond with ONLY one word: metadata, dq, sql, or rootcause.\n"
        )
    }

    /// Map a raw model response onto an intent. Never fails.
    pub fn parse(response: &str) -> Intent {
        let normalized = response.trim().to_lowercase();
        CANDIDATES
            .iter()
            .find(|(needle, _)| normalized.contains(needle))
            .map(|(_, intent)| *intent)
            .unwrap_or(Intent::Metadata)
    }

    /// Classify `question`. Only a completion failure is an error.
    pub async fn classify<C: CompletionService>(llm: &C, question: &str) -> AssistantResult<Intent> {
        let response = llm.complete(&Self::prompt(question)).await?;
        let intent = Self::parse(&response);
        debug!(response = %response.trim(), intent = %intent, "Classified question");
        Ok(intent)
    }
}
