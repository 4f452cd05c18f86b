//! State threaded through the orchestration graph.

use crate::models::{AskRequest, AskResponse, Intent};

/// Snapshot of one pipeline run.
///
/// Nodes take the state by value and return the next snapshot. `intent` and
/// `answer` are write-once; the debug trace only grows.
#[derive(Debug, Clone)]
pub struct GraphState {
    request: AskRequest,
    intent: Option<Intent>,
    answer: Option<String>,
    debug: Vec<String>,
}

impl GraphState {
    pub fn new(request: AskRequest) -> Self {
        Self {
            request,
            intent: None,
            answer: None,
            debug: Vec::new(),
        }
    }

    pub fn request(&self) -> &AskRequest {
        &self.request
    }

    pub fn intent(&self) -> Option<Intent> {
        self.intent
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn debug(&self) -> &[String] {
        &self.debug
    }

    /// Record the classified intent. A second call keeps the first intent.
    pub fn with_intent(mut self, intent: Intent, trace: impl Into<String>) -> Self {
        if self.intent.is_none() {
            self.intent = Some(intent);
        }
        self.trace(trace)
    }

    /// Record a handler's answer. A second call keeps the first answer.
    pub fn with_answer(mut self, answer: String, trace: impl Into<String>) -> Self {
        if self.answer.is_none() {
            self.answer = Some(answer);
        }
        self.trace(trace)
    }

    pub fn trace(mut self, entry: impl Into<String>) -> Self {
        self.debug.push(entry.into());
        self
    }

    /// Split into what a failed run reports.
    pub fn into_failure_parts(self) -> (Option<Intent>, Vec<String>) {
        (self.intent, self.debug)
    }

    /// Final response, available once a handler answered.
    pub fn into_response(self) -> Option<AskResponse> {
        Some(AskResponse {
            intent: self.intent?,
            answer: self.answer?,
            debug: self.debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_and_answer_are_write_once() {
        let state = GraphState::new(AskRequest::new("q"))
            .with_intent(Intent::Dq, "classify_intent → dq")
            .with_intent(Intent::Sql, "ignored")
            .with_answer("first".to_string(), "dq_node")
            .with_answer("second".to_string(), "again");

        assert_eq!(state.intent(), Some(Intent::Dq));
        assert_eq!(state.answer(), Some("first"));
        assert_eq!(state.debug().len(), 4);
    }

    #[test]
    fn test_response_requires_answer() {
        let state = GraphState::new(AskRequest::new("q")).with_intent(Intent::Sql, "x");
        assert!(state.clone().into_response().is_none());

        let response = state.with_answer("a".to_string(), "sql_node").into_response();
        assert_eq!(response.map(|r| r.intent), Some(Intent::Sql));
    }
}
