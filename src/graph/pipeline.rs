//! The orchestration graph.
//!
//! ```text
//! classify_intent ──► metadata_node ──┐
//!                 ├─► dq_node ────────┤
//!                 ├─► sql_node ───────┼──► final_node
//!                 └─► rootcause_node ─┘
//! ```
//!
//! The edge out of `classify_intent` is a pure function of the intent. One
//! run processes one question sequentially; a node failure ends the run.

use crate::agents::{self, IntentClassifier};
use crate::db::Warehouse;
use crate::error::{AssistantError, PipelineError};
use crate::graph::GraphState;
use crate::llm::CompletionService;
use crate::models::{AskRequest, AskResponse, Intent};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// A node of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    ClassifyIntent,
    Handler(Intent),
    Final,
}

impl Node {
    /// Name recorded in the debug trace.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClassifyIntent => "classify_intent",
            Self::Handler(Intent::Metadata) => "metadata_node",
            Self::Handler(Intent::Dq) => "dq_node",
            Self::Handler(Intent::Sql) => "sql_node",
            Self::Handler(Intent::RootCause) => "rootcause_node",
            Self::Final => "final_node",
        }
    }

    /// The node that runs after this one, or `None` once the run is done.
    pub fn successor(&self, intent: Option<Intent>) -> Option<Node> {
        match self {
            Self::ClassifyIntent => Some(intent.map_or(Self::Final, Self::Handler)),
            Self::Handler(_) => Some(Self::Final),
            Self::Final => None,
        }
    }
}

/// Runs questions through the graph against one warehouse and one model.
pub struct Pipeline<'a, W, C> {
    warehouse: &'a W,
    llm: &'a C,
    forced_intent: Option<Intent>,
}

impl<'a, W, C> Pipeline<'a, W, C>
where
    W: Warehouse,
    C: CompletionService,
{
    pub fn new(warehouse: &'a W, llm: &'a C) -> Self {
        Self {
            warehouse,
            llm,
            forced_intent: None,
        }
    }

    /// Skip the classifier call and route every question to `intent`.
    pub fn with_forced_intent(mut self, intent: Option<Intent>) -> Self {
        self.forced_intent = intent;
        self
    }

    /// Answer one question.
    ///
    /// On failure the error carries the intent reached and the trace so far.
    pub async fn run(&self, request: AskRequest) -> Result<AskResponse, PipelineError> {
        let span = info_span!("pipeline", run_id = %Uuid::new_v4());
        self.run_graph(request).instrument(span).await
    }

    async fn run_graph(&self, request: AskRequest) -> Result<AskResponse, PipelineError> {
        let mut state = GraphState::new(request);
        let mut node = Node::ClassifyIntent;

        loop {
            debug!(node = node.name(), "Entering node");
            state = match self.execute(node, state).await {
                Ok(next) => next,
                Err((source, state)) => {
                    let (intent, debug) = state.into_failure_parts();
                    warn!(node = node.name(), error = %source, "Pipeline run failed");
                    return Err(PipelineError {
                        source,
                        intent,
                        debug,
                    });
                }
            };
            match node.successor(state.intent()) {
                Some(next) => node = next,
                None => break,
            }
        }

        let intent = state.intent();
        let response = state.into_response().ok_or_else(|| PipelineError {
            source: AssistantError::internal("pipeline finished without an answer"),
            intent,
            debug: Vec::new(),
        })?;
        info!(intent = %response.intent, "Pipeline run finished");
        Ok(response)
    }

    async fn execute(
        &self,
        node: Node,
        state: GraphState,
    ) -> Result<GraphState, (AssistantError, GraphState)> {
        match node {
            Node::ClassifyIntent => {
                if let Some(intent) = self.forced_intent {
                    let entry = format!("{} → {} (forced)", node.name(), intent);
                    return Ok(state.with_intent(intent, entry));
                }
                let classified =
                    IntentClassifier::classify(self.llm, &state.request().question).await;
                match classified {
                    Ok(intent) => {
                        let entry = format!("{} → {}", node.name(), intent);
                        Ok(state.with_intent(intent, entry))
                    }
                    Err(e) => Err((e, state)),
                }
            }
            Node::Handler(intent) => {
                let request = state.request();
                let result = match intent {
                    Intent::Metadata => {
                        agents::metadata::answer(request, self.warehouse, self.llm).await
                    }
                    Intent::Dq => agents::dq::answer(request, self.warehouse, self.llm).await,
                    Intent::Sql => agents::sql::answer(request, self.warehouse, self.llm).await,
                    Intent::RootCause => {
                        agents::rootcause::answer(request, self.warehouse, self.llm).await
                    }
                };
                match result {
                    Ok(answer) => Ok(state.with_answer(answer, node.name())),
                    Err(e) => Err((e, state)),
                }
            }
            Node::Final => Ok(state.trace(node.name())),
        }
    }
}
