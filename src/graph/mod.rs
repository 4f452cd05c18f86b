//! Question-answering orchestration.

pub mod pipeline;
pub mod state;

pub use pipeline::{Node, Pipeline};
pub use state::GraphState;
