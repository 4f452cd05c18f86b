//! Data-quality checks.
//!
//! Rules are data, not behavior to plug in: the four checks live in
//! [`DqRule`] and run in [`DqRule::ALL`] order. Rule failures never escape
//! [`DqRunner::run_for_table`]; they are reported as `error` results.

pub mod rules;
pub mod runner;

pub use rules::DqRule;
pub use runner::DqRunner;
