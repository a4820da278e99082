//! Expectations over a change graph and their evaluation.
//!
//! - [`Expectation`]: what a plan must contain, per resource type
//! - [`AssertionEvaluator`]: checks expectations and builds a [`CheckReport`]
//! - [`presets`]: built-in expectation sets

mod evaluator;
mod expectation;
pub mod presets;

pub use evaluator::{AssertionEvaluator, CheckOutcome, CheckReport};
pub use expectation::{AttributeCheck, Condition, Expectation};
