//! Plan-generation engine.
//!
//! This module drives the external planning tool and turns its rendered
//! plan into a [`crate::plan::ChangeGraph`].

mod orchestrator;
mod runner;

pub use orchestrator::{PlanAssertionEngine, attribute_after, find_changes};
pub use runner::{PlanStep, ProcessRunner, ToolInvocation, ToolOutput, ToolRunner};
