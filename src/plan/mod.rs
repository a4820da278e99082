//! Change graph model.
//!
//! This module holds the in-memory representation of a rendered plan and
//! the typed accessors used to query it.

mod graph;
mod path;
mod value;

pub use graph::{ChangeAction, ChangeDetail, ChangeGraph, ResourceChange};
pub use path::{AttributePath, PathSegment};
pub use value::{PlanValue, UNKNOWN_MARKER};
