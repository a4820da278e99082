// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # plancheck
//!
//! Plan-level assertions for declarative infrastructure modules.
//!
//! ## Overview
//!
//! plancheck runs an infrastructure-as-code tool against a source directory
//! without touching any backend or remote state, captures the machine-readable
//! plan, and checks declarative expectations against it:
//!
//! - Which resource types the plan creates, and how many of each
//! - Attribute values in each resource's planned `after` snapshot
//! - Whether attributes that are only known after apply are at least present
//!
//! ## Pipeline
//!
//! 1. **Generate**: `init -backend=false`, `plan -out=<file>`, `show -json <file>`
//! 2. **Parse**: the rendered plan becomes a [`plan::ChangeGraph`]
//! 3. **Assert**: an [`assertion::AssertionEvaluator`] produces a
//!    [`assertion::CheckReport`]
//!
//! ## Modules
//!
//! - [`config`]: Check-suite parsing and validation
//! - [`engine`]: External tool orchestration
//! - [`plan`]: Change graph, plan values and attribute paths
//! - [`assertion`]: Expectations, presets and evaluation
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! source_dir: modules/s3
//! preset: secure-bucket
//! expectations:
//!   - resource: aws_s3_bucket_versioning
//!     count: 1
//!     attributes:
//!       - path: versioning_configuration.status
//!         equals: Enabled
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod assertion;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod plan;

// ============================================================================
// Re-exports
// ============================================================================

pub use assertion::{AssertionEvaluator, CheckReport, Expectation};
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{CheckConfig, ConfigParser, ConfigValidator};
pub use engine::{PlanAssertionEngine, ProcessRunner, ToolRunner};
pub use error::{PlanCheckError, Result};
pub use plan::{AttributePath, ChangeGraph, PlanValue, ResourceChange};
