//! Pure custom-check evaluation (no IO).
//!
//! Input: a block/module model and a check registry constructed elsewhere.
//! Output: findings + verdict + summary data.

#![forbid(unsafe_code)]

pub mod check;
pub mod context;
pub mod eval;
pub mod matchspec;
pub mod model;
pub mod policy;
pub mod report;

mod engine;
mod fingerprint;

pub use check::{Check, CheckRegistry};
pub use context::EvalContext;
pub use engine::{evaluate, scan};
pub use eval::Evaluator;
pub use matchspec::{Action, MatchSpec, MatchValue};

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod proptest;
