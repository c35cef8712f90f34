//! Pure policy evaluation (no IO).
//!
//! Input: a repository model constructed elsewhere.
//! Output: findings + verdict + summary data.

#![forbid(unsafe_code)]

pub mod extract;
pub mod model;
pub mod policy;
pub mod report;
pub mod schema;

mod engine;
mod fingerprint;
pub mod checks;

#[cfg(test)]
mod test_support;

pub use engine::evaluate;
pub use fingerprint::fingerprint_for;
