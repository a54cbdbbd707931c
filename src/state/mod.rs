//! State module for a single fetch
//!
//! # Components
//!
//! - `FetchOutcome`: the immutable record produced once per fetch
//! - `RetryState`: the per-fetch retry state machine and its driver

mod outcome;
mod retry;

// Re-export main types
pub use outcome::FetchOutcome;
pub use retry::{run_attempts, RetryExhausted, RetryState};
