//! Attempt budgeting for calls to the model.
//!
//! - [`retry`]: how many attempts a run may spend and how long to wait
//!   between them (exponential backoff with deterministic jitter).

pub mod retry;

pub use retry::RetryConfig;
