//! Async outcome tracking
//!
//! Bridges futures into state a synchronous reader (a render loop, a CLI prompt)
//! can poll at any time:
//! - `outcome`: the `AsyncOutcome` tri-state value
//! - `tracker`: `OutcomeTracker`, which keeps the outcome of the most recently
//!   attached computation and drops results from superseded ones

mod outcome;
mod tracker;

pub use outcome::AsyncOutcome;
pub use tracker::{Attachment, Generation, OutcomeTracker, Snapshot};
