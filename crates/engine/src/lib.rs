//! Dispatch engine: routes each recipient record to a transport, validates it,
//! sends it, paces consecutive sends, and aggregates the outcomes of a run.

pub mod aggregator;
pub mod dispatcher;
pub mod pacing;
pub mod router;
pub mod validator;

pub use aggregator::RunAggregator;
pub use dispatcher::Dispatcher;
pub use pacing::{FixedDelay, Pacer, PacingPolicy};
