//! # Refund Processors
//!
//! Refunds have a single rail (the acquirer void call), so the domain skips
//! dynamic dispatch entirely: the manager drives the acquirer processor
//! directly.

mod acquirer;

pub use acquirer::AcquirerRefundProcessor;
