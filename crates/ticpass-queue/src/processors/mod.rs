//! # Concrete Processors
//!
//! One module per processing domain. Every processor here is simulated at
//! the hardware seam: the delays, generated transaction ids and validation
//! rules stand in for the acquirer SDK / printer driver / NFC reader calls a
//! terminal build links in, while the queue-facing behavior (events, input
//! requests, error taxonomy) is the real contract.

pub mod nfc;
pub mod payment;
pub mod printing;
pub mod refund;
