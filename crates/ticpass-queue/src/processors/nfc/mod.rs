//! # NFC Processors
//!
//! Cashless wristband operations against MIFARE tags, simulated at the
//! reader seam. The registry deliberately wires no fallback: an NFC route
//! without a registered processor must fail fast rather than touch an
//! arbitrary tag operation.

mod balance_read;
mod customer_auth;
mod tag_format;

pub use balance_read::NfcBalanceReadProcessor;
pub use customer_auth::NfcCustomerAuthProcessor;
pub use tag_format::NfcTagFormatProcessor;

use std::sync::Arc;

use ticpass_core::models::nfc::{NfcEvent, NfcProcessorType, NfcQueueItem};

use crate::dynamic::DynamicProcessor;

/// Explicitly wired route table for NFC operations.
pub struct NfcProcessorRegistry;

impl NfcProcessorRegistry {
    pub fn new() -> Self {
        NfcProcessorRegistry
    }

    pub fn dynamic_processor(&self) -> DynamicProcessor<NfcQueueItem, NfcEvent> {
        DynamicProcessor::new()
            .register(
                NfcProcessorType::CustomerAuth,
                Arc::new(NfcCustomerAuthProcessor::new()) as _,
            )
            .register(
                NfcProcessorType::TagFormat,
                Arc::new(NfcTagFormatProcessor::new()) as _,
            )
            .register(
                NfcProcessorType::BalanceRead,
                Arc::new(NfcBalanceReadProcessor::new()) as _,
            )
    }
}

impl Default for NfcProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
