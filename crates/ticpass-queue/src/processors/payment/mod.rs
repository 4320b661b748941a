//! # Payment Processors
//!
//! SDK-free payment rails plus the registry that assembles them into a
//! dynamic dispatcher. The acquirer card rail is a vendor black box on real
//! terminals; here the cash processor doubles as the fallback so mixed
//! queues always resolve.

mod bitcoin_ln;
mod cash;
mod merchant_pix;
mod transactionless;

pub use bitcoin_ln::BitcoinLnPaymentProcessor;
pub use cash::CashPaymentProcessor;
pub use merchant_pix::MerchantPixPaymentProcessor;
pub use transactionless::TransactionlessPaymentProcessor;

use std::sync::Arc;

use ticpass_core::models::payment::{PaymentEvent, PaymentProcessorType, PaymentQueueItem};
use ticpass_core::pix::PixCharge;

use crate::dynamic::DynamicProcessor;

/// Payments below or at this amount (in cents) are rejected outright.
pub(crate) const MIN_AMOUNT_CENTS: i64 = 1000;

/// Explicitly wired route table for payment items.
///
/// Constructed per manager instance; no process-wide singletons.
pub struct PaymentProcessorRegistry {
    merchant: MerchantConfig,
}

/// Merchant identity stamped into generated PIX charges.
#[derive(Debug, Clone)]
pub struct MerchantConfig {
    pub name: String,
    pub city: String,
}

impl PaymentProcessorRegistry {
    pub fn new(merchant: MerchantConfig) -> Self {
        PaymentProcessorRegistry { merchant }
    }

    /// Builds the dynamic dispatcher with every SDK-free rail registered
    /// and cash as the fallback route.
    pub fn dynamic_processor(&self) -> DynamicProcessor<PaymentQueueItem, PaymentEvent> {
        let cash = Arc::new(CashPaymentProcessor::new());
        DynamicProcessor::new()
            .register(PaymentProcessorType::Cash, cash.clone() as _)
            .register(
                PaymentProcessorType::MerchantPix,
                Arc::new(MerchantPixPaymentProcessor::new(self.merchant.clone())) as _,
            )
            .register(
                PaymentProcessorType::BitcoinLightning,
                Arc::new(BitcoinLnPaymentProcessor::new()) as _,
            )
            .register(
                PaymentProcessorType::Transactionless,
                Arc::new(TransactionlessPaymentProcessor::new()) as _,
            )
            .with_fallback(cash as _)
    }
}

/// Builds the PIX charge for a payment item under this merchant identity.
pub(crate) fn charge_for(merchant: &MerchantConfig, key: String, item: &PaymentQueueItem) -> PixCharge {
    PixCharge {
        key,
        amount_cents: item.amount_cents,
        merchant_name: merchant.name.clone(),
        merchant_city: merchant.city.clone(),
        txid: item.order_reference.clone(),
    }
}

/// `"CASH-1a2b3c4d"`-style transaction ids: rail prefix plus the first 8
/// characters of a fresh UUID.
pub(crate) fn transaction_id(prefix: &str) -> String {
    let uuid = uuid::Uuid::new_v4().to_string();
    format!("{prefix}-{}", &uuid[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_id_shape() {
        let id = transaction_id("CASH");
        assert!(id.starts_with("CASH-"));
        assert_eq!(id.len(), "CASH-".len() + 8);
    }
}
