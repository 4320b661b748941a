//! Drains a small mixed payment queue with tracing output, auto-answering
//! every prompt the rails raise.
//!
//! ```sh
//! RUST_LOG=debug cargo run -p ticpass-queue --example payment_demo
//! ```

use std::sync::Arc;

use serde_json::json;

use ticpass_core::config::QueueConfig;
use ticpass_core::input::{UserInputKind, UserInputResponse};
use ticpass_core::item::QueueItemStatus;
use ticpass_core::models::payment::{PaymentProcessorType, PaymentQueueItem};
use ticpass_core::state::ProcessingState;
use ticpass_core::storage::QueueStorage;
use ticpass_queue::memory::MemoryQueueStorage;
use ticpass_queue::processors::payment::MerchantConfig;
use ticpass_queue::wiring::payment_queue_manager;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let storage = Arc::new(MemoryQueueStorage::new());
    let manager = payment_queue_manager(
        storage.clone(),
        QueueConfig::new(),
        MerchantConfig {
            name: "Ticpass Bar".to_string(),
            city: "SAO PAULO".to_string(),
        },
    );

    let mut state = manager.state();
    let (_, mut inputs) = manager.user_input_requests().await;

    manager
        .enqueue(PaymentQueueItem::new(2_500, PaymentProcessorType::Cash))
        .await?;
    manager
        .enqueue(
            PaymentQueueItem::new(7_900, PaymentProcessorType::MerchantPix).with_priority(5),
        )
        .await?;

    loop {
        tokio::select! {
            changed = state.changed() => {
                changed?;
                let snapshot = state.borrow_and_update().clone();
                tracing::info!(state = ?snapshot, "queue state changed");
                if matches!(snapshot, ProcessingState::QueueDone) {
                    break;
                }
            }
            request = inputs.recv() => {
                let request = request?;
                let answer = match &request.kind {
                    UserInputKind::ConfirmMerchantPixKey => {
                        UserInputResponse::of(&request.id, json!("demo@ticpass.com.br"))
                    }
                    UserInputKind::MerchantPixScanning { pix_code } => {
                        tracing::info!(%pix_code, "scan this BR Code");
                        UserInputResponse::of(&request.id, json!(true))
                    }
                    _ => UserInputResponse::canceled(&request.id),
                };
                manager.provide_user_input(answer).await;
            }
        }
    }

    let done = storage.get_all_by_status(QueueItemStatus::Done).await?;
    tracing::info!(count = done.len(), "all payments processed");
    Ok(())
}
