//! End-to-end engine flows over the public API only: mixed payment rails,
//! the merchant PIX suspend/resume dance, and a full print job.

use std::sync::Arc;

use serde_json::json;

use ticpass_core::config::QueueConfig;
use ticpass_core::input::{UserInputKind, UserInputResponse};
use ticpass_core::item::QueueItemStatus;
use ticpass_core::models::payment::{PaymentProcessorType, PaymentQueueItem};
use ticpass_core::models::printing::{PrintingEvent, PrintingProcessorType, PrintingQueueItem};
use ticpass_core::state::ProcessingState;
use ticpass_core::storage::QueueStorage;
use ticpass_queue::memory::MemoryQueueStorage;
use ticpass_queue::processors::payment::MerchantConfig;
use ticpass_queue::wiring::{payment_queue_manager, printing_queue_manager};

fn merchant() -> MerchantConfig {
    MerchantConfig {
        name: "Ticpass Bar".to_string(),
        city: "SAO PAULO".to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn mixed_payment_rails_drain_to_done() {
    let storage = Arc::new(MemoryQueueStorage::new());
    let manager = payment_queue_manager(storage.clone(), QueueConfig::new(), merchant());
    let mut state = manager.state();

    let cash = PaymentQueueItem::new(2_000, PaymentProcessorType::Cash).with_priority(1);
    let lightning =
        PaymentQueueItem::new(3_000, PaymentProcessorType::BitcoinLightning).with_priority(5);
    let comp = PaymentQueueItem::new(1_500, PaymentProcessorType::Transactionless);
    manager.enqueue(cash).await.unwrap();
    manager.enqueue(lightning).await.unwrap();
    manager.enqueue(comp).await.unwrap();

    state
        .wait_for(|s| matches!(s, ProcessingState::QueueDone))
        .await
        .unwrap();

    let done = storage
        .get_all_by_status(QueueItemStatus::Done)
        .await
        .unwrap();
    assert_eq!(done.len(), 3);
    assert!(storage
        .get_all_by_status(QueueItemStatus::Pending)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test(start_paused = true)]
async fn merchant_pix_suspends_for_key_and_scan() {
    let storage = Arc::new(MemoryQueueStorage::new());
    let manager = payment_queue_manager(storage.clone(), QueueConfig::new(), merchant());
    let mut state = manager.state();
    let (_, mut inputs) = manager.user_input_requests().await;

    let pix = PaymentQueueItem::new(7_900, PaymentProcessorType::MerchantPix);
    manager.enqueue(pix.clone()).await.unwrap();

    // Step 1: the rail suspends asking for the merchant key.
    let key_request = inputs.recv().await.unwrap();
    assert!(matches!(
        key_request.kind,
        UserInputKind::ConfirmMerchantPixKey
    ));
    assert!(manager
        .provide_user_input(UserInputResponse::of(
            &key_request.id,
            json!("demo@ticpass.com.br"),
        ))
        .await);

    // Step 2: it presents the generated BR Code and waits for the scan.
    let scan_request = inputs.recv().await.unwrap();
    match &scan_request.kind {
        UserInputKind::MerchantPixScanning { pix_code } => {
            assert!(pix_code.starts_with("000201"));
            assert!(pix_code.contains("br.gov.bcb.pix"));
            assert!(pix_code.contains("demo@ticpass.com.br"));
        }
        other => panic!("expected scanning request, got {other:?}"),
    }
    assert!(manager
        .provide_user_input(UserInputResponse::of(&scan_request.id, json!(true)))
        .await);

    state
        .wait_for(|s| matches!(s, ProcessingState::QueueDone))
        .await
        .unwrap();
    let done = storage
        .get_all_by_status(QueueItemStatus::Done)
        .await
        .unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, pix.id);
}

#[tokio::test(start_paused = true)]
async fn print_job_emits_progress_events_in_order() {
    let receipt = std::env::temp_dir().join(format!("ticpass-receipt-{}.bin", uuid()));
    std::fs::write(&receipt, b"receipt body").unwrap();

    let storage = Arc::new(MemoryQueueStorage::new());
    let manager = printing_queue_manager(storage.clone(), QueueConfig::new());
    let mut state = manager.state();
    let mut events = manager.events();

    let job = PrintingQueueItem::new(
        receipt.to_string_lossy().into_owned(),
        PrintingProcessorType::Mp4200Hs,
    )
    .with_copies(2);
    manager.enqueue(job).await.unwrap();

    // The network-info prompt times out under paused time and the job
    // proceeds with the factory address.
    state
        .wait_for(|s| matches!(s, ProcessingState::QueueDone))
        .await
        .unwrap();

    assert_eq!(events.recv().await.unwrap(), PrintingEvent::Start);
    assert_eq!(events.recv().await.unwrap(), PrintingEvent::Processing);
    assert_eq!(events.recv().await.unwrap(), PrintingEvent::Printing);

    assert_eq!(
        storage
            .get_all_by_status(QueueItemStatus::Done)
            .await
            .unwrap()
            .len(),
        1
    );
    std::fs::remove_file(&receipt).ok();
}

fn uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}
