//! # Dynamic Per-Route Dispatch
//!
//! A mixed queue holds items bound for different hardware: a cash sale next
//! to a PIX charge next to a Lightning invoice. [`DynamicProcessor`] is the
//! single processor the manager drives; per item it looks the route up in
//! its table and delegates, falling back to a default route (typically the
//! acquirer SDK) when the table has no entry.
//!
//! ## Event & Input Forwarding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  manager ──► DynamicProcessor ──► delegate (by item.route())            │
//! │                                                                         │
//! │  delegate events  ──► forwarded to dispatcher subscribers,              │
//! │                       start marker suppressed (dispatcher already       │
//! │                       emitted its own)                                  │
//! │  delegate inputs  ──► re-broadcast; answers routed back to the          │
//! │                       current delegate's correlation map                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Subscribers therefore observe one stable processor across the whole
//! queue run, whatever hardware each item actually hits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use ticpass_core::error::ProcessingErrorEvent;
use ticpass_core::event::ProcessingEvent;
use ticpass_core::input::UserInputResponse;
use ticpass_core::item::RoutedQueueItem;
use ticpass_core::result::ProcessingResult;

use crate::processor::{ProcessorCore, ProcessorTemplate, QueueProcessor};

// =============================================================================
// Dynamic Processor
// =============================================================================

/// Routes each item to the registered delegate for its route.
pub struct DynamicProcessor<T: RoutedQueueItem, E: ProcessingEvent> {
    core: Arc<ProcessorCore<E>>,
    routes: HashMap<T::Route, Arc<dyn QueueProcessor<T, E>>>,
    fallback: Option<Arc<dyn QueueProcessor<T, E>>>,

    /// Delegate currently working an item; answers route here.
    current: Mutex<Option<Arc<dyn QueueProcessor<T, E>>>>,
}

impl<T: RoutedQueueItem, E: ProcessingEvent> Default for DynamicProcessor<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RoutedQueueItem, E: ProcessingEvent> DynamicProcessor<T, E> {
    pub fn new() -> Self {
        DynamicProcessor {
            core: Arc::new(ProcessorCore::new()),
            routes: HashMap::new(),
            fallback: None,
            current: Mutex::new(None),
        }
    }

    /// Registers a delegate for a route, replacing any previous entry.
    pub fn register(mut self, route: T::Route, processor: Arc<dyn QueueProcessor<T, E>>) -> Self {
        self.routes.insert(route, processor);
        self
    }

    /// Sets the delegate used when no route matches.
    pub fn with_fallback(mut self, processor: Arc<dyn QueueProcessor<T, E>>) -> Self {
        self.fallback = Some(processor);
        self
    }

    fn resolve(&self, route: &T::Route) -> Option<Arc<dyn QueueProcessor<T, E>>> {
        self.routes
            .get(route)
            .or(self.fallback.as_ref())
            .cloned()
    }
}

#[async_trait]
impl<T: RoutedQueueItem, E: ProcessingEvent> ProcessorTemplate<T, E> for DynamicProcessor<T, E> {
    fn core(&self) -> &ProcessorCore<E> {
        &self.core
    }

    async fn run(&self, item: &T) -> ProcessingResult {
        let route = item.route();
        let Some(delegate) = self.resolve(&route) else {
            warn!(item_id = %item.id(), ?route, "no processor registered for route");
            return ProcessingResult::Error(ProcessingErrorEvent::ProcessorNotFound);
        };
        debug!(item_id = %item.id(), ?route, "dispatching to delegate");
        *self.current.lock().await = Some(delegate.clone());

        let mut events = delegate.events();
        let (_, mut inputs) = delegate.input_requests().await;

        // Drive the delegate while forwarding its progress and input
        // requests. The delegate's start marker is suppressed: the
        // dispatcher already emitted one for this item.
        let process = delegate.process(item);
        tokio::pin!(process);
        let result = loop {
            tokio::select! {
                result = &mut process => break result,
                event = events.recv() => {
                    if let Ok(event) = event {
                        if !event.is_start() {
                            self.core.emit(event);
                        }
                    }
                }
                request = inputs.recv() => {
                    if let Ok(request) = request {
                        self.core.forward_input_request(request).await;
                    }
                }
            }
        };

        // Events emitted in the delegate's final poll are already buffered.
        while let Ok(event) = events.try_recv() {
            if !event.is_start() {
                self.core.emit(event);
            }
        }

        *self.current.lock().await = None;
        self.core.clear_window().await;
        result
    }

    async fn on_abort(&self) -> bool {
        let current = self.current.lock().await.clone();
        match current {
            Some(delegate) => delegate.abort().await,
            None => true,
        }
    }

    async fn forward_user_input(&self, response: UserInputResponse) -> bool {
        let current = self.current.lock().await.clone();
        match current {
            Some(delegate) => delegate.provide_user_input(response).await,
            None => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ticpass_core::models::payment::{PaymentEvent, PaymentProcessorType, PaymentQueueItem};
    use ticpass_core::result::ProcessingOutcome;

    struct FixedResultProcessor {
        core: ProcessorCore<PaymentEvent>,
        result: ProcessingResult,
    }

    impl FixedResultProcessor {
        fn ok(transaction_id: &str) -> Arc<Self> {
            Arc::new(FixedResultProcessor {
                core: ProcessorCore::new(),
                result: ProcessingResult::Success(ProcessingOutcome::Payment {
                    transaction_id: transaction_id.to_string(),
                    auth_token: String::new(),
                }),
            })
        }
    }

    #[async_trait]
    impl ProcessorTemplate<PaymentQueueItem, PaymentEvent> for FixedResultProcessor {
        fn core(&self) -> &ProcessorCore<PaymentEvent> {
            &self.core
        }

        async fn run(&self, _item: &PaymentQueueItem) -> ProcessingResult {
            self.core.emit(PaymentEvent::TransactionProcessing);
            self.result.clone()
        }
    }

    fn transaction_id(result: &ProcessingResult) -> &str {
        match result {
            ProcessingResult::Success(ProcessingOutcome::Payment { transaction_id, .. }) => {
                transaction_id
            }
            other => panic!("expected payment outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_routes_to_registered_delegate() {
        let dynamic = DynamicProcessor::new()
            .register(PaymentProcessorType::Cash, FixedResultProcessor::ok("CASH-1") as _);
        let item = PaymentQueueItem::new(5000, PaymentProcessorType::Cash);
        let result = dynamic.process(&item).await;
        assert_eq!(transaction_id(&result), "CASH-1");
    }

    #[tokio::test]
    async fn test_unknown_route_falls_back() {
        let dynamic = DynamicProcessor::new()
            .register(PaymentProcessorType::Cash, FixedResultProcessor::ok("CASH-1") as _)
            .with_fallback(FixedResultProcessor::ok("ACQ-1") as _);
        let item = PaymentQueueItem::new(5000, PaymentProcessorType::MerchantPix);
        let result = dynamic.process(&item).await;
        assert_eq!(transaction_id(&result), "ACQ-1");
    }

    #[tokio::test]
    async fn test_unknown_route_without_fallback_errors() {
        let dynamic: DynamicProcessor<PaymentQueueItem, PaymentEvent> = DynamicProcessor::new();
        let item = PaymentQueueItem::new(5000, PaymentProcessorType::Cash);
        let result = dynamic.process(&item).await;
        assert_eq!(
            result,
            ProcessingResult::Error(ProcessingErrorEvent::ProcessorNotFound)
        );
    }

    #[tokio::test]
    async fn test_delegate_start_marker_suppressed() {
        let dynamic = DynamicProcessor::new()
            .register(PaymentProcessorType::Cash, FixedResultProcessor::ok("CASH-1") as _);
        let mut events = dynamic.events();

        let item = PaymentQueueItem::new(5000, PaymentProcessorType::Cash);
        dynamic.process(&item).await;

        // The dispatcher's own start, then the delegate's progress; the
        // delegate's start never surfaces.
        assert_eq!(events.recv().await.unwrap(), PaymentEvent::Start);
        assert_eq!(
            events.recv().await.unwrap(),
            PaymentEvent::TransactionProcessing
        );
    }
}
