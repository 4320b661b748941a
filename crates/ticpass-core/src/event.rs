//! # Processing Events
//!
//! Each domain defines its own progress-event enum (payment authorization
//! stages, printer head states, NFC tag phases). The engine only needs three
//! things from any of them: a start marker, a cancelled marker, and the
//! ability to recognize the start marker when forwarding delegate events.

/// Contract every domain progress-event enum satisfies.
///
/// Events are fire-and-forget UI hints: losing one to a lagged subscriber
/// never corrupts queue state.
pub trait ProcessingEvent: Clone + Send + Sync + 'static {
    /// The event emitted exactly once when `process()` begins.
    fn start() -> Self;

    /// The event emitted when an in-flight operation is aborted.
    fn cancelled() -> Self;

    /// Whether this event is the start marker.
    ///
    /// The dispatcher suppresses a delegate's start marker because it has
    /// already emitted its own.
    fn is_start(&self) -> bool;
}
