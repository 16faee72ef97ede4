//! Connector entry-point contracts.
//!
//! Callers drive a connector through two operations: a full load of
//! everything the source holds, and an incremental poll bounded by a time
//! window. Both hand back a lazy [`DocumentStream`]; iterating the stream
//! is what performs the store I/O.
//!
//! Store trouble after setup is absorbed behind these contracts: a
//! connector is best-effort, so a failing store shows up as a short (or
//! empty) stream, never as an error surfaced mid-iteration.

use async_trait::async_trait;

use crate::stream::DocumentStream;

/// Caller-facing message-time unit: floating-point seconds since the Unix
/// epoch. Converted to the store's native tick unit internally.
pub type SecondsSinceUnixEpoch = f64;

/// Full load: every conversation in the store, one document each.
#[async_trait]
pub trait LoadConnector {
    /// Open the store and stream one document per conversation, ordered by
    /// the store's conversation-then-time sort.
    async fn load_all(&self) -> DocumentStream;
}

/// Incremental poll: conversations restricted to a message-time window.
///
/// Bounds are inclusive on both ends and conjunctive; a `None` bound
/// leaves that side open. Conversations with no message inside the window
/// produce no document.
#[async_trait]
pub trait PollConnector {
    async fn poll(
        &self,
        since: Option<SecondsSinceUnixEpoch>,
        until: Option<SecondsSinceUnixEpoch>,
    ) -> DocumentStream;
}
