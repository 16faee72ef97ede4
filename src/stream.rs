//! Lazy document stream handed to callers.
//!
//! Documents travel over a small bounded channel from a producer task that
//! owns the store connection. The bound gives pull semantics: production
//! stalls until the caller consumes. Dropping the stream closes the
//! channel, which makes the producer's next send fail and releases the
//! connection. No leaked connections on early termination.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::models::Document;

/// Channel capacity between the producer task and the consumer.
pub(crate) const DOCUMENT_BUFFER: usize = 8;

/// An ordered, lazily produced sequence of [`Document`]s.
pub struct DocumentStream {
    rx: mpsc::Receiver<Document>,
}

impl DocumentStream {
    pub(crate) fn new(rx: mpsc::Receiver<Document>) -> Self {
        Self { rx }
    }

    /// A stream that ends immediately. Used when the store cannot be
    /// opened and the pull degrades to an empty result.
    pub(crate) fn empty() -> Self {
        let (tx, rx) = mpsc::channel(1);
        drop(tx);
        Self { rx }
    }

    /// Pull the next document, or `None` once the sequence is exhausted.
    pub async fn next(&mut self) -> Option<Document> {
        self.rx.recv().await
    }

    /// Drain the remaining documents into a vector.
    pub async fn collect(mut self) -> Vec<Document> {
        let mut documents = Vec::new();
        while let Some(document) = self.next().await {
            documents.push(document);
        }
        documents
    }
}

impl Stream for DocumentStream {
    type Item = Document;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
