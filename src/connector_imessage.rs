//! iMessage connector: macOS Messages history (`chat.db`) to documents.
//!
//! One pull opens one read-only connection, streams the chat/message join
//! in conversation-then-time order, folds contiguous rows into
//! per-conversation documents, and feeds them to the caller through a
//! bounded channel. The producer task owns the connection for the whole
//! pull and closes it on every exit path.

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::sqlite::SqliteConnection;
use sqlx::Connection;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::config::{self, Config};
use crate::models::{Document, MissingCredentialError};
use crate::normalize::DocumentAssembler;
use crate::store::{self, TimeWindow};
use crate::stream::{DocumentStream, DOCUMENT_BUFFER};
use crate::traits::{LoadConnector, PollConnector, SecondsSinceUnixEpoch};

/// Connector over a local Messages database.
#[derive(Debug)]
pub struct IMessageConnector {
    db_path: PathBuf,
}

impl IMessageConnector {
    /// Set up the connector from configuration.
    ///
    /// Expands `~` in the configured store path and verifies the file
    /// exists. A missing store is a credential problem and fails here,
    /// before any iteration begins.
    pub fn new(config: &Config) -> Result<Self, MissingCredentialError> {
        Self::from_db_path(config::expand_home(&config.store.path))
    }

    /// Set up the connector against an explicit database path.
    pub fn from_db_path(path: impl Into<PathBuf>) -> Result<Self, MissingCredentialError> {
        let db_path = path.into();
        if !db_path.exists() {
            return Err(MissingCredentialError { path: db_path });
        }
        Ok(Self { db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Start one pull: open the connection now, then produce documents on
    /// demand from a task that owns it exclusively.
    async fn stream_window(&self, window: TimeWindow) -> DocumentStream {
        let conn = match store::open(&self.db_path).await {
            Ok(conn) => conn,
            Err(err) => {
                eprintln!(
                    "imessage: cannot open store at {}: {err:#}",
                    self.db_path.display()
                );
                return DocumentStream::empty();
            }
        };

        let (tx, rx) = mpsc::channel(DOCUMENT_BUFFER);
        tokio::spawn(pump(conn, window, tx));
        DocumentStream::new(rx)
    }
}

#[async_trait]
impl LoadConnector for IMessageConnector {
    async fn load_all(&self) -> DocumentStream {
        self.stream_window(TimeWindow::unbounded()).await
    }
}

#[async_trait]
impl PollConnector for IMessageConnector {
    async fn poll(
        &self,
        since: Option<SecondsSinceUnixEpoch>,
        until: Option<SecondsSinceUnixEpoch>,
    ) -> DocumentStream {
        self.stream_window(TimeWindow::new(since, until)).await
    }
}

/// Drive one pull to completion on the producer side.
///
/// Exit paths: clean end of rows (flush the final batch, close), receiver
/// dropped (stop, connection dropped), store error or malformed row (note
/// on stderr, keep the documents already sent, drop the incomplete batch,
/// close). Nothing here propagates an error to the consumer.
async fn pump(mut conn: SqliteConnection, window: TimeWindow, tx: mpsc::Sender<Document>) {
    let (sql, params) = store::message_query(&window);
    let final_document = {
        let mut query = sqlx::query(&sql);
        for param in params {
            query = query.bind(param);
        }

        let mut assembler = DocumentAssembler::new();
        let mut rows = query.fetch(&mut conn);
        loop {
            let row = match rows.try_next().await {
                Ok(Some(row)) => row,
                Ok(None) => break assembler.finish(),
                Err(err) => {
                    eprintln!("imessage: store read failed mid-stream: {err}");
                    break None;
                }
            };

            let message = match store::decode_row(&row) {
                Ok(message) => message,
                Err(err) => {
                    eprintln!("imessage: malformed row, stopping: {err}");
                    break None;
                }
            };

            if let Some(document) = assembler.push(message) {
                if tx.send(document).await.is_err() {
                    // Caller stopped iterating.
                    break None;
                }
            }
        }
    };

    // The row stream's borrow of the connection ended with the block above.
    let _ = conn.close().await;

    if let Some(document) = final_document {
        let _ = tx.send(document).await;
    }
}
