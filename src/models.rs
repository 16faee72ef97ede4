//! Core data models used throughout the connector.
//!
//! These types represent the raw message rows read from the store and the
//! normalized documents handed to downstream ingestion pipelines.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Provenance tag stamped on every produced document.
pub const DOCUMENT_SOURCE: &str = "imessage";

/// One row of the chat/message join, decoded from the store.
///
/// `sender` is NULL for rows with no matching `handle` entry, which is the
/// common case for self-sent messages.
#[derive(Debug, Clone)]
pub struct MessageRow {
    pub chat_id: i64,
    pub chat_identifier: String,
    pub message_id: i64,
    pub text: Option<String>,
    /// Hex-encoded attributedBody blob, decoded on a best-effort basis.
    pub attributed_body: Option<String>,
    /// Store-native timestamp: nanosecond ticks since the Unix epoch.
    pub date: i64,
    pub is_from_me: bool,
    pub sender: Option<String>,
}

/// Normalized document: one per conversation, one section per message.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Stable identifier derived from the chat identifier, so re-indexing
    /// the same conversation replaces rather than duplicates.
    pub id: String,
    pub sections: Vec<Section>,
    pub source: String,
    pub semantic_identifier: String,
    pub metadata: HashMap<String, String>,
    /// Maximum message timestamp in the conversation; `None` never occurs
    /// for emitted documents since only non-empty batches are flushed.
    pub doc_updated_at: Option<DateTime<Utc>>,
}

/// A single rendered message within a document.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub text: String,
    pub link: Option<String>,
}

/// Raised at setup time when the configured message store does not exist.
///
/// Distinct from mid-iteration store failures, which degrade to an empty
/// document stream instead of surfacing an error.
#[derive(Debug, Error)]
#[error("message store not found at {}", path.display())]
pub struct MissingCredentialError {
    pub path: PathBuf,
}
