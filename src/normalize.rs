//! Row-to-document normalization.
//!
//! Turns the ordered message-row stream into one [`Document`] per
//! conversation. Grouping is a streaming reduction over contiguous
//! `chat_id` runs: the row source sorts by chat then time, so a batch
//! closes the moment the chat id changes. Only the current batch is held
//! in memory, never the whole row set.

use std::collections::{HashMap, HashSet};

use chrono::{TimeZone, Utc};

use crate::attributed_body::decode_attributed_body;
use crate::models::{Document, MessageRow, Section, DOCUMENT_SOURCE};

/// Sender label for self-sent messages.
const SELF_LABEL: &str = "Me";
/// Sender label when the row carries no sender identity.
const UNKNOWN_LABEL: &str = "Unknown";

/// Messages of one conversation, contiguous in the row stream.
#[derive(Debug)]
struct ChatBatch {
    chat_id: i64,
    chat_identifier: String,
    messages: Vec<MessageRow>,
}

impl ChatBatch {
    fn start(row: MessageRow) -> Self {
        Self {
            chat_id: row.chat_id,
            chat_identifier: row.chat_identifier.clone(),
            messages: vec![row],
        }
    }
}

/// Streaming group-by-contiguous-chat reduction.
///
/// Feed rows in store order with [`push`](Self::push); each returned
/// document corresponds to the batch that just closed. Call
/// [`finish`](Self::finish) once the stream ends to flush the last batch.
#[derive(Debug, Default)]
pub struct DocumentAssembler {
    current: Option<ChatBatch>,
}

impl DocumentAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row, closing out the previous conversation if this row
    /// starts a new one.
    pub fn push(&mut self, row: MessageRow) -> Option<Document> {
        match &mut self.current {
            Some(batch) if batch.chat_id == row.chat_id => {
                batch.messages.push(row);
                None
            }
            _ => {
                let finished = self.current.take().map(build_document);
                self.current = Some(ChatBatch::start(row));
                finished
            }
        }
    }

    /// Flush the in-flight batch at end of stream.
    pub fn finish(mut self) -> Option<Document> {
        self.current.take().map(build_document)
    }
}

fn build_document(batch: ChatBatch) -> Document {
    let sections: Vec<Section> = batch.messages.iter().map(render_section).collect();

    // Distinct sender identities; NULL senders (typically self-sent rows)
    // do not contribute a participant.
    let participants: HashSet<&str> = batch
        .messages
        .iter()
        .filter_map(|m| m.sender.as_deref())
        .collect();

    let mut metadata = HashMap::new();
    metadata.insert("chat_identifier".to_string(), batch.chat_identifier.clone());
    metadata.insert(
        "participant_count".to_string(),
        participants.len().to_string(),
    );

    let doc_updated_at = batch
        .messages
        .iter()
        .map(|m| m.date)
        .max()
        .map(|ticks| Utc.timestamp_nanos(ticks));

    Document {
        id: format!("imessage-chat-{}", batch.chat_identifier),
        sections,
        source: DOCUMENT_SOURCE.to_string(),
        semantic_identifier: format!("iMessage Chat: {}", batch.chat_identifier),
        metadata,
        doc_updated_at,
    }
}

fn render_section(message: &MessageRow) -> Section {
    // Prefer the decoded attributedBody; fall back to the plain text
    // column, then to empty. Empty messages are still rendered.
    let decoded = decode_attributed_body(message.attributed_body.as_deref());
    let text = if decoded.is_empty() {
        message.text.clone().unwrap_or_default()
    } else {
        decoded
    };

    let sender = if message.is_from_me {
        SELF_LABEL
    } else {
        message.sender.as_deref().unwrap_or(UNKNOWN_LABEL)
    };

    let timestamp = Utc.timestamp_nanos(message.date);
    Section {
        text: format!(
            "{} ({}): {}",
            sender,
            timestamp.format("%Y-%m-%d %H:%M:%S"),
            text
        ),
        link: None,
    }
}
