//! Generation provider abstraction.
//!
//! The pipelines treat text generation as an opaque remote call: a system
//! instruction plus a user context in, text out. Replies may arrive as one
//! string or as a sequence of typed chunks; [`ProviderReply::into_text`]
//! normalizes either shape to a single string before extraction.

mod config;
mod openai;

pub use config::ProviderConfig;
pub use openai::OpenAiProvider;

use crate::errors::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// The external text-generation service a stage queries.
#[async_trait]
pub trait GenerationProvider: Send + Sync + Debug {
    /// Sends one system+user exchange and returns the raw reply.
    ///
    /// # Errors
    ///
    /// Any transport or protocol failure is fatal for the calling stage and
    /// propagates to the executor untouched.
    async fn invoke(&self, system: &str, user: &str) -> Result<ProviderReply, ProviderError>;
}

/// One piece of a chunked reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyChunk {
    /// An object chunk carrying a `text` field (extra fields are ignored).
    Piece {
        /// The text content of this chunk.
        text: String,
    },
    /// A bare string chunk.
    Raw(String),
    /// Any other chunk shape; contributes nothing to the normalized text.
    Other(serde_json::Value),
}

/// A provider reply in either of its wire shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderReply {
    /// A single response string.
    Text(String),
    /// A sequence of typed chunks.
    Chunks(Vec<ReplyChunk>),
}

impl ProviderReply {
    /// Normalizes the reply to a single string.
    ///
    /// Chunk sequences concatenate their text-bearing chunks in order;
    /// chunks without text are skipped.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Chunks(chunks) => {
                let mut out = String::new();
                for chunk in chunks {
                    match chunk {
                        ReplyChunk::Piece { text } | ReplyChunk::Raw(text) => out.push_str(&text),
                        ReplyChunk::Other(_) => {}
                    }
                }
                out
            }
        }
    }
}

impl From<String> for ProviderReply {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ProviderReply {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_passes_through() {
        let reply = ProviderReply::Text("hello".to_string());
        assert_eq!(reply.into_text(), "hello");
    }

    #[test]
    fn chunks_concatenate_in_order() {
        let reply = ProviderReply::Chunks(vec![
            ReplyChunk::Piece {
                text: "{\"a\":".to_string(),
            },
            ReplyChunk::Raw(" 1}".to_string()),
        ]);
        assert_eq!(reply.into_text(), "{\"a\": 1}");
    }

    #[test]
    fn non_text_chunks_are_skipped() {
        let reply = ProviderReply::Chunks(vec![
            ReplyChunk::Piece {
                text: "keep".to_string(),
            },
            ReplyChunk::Other(serde_json::json!({"type": "image", "url": "x"})),
        ]);
        assert_eq!(reply.into_text(), "keep");
    }

    #[test]
    fn chunk_array_deserializes_from_wire_shape() {
        let value = serde_json::json!([
            {"type": "text", "text": "part one, "},
            {"type": "text", "text": "part two"}
        ]);
        let chunks: Vec<ReplyChunk> = serde_json::from_value(value).unwrap();
        let reply = ProviderReply::Chunks(chunks);
        assert_eq!(reply.into_text(), "part one, part two");
    }
}
