//! Locates message references such as `context.t.page.title(name: n)` in
//! document text and reports their message id and exact span.
//!
//! The scan is lexical: no syntax tree is built, so unrelated syntax errors
//! elsewhere in the document never abort it. Only the argument list of a
//! candidate call is balanced, with enough literal awareness that quoted
//! delimiters do not count.
//!
//! A document only yields references after a marker (an import of the
//! generated translations file, or a literal ecosystem marker). References
//! that appear before the first marker are dropped.

mod anchor;
mod call;
mod gate;
mod position;

pub use position::{LineIndex, Position};

use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::MatcherConfig;
use crate::error::ConfigError;
use anchor::AnchorScanner;
use call::CallCache;

/// Start and end of a reference, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn to_one_based(self) -> Self {
        Self {
            start: self.start.to_one_based(),
            end: self.end.to_one_based(),
        }
    }
}

/// One message reference found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReference {
    /// Dotted path after the anchor, verbatim (`core.page.title`).
    pub message_id: String,
    /// From the first character of the anchor through the path, plus the
    /// parentheses of the first call when there is one.
    pub span: Span,
}

/// A validated matcher. Holds no per-document state, so one instance can
/// serve any number of concurrent scans.
#[derive(Debug, Clone)]
pub struct Matcher {
    config: MatcherConfig,
    anchors: AnchorScanner,
}

impl Default for Matcher {
    fn default() -> Self {
        let config = MatcherConfig::default();
        let anchors = AnchorScanner::new(&config.anchor);
        Self { config, anchors }
    }
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let anchors = AnchorScanner::new(&config.anchor);
        Ok(Self { config, anchors })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// All references in `text`, in document order.
    pub fn locate(&self, text: &str) -> Vec<MessageReference> {
        let Some(marker) = gate::marker_offset(text, &self.config) else {
            debug!("no marker in document, skipping scan");
            return Vec::new();
        };

        let index = LineIndex::new(text);
        let mut positions = index.cursor();
        let mut calls = CallCache::new();
        let mut references = Vec::new();
        // Anchors at or before the marker never qualify.
        let mut from = marker + text[marker..].chars().next().map_or(1, char::len_utf8);

        while let Some(start) = self.anchors.next_from(text, from) {
            let path_start = start + self.anchors.prefix_len();
            match call::parse_reference(text, path_start, &mut calls) {
                Some(parsed) => {
                    references.push(MessageReference {
                        message_id: parsed.message_id.to_string(),
                        span: Span {
                            start: positions.position(start),
                            end: positions.position(parsed.end),
                        },
                    });
                    from = parsed.end;
                }
                None => {
                    debug!(offset = start, "discarding reference without path or closed call");
                    from = path_start;
                }
            }
        }

        debug!(
            count = references.len(),
            lines = index.line_count(),
            "located message references"
        );
        references
    }

    /// Like [`Matcher::locate`] for raw bytes; text that is not valid UTF-8
    /// yields no references.
    pub fn locate_bytes(&self, bytes: &[u8]) -> Vec<MessageReference> {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.locate(text),
            Err(e) => {
                debug!("document is not valid UTF-8: {}", e);
                Vec::new()
            }
        }
    }

    /// The part of `reference.span` that starts at the message id.
    pub fn message_id_span(&self, reference: &MessageReference) -> Span {
        // `MatcherConfig::validate` admits only identifier segments, so the
        // anchor and its trailing dot sit on the reference's first line.
        let anchor_chars = self.config.anchor.chars().count() + 1;
        let mut start = reference.span.start;
        start.character = start
            .character
            .saturating_add(u32::try_from(anchor_chars).unwrap_or(u32::MAX));
        Span {
            start,
            end: reference.span.end,
        }
    }

    /// Wire shape consumed by editor clients.
    pub fn to_item(&self, reference: MessageReference) -> ReferenceItem {
        let position = self.message_id_span(&reference).to_one_based();
        ReferenceItem {
            message_id: reference.message_id,
            span: reference.span,
            position,
        }
    }
}

/// Locate references using the default `context.t` matcher.
pub fn locate_message_references(text: &str) -> Vec<MessageReference> {
    Matcher::default().locate(text)
}

/// Locate references in raw bytes using the default matcher.
pub fn locate_message_references_in_bytes(bytes: &[u8]) -> Vec<MessageReference> {
    Matcher::default().locate_bytes(bytes)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceItem {
    pub message_id: String,
    /// Zero-based span from the anchor.
    pub span: Span,
    /// One-based span from the message id.
    pub position: Span,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocateParams {
    /// Anything other than a string yields an empty result.
    #[serde(default)]
    pub document_text: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocateBatchParams {
    pub documents: Vec<BatchDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDocument {
    pub uri: String,
    #[serde(default)]
    pub document_text: Value,
}

#[derive(Debug, Serialize)]
struct BatchResult {
    uri: String,
    references: Vec<ReferenceItem>,
}

fn locate_value(matcher: &Matcher, document_text: &Value) -> Vec<ReferenceItem> {
    match document_text.as_str() {
        Some(text) => matcher
            .locate(text)
            .into_iter()
            .map(|r| matcher.to_item(r))
            .collect(),
        None => {
            debug!("documentText is not a string, returning no references");
            Vec::new()
        }
    }
}

pub fn locate(params: LocateParams, matcher: &Matcher) -> Result<Value> {
    let references = locate_value(matcher, &params.document_text);
    Ok(serde_json::json!({ "references": references }))
}

pub fn locate_batch(params: LocateBatchParams, matcher: &Matcher) -> Result<Value> {
    let documents: Vec<BatchResult> = params
        .documents
        .par_iter()
        .map(|doc| BatchResult {
            uri: doc.uri.clone(),
            references: locate_value(matcher, &doc.document_text),
        })
        .collect();
    Ok(serde_json::json!({ "documents": documents }))
}
