//! Transcript adapter: text payload, not part of the media-delivery path.
//!
//! The emitted text is HTML-escaped first and bounded second, so the limit
//! holds on the wire even when escaping expands the text.

use super::{first_string, Interpretation};
use crate::error::PipelineError;
use crate::text::truncate_escaped;
use serde_json::Value;

/// Transcripts are bounded so they fit in a single chat message.
pub const TRANSCRIPT_CHAR_LIMIT: usize = 4000;

pub(super) fn interpret(payload: &Value) -> Result<Interpretation, PipelineError> {
    let text = first_string(payload, &["transcript", "text", "content"])
        .ok_or_else(|| PipelineError::Structural("no transcript found".to_string()))?;
    let escaped = html_escape::encode_text(text);
    Ok(Interpretation::Text(truncate_escaped(
        &escaped,
        TRANSCRIPT_CHAR_LIMIT,
    )))
}
