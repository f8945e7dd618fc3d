//! Gallery-family adapter: multi-item posts (Instagram, Pinterest, Threads).
//!
//! The payload carries an `urls` list; items are either bare URL strings or
//! objects with `url` and an optional explicit `type`. Item order is
//! preserved as delivery order.

use super::{caption_from, Interpretation, MediaCandidate, MediaKind, Platform};
use crate::error::PipelineError;
use serde_json::Value;

pub(super) fn interpret(
    platform: Platform,
    payload: &Value,
) -> Result<Interpretation, PipelineError> {
    let items = payload
        .get("urls")
        .or_else(|| payload.get("media"))
        .and_then(Value::as_array)
        .ok_or_else(|| PipelineError::Structural("no media found".to_string()))?;

    if items.is_empty() {
        return Err(PipelineError::Structural("no media found".to_string()));
    }

    let caption = caption_from(payload);
    let mut candidates = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let url = item_url(item).ok_or_else(|| {
            PipelineError::Structural(format!("media item {} has no URL", index + 1))
        })?;
        candidates.push(MediaCandidate {
            kind: item_kind(item, url),
            source_url: url.to_string(),
            caption: caption.clone(),
            suggested_name: format!("{}_{}", platform.file_tag(), index + 1),
        });
    }

    Ok(Interpretation::Media(candidates))
}

fn item_url(item: &Value) -> Option<&str> {
    item.as_str()
        .or_else(|| item.get("url").and_then(Value::as_str))
        .filter(|s| !s.is_empty())
}

/// Kind from an explicit `type` field when present, otherwise inferred from
/// the URL extension. Unknown extensions default to photo.
fn item_kind(item: &Value, url: &str) -> MediaKind {
    if let Some(explicit) = item.get("type").and_then(Value::as_str) {
        match explicit {
            "video" => return MediaKind::Video,
            "audio" => return MediaKind::Audio,
            "photo" | "image" => return MediaKind::Photo,
            _ => {}
        }
    }
    kind_from_url(url)
}

fn kind_from_url(url: &str) -> MediaKind {
    let path = url.split('?').next().unwrap_or(url).to_ascii_lowercase();
    if path.ends_with(".mp4") || path.ends_with(".mov") || path.ends_with(".webm") {
        MediaKind::Video
    } else if path.ends_with(".mp3") || path.ends_with(".m4a") || path.ends_with(".ogg") {
        MediaKind::Audio
    } else {
        MediaKind::Photo
    }
}
