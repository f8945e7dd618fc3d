//! Ranked-quality adapter: one asset offered in ordered quality tiers
//! (Facebook, TikTok, X).
//!
//! Exactly one candidate is emitted: the first tier with a usable link.
//! Lower tiers are never attempted, even when the chosen one later fails to
//! deliver.

use super::{caption_from, first_string, Interpretation, MediaCandidate, MediaKind, Platform};
use crate::error::PipelineError;
use serde_json::Value;

/// Quality tiers in preference order for each ranked platform.
const fn tiers(platform: Platform) -> &'static [(&'static str, MediaKind)] {
    match platform {
        Platform::Tiktok => &[
            ("hd", MediaKind::Video),
            ("sd", MediaKind::Video),
            ("audio", MediaKind::Audio),
        ],
        // Facebook, X
        _ => &[("hd", MediaKind::Video), ("sd", MediaKind::Video)],
    }
}

pub(super) fn interpret(
    platform: Platform,
    payload: &Value,
) -> Result<Interpretation, PipelineError> {
    for &(tier, kind) in tiers(platform) {
        if let Some(url) = tier_url(payload, tier) {
            let candidate = MediaCandidate {
                kind,
                source_url: url.to_string(),
                caption: caption_from(payload),
                suggested_name: format!("{}_{tier}", platform.file_tag()),
            };
            return Ok(Interpretation::Media(vec![candidate]));
        }
    }
    Err(PipelineError::Structural(
        "no downloadable quality found".to_string(),
    ))
}

/// A tier is either a bare URL string or an object with an `url` field.
fn tier_url<'a>(payload: &'a Value, tier: &str) -> Option<&'a str> {
    let value = payload.get(tier)?;
    value
        .as_str()
        .or_else(|| first_string(value, &["url", "link"]))
        .filter(|s| !s.is_empty())
}
