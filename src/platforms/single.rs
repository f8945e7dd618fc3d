//! Single-asset adapter: metadata plus one download URL (YouTube, Spotify,
//! SoundCloud, MediaFire, CapCut).
//!
//! Emits exactly one candidate when a download URL is present. Platforms
//! documented as status-only capable may legitimately succeed without a
//! retrievable asset; that becomes an informational result, not an error.

use super::{caption_from, first_string, Interpretation, MediaCandidate, MediaKind, Platform};
use crate::error::PipelineError;
use crate::text::sanitize_filename;
use serde_json::Value;

/// Keys probed for the download link, in order.
const URL_KEYS: &[&str] = &["download_url", "download", "url", "link"];

pub(super) fn interpret(
    platform: Platform,
    payload: &Value,
) -> Result<Interpretation, PipelineError> {
    let Some(url) = first_string(payload, URL_KEYS) else {
        if platform.is_status_only_capable() {
            let message = first_string(payload, &["message", "status", "title"])
                .unwrap_or("Done. Nothing to download for this link.");
            return Ok(Interpretation::StatusOnly(message.to_string()));
        }
        return Err(PipelineError::Structural("no download url".to_string()));
    };

    let suggested_name = first_string(payload, &["filename", "title", "name"])
        .map_or_else(|| platform.file_tag().to_string(), sanitize_filename);

    let candidate = MediaCandidate {
        kind: asset_kind(platform, payload, url),
        source_url: url.to_string(),
        caption: caption_from(payload),
        suggested_name,
    };
    Ok(Interpretation::Media(vec![candidate]))
}

/// Kind from the URL extension or an echoed `format` field, with a
/// per-platform default when neither is telling.
fn asset_kind(platform: Platform, payload: &Value, url: &str) -> MediaKind {
    let path = url.split('?').next().unwrap_or(url).to_ascii_lowercase();
    if path.ends_with(".mp3") || path.ends_with(".m4a") || path.ends_with(".ogg") {
        return MediaKind::Audio;
    }
    if path.ends_with(".mp4") || path.ends_with(".mov") || path.ends_with(".webm") {
        return MediaKind::Video;
    }
    if payload.get("format").and_then(Value::as_str) == Some("mp3") {
        return MediaKind::Audio;
    }
    match platform {
        Platform::Spotify | Platform::Soundcloud => MediaKind::Audio,
        _ => MediaKind::Video,
    }
}

#[cfg(test)]
mod tests {
    use super::super::interpret;
    use super::*;
    use serde_json::json;

    #[test]
    fn spotify_track_becomes_audio_candidate() {
        let payload = json!({
            "success": true,
            "title": "Some Song",
            "download_url": "http://cdn/track"
        });
        let Interpretation::Media(candidates) =
            interpret(Platform::Spotify, &payload).expect("interprets")
        else {
            panic!("expected media");
        };
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, MediaKind::Audio);
        assert_eq!(candidates[0].suggested_name, "Some Song");
    }

    #[test]
    fn youtube_mp3_format_echo_forces_audio() {
        let payload = json!({
            "success": true,
            "format": "mp3",
            "url": "http://cdn/asset"
        });
        let Interpretation::Media(candidates) =
            interpret(Platform::Youtube, &payload).expect("interprets")
        else {
            panic!("expected media");
        };
        assert_eq!(candidates[0].kind, MediaKind::Audio);
    }

    #[test]
    fn missing_url_is_structural_for_normal_platforms() {
        let payload = json!({"success": true, "title": "x"});
        let err = interpret(Platform::Spotify, &payload).expect_err("must fail");
        assert!(err.is_structural());
        assert_eq!(err.to_string(), "no download url");
    }

    #[test]
    fn status_only_platform_returns_informational_result() {
        let payload = json!({"success": true, "message": "Template applied"});
        let result = interpret(Platform::Capcut, &payload).expect("interprets");
        assert_eq!(
            result,
            Interpretation::StatusOnly("Template applied".to_string())
        );
    }

    #[test]
    fn status_only_without_message_uses_default_text() {
        let payload = json!({"success": true});
        let Interpretation::StatusOnly(message) =
            interpret(Platform::Capcut, &payload).expect("interprets")
        else {
            panic!("expected status-only");
        };
        assert!(!message.is_empty());
    }

    #[test]
    fn unsafe_suggested_names_are_sanitized() {
        let payload = json!({
            "success": true,
            "filename": "a/b:c.mp4",
            "url": "http://cdn/file.mp4"
        });
        let Interpretation::Media(candidates) =
            interpret(Platform::Mediafire, &payload).expect("interprets")
        else {
            panic!("expected media");
        };
        assert_eq!(candidates[0].suggested_name, "a_b_c.mp4");
    }
}
