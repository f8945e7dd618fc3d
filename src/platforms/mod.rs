//! Per-platform interpretation of extraction-API responses.
//!
//! The upstream speaks loosely-typed JSON whose shape varies by platform, but
//! every shape falls into one of four families. Each family adapter validates
//! the payload at this boundary and converts missing or malformed fields into
//! a [`PipelineError::Structural`] instead of letting raw `Value`s leak
//! further into the pipeline.

mod gallery;
mod ranked;
mod single;
mod transcript;

use crate::error::PipelineError;
use serde_json::Value;
use std::str::FromStr;

pub use transcript::TRANSCRIPT_CHAR_LIMIT;

/// Kind of one deliverable media unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
    Photo,
}

impl MediaKind {
    /// File extension used when the response suggests no filename.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "mp3",
            Self::Photo => "jpg",
        }
    }
}

/// One deliverable unit derived from an upstream response. Order within the
/// candidate sequence is delivery order.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaCandidate {
    pub kind: MediaKind,
    pub source_url: String,
    pub caption: String,
    /// Fallback filename stem when the download response suggests none.
    pub suggested_name: String,
}

/// Requested output format for the YouTube command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatHint {
    Mp3,
    P360,
    P480,
    P720,
    P1080,
}

impl FormatHint {
    /// All tokens accepted on the command line, for usage messages.
    pub const ALLOWED: &'static [&'static str] = &["mp3", "360", "480", "720", "1080"];

    /// Value passed upstream as the `format` query parameter.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::P360 => "360",
            Self::P480 => "480",
            Self::P720 => "720",
            Self::P1080 => "1080",
        }
    }

    /// Media kind implied by the format.
    #[must_use]
    pub const fn kind(self) -> MediaKind {
        match self {
            Self::Mp3 => MediaKind::Audio,
            _ => MediaKind::Video,
        }
    }
}

impl FromStr for FormatHint {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mp3" => Ok(Self::Mp3),
            "360" => Ok(Self::P360),
            "480" => Ok(Self::P480),
            "720" => Ok(Self::P720),
            "1080" => Ok(Self::P1080),
            _ => Err(()),
        }
    }
}

/// Supported source platforms, one per bot command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    Instagram,
    Facebook,
    Tiktok,
    X,
    Pinterest,
    Threads,
    Youtube,
    Spotify,
    Soundcloud,
    Mediafire,
    Capcut,
    YtTranscript,
}

/// Structural family of a platform's response shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Family {
    /// List of media items, each delivered in order.
    Gallery,
    /// Ordered quality tiers for one asset; first non-empty tier wins.
    Ranked,
    /// Metadata plus a single download URL, possibly status-only.
    Single,
    /// Text payload, not part of the media-delivery path.
    Transcript,
}

impl Platform {
    /// Path segment on the extraction API.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Instagram => "insta",
            Self::Facebook => "fb",
            Self::Tiktok => "tiktok",
            Self::X => "twitter",
            Self::Pinterest => "pinterest",
            Self::Threads => "threads",
            Self::Youtube => "ytdl",
            Self::Spotify => "spotify",
            Self::Soundcloud => "soundcloud",
            Self::Mediafire => "mediafire",
            Self::Capcut => "capcut",
            Self::YtTranscript => "yt-transcript",
        }
    }

    /// Command name as tracked in usage stats (without the leading slash).
    #[must_use]
    pub const fn command_name(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Tiktok => "tiktok",
            Self::X => "x",
            Self::Pinterest => "pinterest",
            Self::Threads => "threads",
            Self::Youtube => "youtube",
            Self::Spotify => "spotify",
            Self::Soundcloud => "soundcloud",
            Self::Mediafire => "mediafire",
            Self::Capcut => "capcut",
            Self::YtTranscript => "yt_trans",
        }
    }

    /// Short tag used for numbered fallback filenames (`ig_1`, `ig_2`, ...).
    #[must_use]
    pub const fn file_tag(self) -> &'static str {
        match self {
            Self::Instagram => "ig",
            Self::Facebook => "fb",
            Self::Tiktok => "tt",
            Self::X => "x",
            Self::Pinterest => "pin",
            Self::Threads => "threads",
            Self::Youtube => "yt",
            Self::Spotify => "spotify",
            Self::Soundcloud => "sc",
            Self::Mediafire => "mf",
            Self::Capcut => "capcut",
            Self::YtTranscript => "yt_trans",
        }
    }

    const fn family(self) -> Family {
        match self {
            Self::Instagram | Self::Pinterest | Self::Threads => Family::Gallery,
            Self::Facebook | Self::Tiktok | Self::X => Family::Ranked,
            Self::Youtube | Self::Spotify | Self::Soundcloud | Self::Mediafire | Self::Capcut => {
                Family::Single
            }
            Self::YtTranscript => Family::Transcript,
        }
    }

    /// Platforms where a successful response without an asset is a
    /// documented confirmation rather than a structural error.
    const fn is_status_only_capable(self) -> bool {
        matches!(self, Self::Capcut)
    }
}

/// Uniform adapter output across all families.
#[derive(Clone, Debug, PartialEq)]
pub enum Interpretation {
    /// Ordered media candidates to fetch and deliver.
    Media(Vec<MediaCandidate>),
    /// Text payload (transcripts); bypasses the media fetcher.
    Text(String),
    /// Upstream confirmed success but there is nothing to retrieve.
    StatusOnly(String),
}

/// Maps a successful extraction payload into a uniform interpretation.
///
/// Interpreting the same payload twice yields candidate-equal results.
///
/// # Errors
///
/// `PipelineError::Upstream` when the payload carries `success != true`,
/// `PipelineError::Structural` when expected fields are missing or malformed.
pub fn interpret(platform: Platform, payload: &Value) -> Result<Interpretation, PipelineError> {
    ensure_success(payload)?;
    match platform.family() {
        Family::Gallery => gallery::interpret(platform, payload),
        Family::Ranked => ranked::interpret(platform, payload),
        Family::Single => single::interpret(platform, payload),
        Family::Transcript => transcript::interpret(payload),
    }
}

/// A top-level `success != true` is an immediate failure carrying the
/// upstream's message, or a generic default when none is provided.
fn ensure_success(payload: &Value) -> Result<(), PipelineError> {
    if payload.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }
    let message = payload
        .get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(PipelineError::GENERIC_UPSTREAM);
    Err(PipelineError::Upstream(message.to_string()))
}

/// Probes a set of keys for the first non-empty string value.
fn first_string<'a>(payload: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| payload.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

/// Title-ish caption text, if the payload carries one.
fn caption_from(payload: &Value) -> String {
    first_string(payload, &["title", "caption", "name"])
        .map(|s| html_escape::encode_text(s).into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_payload_surfaces_upstream_message() {
        let payload = json!({"success": false, "error": "private post"});
        let err = interpret(Platform::Instagram, &payload).expect_err("must fail");
        assert_eq!(err.to_string(), "private post");
        assert!(!err.is_structural());
    }

    #[test]
    fn failure_payload_without_message_uses_default() {
        let payload = json!({"success": false});
        let err = interpret(Platform::Tiktok, &payload).expect_err("must fail");
        assert_eq!(err.to_string(), PipelineError::GENERIC_UPSTREAM);
    }

    #[test]
    fn missing_success_field_is_a_failure() {
        let payload = json!({"urls": ["http://x/a.mp4"]});
        assert!(interpret(Platform::Instagram, &payload).is_err());
    }

    #[test]
    fn interpretation_is_idempotent() {
        let payload = json!({"success": true, "urls": ["http://x/a.mp4", "http://x/b.jpg"]});
        let first = interpret(Platform::Instagram, &payload).expect("interprets");
        let second = interpret(Platform::Instagram, &payload).expect("interprets");
        assert_eq!(first, second);
    }

    #[test]
    fn format_hint_round_trip() {
        for token in FormatHint::ALLOWED {
            let hint: FormatHint = token.parse().expect("allowed token parses");
            assert_eq!(hint.as_param(), *token);
        }
        assert!("4k".parse::<FormatHint>().is_err());
        assert_eq!(FormatHint::Mp3.kind(), MediaKind::Audio);
        assert_eq!(FormatHint::P720.kind(), MediaKind::Video);
    }
}
