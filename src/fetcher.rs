//! Media download with per-kind size ceilings.
//!
//! Downloads a resolved candidate URL and hands the bytes to the delivery
//! port. Oversized payloads are discarded and classified, never delivered.

use crate::delivery::Delivery;
use crate::platforms::{MediaCandidate, MediaKind};
use lazy_regex::lazy_regex;
use reqwest::header::CONTENT_DISPOSITION;
use std::time::Duration;
use tracing::warn;

/// Bounded timeout for one media download.
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Ceiling for video and audio payloads (Telegram bot upload limit).
const MAX_AV_BYTES: usize = 50 * 1024 * 1024;

/// Ceiling for photo payloads.
const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// Filename inside a Content-Disposition header.
static RE_DISPOSITION_FILENAME: lazy_regex::Lazy<lazy_regex::Regex> =
    lazy_regex!(r#"filename="?([^";]+)"?"#);

/// Per-candidate result. The sequence of outcomes always matches the
/// candidate sequence in length and order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Bytes handed to the transport.
    Delivered,
    /// Payload exceeded the ceiling for its kind; bytes discarded.
    TooLarge { source_url: String },
    /// Download or transport hand-off failed.
    FetchFailed { source_url: String },
}

impl DeliveryOutcome {
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// The originating URL for non-delivered outcomes, for fallback links.
    #[must_use]
    pub fn failed_url(&self) -> Option<&str> {
        match self {
            Self::Delivered => None,
            Self::TooLarge { source_url } | Self::FetchFailed { source_url } => Some(source_url),
        }
    }
}

/// Downloads candidates and forwards them through a [`Delivery`].
pub struct MediaFetcher {
    http: reqwest::Client,
}

impl MediaFetcher {
    /// Builds a fetcher with the bounded download timeout. Redirects are
    /// followed (reqwest's default policy).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self { http })
    }

    /// Downloads one candidate and delivers it. Never returns an error:
    /// every failure mode maps onto a [`DeliveryOutcome`].
    pub async fn fetch_and_deliver(
        &self,
        delivery: &dyn Delivery,
        candidate: &MediaCandidate,
    ) -> DeliveryOutcome {
        let response = match self.http.get(&candidate.source_url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(url = %candidate.source_url, error = %e, "media download failed");
                return DeliveryOutcome::FetchFailed {
                    source_url: candidate.source_url.clone(),
                };
            }
        };

        if !response.status().is_success() {
            warn!(url = %candidate.source_url, status = %response.status(), "media download rejected");
            return DeliveryOutcome::FetchFailed {
                source_url: candidate.source_url.clone(),
            };
        }

        let filename = filename_from_headers(response.headers())
            .unwrap_or_else(|| fallback_filename(candidate));

        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                warn!(url = %candidate.source_url, error = %e, "media body read failed");
                return DeliveryOutcome::FetchFailed {
                    source_url: candidate.source_url.clone(),
                };
            }
        };

        if exceeds_ceiling(candidate.kind, bytes.len()) {
            warn!(
                url = %candidate.source_url,
                size = bytes.len(),
                "media payload exceeds size ceiling"
            );
            return DeliveryOutcome::TooLarge {
                source_url: candidate.source_url.clone(),
            };
        }

        match delivery
            .send_media(candidate.kind, bytes, &candidate.caption, &filename)
            .await
        {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => {
                warn!(url = %candidate.source_url, error = %e, "media hand-off to transport failed");
                DeliveryOutcome::FetchFailed {
                    source_url: candidate.source_url.clone(),
                }
            }
        }
    }
}

/// Strictly-greater-than: a payload of exactly the ceiling size is delivered.
pub(crate) const fn exceeds_ceiling(kind: MediaKind, len: usize) -> bool {
    len > size_ceiling(kind)
}

const fn size_ceiling(kind: MediaKind) -> usize {
    match kind {
        MediaKind::Video | MediaKind::Audio => MAX_AV_BYTES,
        MediaKind::Photo => MAX_PHOTO_BYTES,
    }
}

fn filename_from_headers(headers: &reqwest::header::HeaderMap) -> Option<String> {
    let raw = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;
    RE_DISPOSITION_FILENAME
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn fallback_filename(candidate: &MediaCandidate) -> String {
    format!(
        "{}.{}",
        candidate.suggested_name,
        candidate.kind.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    #[test]
    fn ceiling_is_strictly_greater_than() {
        assert!(!exceeds_ceiling(MediaKind::Video, MAX_AV_BYTES));
        assert!(exceeds_ceiling(MediaKind::Video, MAX_AV_BYTES + 1));
        assert!(!exceeds_ceiling(MediaKind::Audio, MAX_AV_BYTES));
        assert!(exceeds_ceiling(MediaKind::Audio, MAX_AV_BYTES + 1));
        assert!(!exceeds_ceiling(MediaKind::Photo, MAX_PHOTO_BYTES));
        assert!(exceeds_ceiling(MediaKind::Photo, MAX_PHOTO_BYTES + 1));
    }

    #[test]
    fn photo_ceiling_is_lower_than_video() {
        assert!(exceeds_ceiling(MediaKind::Photo, MAX_AV_BYTES));
    }

    #[test]
    fn filename_from_quoted_disposition() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static(r#"attachment; filename="clip.mp4""#),
        );
        assert_eq!(
            filename_from_headers(&headers),
            Some("clip.mp4".to_string())
        );
    }

    #[test]
    fn filename_from_unquoted_disposition() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=track.mp3; size=1"),
        );
        assert_eq!(
            filename_from_headers(&headers),
            Some("track.mp3".to_string())
        );
    }

    #[test]
    fn fallback_filename_uses_kind_extension() {
        let candidate = MediaCandidate {
            kind: MediaKind::Photo,
            source_url: "http://cdn/x".to_string(),
            caption: String::new(),
            suggested_name: "ig_2".to_string(),
        };
        assert_eq!(fallback_filename(&candidate), "ig_2.jpg");
    }
}
