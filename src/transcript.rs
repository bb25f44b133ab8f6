//! Video caption transcripts.
//!
//! Captions are fetched with `yt-dlp` (manual subtitles first, automatic
//! captions as fallback) and flattened from WebVTT to plain text.

use crate::config::Settings;
use crate::error::{DocentError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};
use url::Url;

/// Plain-text captions of one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub video_id: String,
    pub text: String,
}

/// Where video transcripts come from.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for a video URL or id.
    async fn fetch(&self, video: &str) -> Result<Transcript>;
}

/// YouTube captions via `yt-dlp`.
pub struct YoutubeTranscripts {
    video_id_regex: Regex,
    languages: String,
}

impl YoutubeTranscripts {
    /// `languages` is a yt-dlp `--sub-langs` expression such as `en.*,en`.
    pub fn new(languages: impl Into<String>) -> Result<Self> {
        let video_id_regex = Regex::new(r"^[a-zA-Z0-9_-]{11}$")
            .map_err(|e| DocentError::Config(format!("Invalid video id pattern: {}", e)))?;

        Ok(Self {
            video_id_regex,
            languages: languages.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.youtube.subtitle_languages.clone())
    }

    /// Video id from a bare id or a watch, short-link, embed or shorts URL.
    pub fn extract_video_id(&self, input: &str) -> Option<String> {
        let input = input.trim();
        if self.video_id_regex.is_match(input) {
            return Some(input.to_string());
        }

        let url = if input.contains("://") {
            Url::parse(input)
        } else {
            Url::parse(&format!("https://{}", input))
        }
        .ok()?;

        let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");
        let candidate = match host {
            "youtu.be" => url.path_segments()?.next().map(str::to_string),
            "youtube.com" => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
                .or_else(|| {
                    let mut segments = url.path_segments()?;
                    match segments.next()? {
                        "embed" | "shorts" | "v" | "live" => segments.next().map(str::to_string),
                        _ => None,
                    }
                }),
            _ => None,
        };

        candidate.filter(|id| self.video_id_regex.is_match(id))
    }

    async fn download_captions(&self, video_id: &str, dir: &Path) -> Result<PathBuf> {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);
        let template = dir.join("%(id)s.%(ext)s");

        let result = Command::new("yt-dlp")
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-langs").arg(&self.languages)
            .arg("--sub-format").arg("vtt")
            .arg("--output").arg(&template)
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(&url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DocentError::ToolNotFound("yt-dlp".into()));
            }
            Err(e) => {
                return Err(DocentError::TranscriptUnavailable(format!(
                    "yt-dlp execution failed: {e}"
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocentError::TranscriptUnavailable(format!(
                "Transcript not available for video {video_id}: {}",
                stderr.trim()
            )));
        }

        find_caption_file(dir, video_id)
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscripts {
    #[instrument(skip(self))]
    async fn fetch(&self, video: &str) -> Result<Transcript> {
        let video_id = self.extract_video_id(video).ok_or_else(|| {
            DocentError::InvalidInput(format!("Invalid YouTube video ID or URL: {}", video))
        })?;

        let dir = tempfile::tempdir()?;
        let path = self.download_captions(&video_id, dir.path()).await?;
        debug!("Parsing captions from {:?}", path);

        let vtt = tokio::fs::read_to_string(&path).await?;
        let text = vtt_to_text(&vtt);
        if text.trim().is_empty() {
            return Err(DocentError::TranscriptUnavailable(format!(
                "Transcript not available for video {}",
                video_id
            )));
        }

        info!(chars = text.len(), "Fetched transcript");
        Ok(Transcript { video_id, text })
    }
}

/// First `.vtt` file written for `video_id`, by name.
fn find_caption_file(dir: &Path, video_id: &str) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            name.starts_with(video_id) && name.ends_with(".vtt")
        })
        .collect();
    candidates.sort();

    candidates.into_iter().next().ok_or_else(|| {
        DocentError::TranscriptUnavailable(format!(
            "Transcript not available for video {}",
            video_id
        ))
    })
}

/// Flatten WebVTT captions to a single line of text.
///
/// Drops the header, cue identifiers, timing lines and inline markup.
/// Automatic captions repeat each line as it scrolls, so a line equal to the
/// previous one is skipped.
pub fn vtt_to_text(vtt: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_header = true;
    let mut skipping_block = false;

    for raw in vtt.lines() {
        let line = raw.trim();

        if line.is_empty() {
            in_header = false;
            skipping_block = false;
            continue;
        }
        if in_header || skipping_block {
            continue;
        }
        if line.starts_with("NOTE") || line.starts_with("STYLE") || line.starts_with("REGION") {
            skipping_block = true;
            continue;
        }
        if line.contains("-->") || line.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let cleaned = decode_entities(&strip_tags(line));
        let cleaned = cleaned.trim();
        if cleaned.is_empty() || lines.last().is_some_and(|prev| prev == cleaned) {
            continue;
        }
        lines.push(cleaned.to_string());
    }

    lines.join(" ")
}

fn strip_tags(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_tag = false;
    for c in line.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn decode_entities(line: &str) -> String {
    line.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
