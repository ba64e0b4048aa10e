use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::media::{RenderSettings, Resolution};
use crate::providers::youtube::DEFAULT_TIMEDTEXT_ENDPOINT;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Transcript retrieval settings
    #[serde(default)]
    pub transcript: TranscriptConfig,

    /// Render output settings
    #[serde(default)]
    pub render: RenderConfig,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Summarizer provider settings
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transcript: TranscriptConfig::default(),
            render: RenderConfig::default(),
            tools: ToolsConfig::default(),
            summarizer: SummarizerConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Validate the configuration after loading and CLI overrides
    pub fn validate(&self) -> Result<()> {
        if self.transcript.language.is_empty() {
            return Err(anyhow!("Transcript language must not be empty"));
        }

        if self.render.width == 0 || self.render.height == 0 {
            return Err(anyhow!(
                "Render resolution must be non-zero, got {}x{}",
                self.render.width,
                self.render.height
            ));
        }

        if self.render.font_size == 0 {
            return Err(anyhow!("Caption font size must be non-zero"));
        }

        if self.render.video_bitrate.is_empty() || self.render.audio_bitrate.is_empty() {
            return Err(anyhow!("Render bitrates must not be empty"));
        }

        if self.tools.download_timeout_secs == 0 || self.tools.encode_timeout_secs == 0 {
            return Err(anyhow!("Tool timeouts must be non-zero"));
        }

        Ok(())
    }
}

/// Transcript retrieval configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptConfig {
    /// Language track to select (source language of the captions)
    #[serde(default = "default_transcript_language")]
    pub language: String,

    /// Retrieval service endpoint
    #[serde(default = "default_timedtext_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            language: default_transcript_language(),
            endpoint: default_timedtext_endpoint(),
            timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Render output configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderConfig {
    /// Target canvas width in pixels
    #[serde(default = "default_render_width")]
    pub width: u32,

    /// Target canvas height in pixels
    #[serde(default = "default_render_height")]
    pub height: u32,

    /// Video bitrate for the final encode
    #[serde(default = "default_video_bitrate")]
    pub video_bitrate: String,

    /// Audio bitrate for the final encode
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Caption font size in points
    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_render_width(),
            height: default_render_height(),
            video_bitrate: default_video_bitrate(),
            audio_bitrate: default_audio_bitrate(),
            font_size: default_font_size(),
        }
    }
}

impl RenderConfig {
    /// Encode settings for the compositor
    pub fn settings(&self) -> RenderSettings {
        RenderSettings {
            resolution: Resolution {
                width: self.width,
                height: self.height,
            },
            video_bitrate: self.video_bitrate.clone(),
            audio_bitrate: self.audio_bitrate.clone(),
            font_size: self.font_size,
        }
    }
}

/// External tool configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolsConfig {
    /// ffmpeg binary path or name
    #[serde(default = "default_ffmpeg_binary")]
    pub ffmpeg: String,

    /// yt-dlp binary path or name
    #[serde(default = "default_ytdlp_binary")]
    pub ytdlp: String,

    /// Download timeout in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    /// Trim/render timeout in seconds
    #[serde(default = "default_encode_timeout_secs")]
    pub encode_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg_binary(),
            ytdlp: default_ytdlp_binary(),
            download_timeout_secs: default_download_timeout_secs(),
            encode_timeout_secs: default_encode_timeout_secs(),
        }
    }
}

/// Summarizer provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SummarizerConfig {
    /// Model name (e.g., "gpt-4o-mini", "gpt-3.5-turbo")
    #[serde(default = "default_summarizer_model")]
    pub model: String,

    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL (optional, for self-hosted)
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// System prompt for the summary request
    #[serde(default = "default_summarizer_prompt")]
    pub system_prompt: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: default_summarizer_model(),
            api_key: String::new(),
            endpoint: String::new(),
            system_prompt: default_summarizer_prompt(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_transcript_language() -> String {
    "en".to_string()
}

fn default_timedtext_endpoint() -> String {
    DEFAULT_TIMEDTEXT_ENDPOINT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_render_width() -> u32 {
    1280
}

fn default_render_height() -> u32 {
    720
}

fn default_video_bitrate() -> String {
    "2500k".to_string()
}

fn default_audio_bitrate() -> String {
    "192k".to_string()
}

fn default_font_size() -> u32 {
    48
}

fn default_ffmpeg_binary() -> String {
    "ffmpeg".to_string()
}

fn default_ytdlp_binary() -> String {
    "yt-dlp".to_string()
}

fn default_download_timeout_secs() -> u64 {
    600
}

fn default_encode_timeout_secs() -> u64 {
    600
}

fn default_summarizer_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_summarizer_prompt() -> String {
    "Summarize a text".to_string()
}
