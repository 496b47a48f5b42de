//! External data sources
//!
//! Article extraction, structuring, tone analysis and speech synthesis are
//! network services outside the game. They are modelled as async traits so
//! the pipeline can be driven by real clients on the web and by fixtures in
//! tests.

#![allow(async_fn_in_trait)]

use std::fmt;

use super::payload::{ArticlePayload, AudioClip, RawArticle, ToneScore};

/// An external source could not deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Service unreachable or returned a failure status
    Unavailable(String),
    /// Response did not match the expected shape
    Malformed(String),
    /// Response was well-formed but had nothing usable
    Empty,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unavailable(msg) => write!(f, "source unavailable: {}", msg),
            SourceError::Malformed(msg) => write!(f, "malformed response: {}", msg),
            SourceError::Empty => write!(f, "empty response"),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Malformed(err.to_string())
    }
}

/// Fetches readable article text for a URL
pub trait ContentSource {
    async fn fetch_article(&self, url: &str) -> Result<RawArticle, SourceError>;
}

/// Splits article text into paragraphs and sentences
pub trait StructureSource {
    async fn structure(&self, article: &RawArticle) -> Result<ArticlePayload, SourceError>;
}

/// Scores each sentence's curviness in [0, 10]
pub trait ToneSource {
    async fn score(&self, sentences: &[String]) -> Result<Vec<ToneScore>, SourceError>;
}

/// Synthesizes speech for a sentence or a single word
pub trait NarrationSource {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, SourceError>;
}

/// Source that always fails; stands in for a service that is not configured
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl ContentSource for Offline {
    async fn fetch_article(&self, _url: &str) -> Result<RawArticle, SourceError> {
        Err(SourceError::Unavailable("offline".into()))
    }
}

impl StructureSource for Offline {
    async fn structure(&self, _article: &RawArticle) -> Result<ArticlePayload, SourceError> {
        Err(SourceError::Unavailable("offline".into()))
    }
}

impl ToneSource for Offline {
    async fn score(&self, _sentences: &[String]) -> Result<Vec<ToneScore>, SourceError> {
        Err(SourceError::Unavailable("offline".into()))
    }
}

impl NarrationSource for Offline {
    async fn synthesize(&self, _text: &str) -> Result<AudioClip, SourceError> {
        Err(SourceError::Unavailable("offline".into()))
    }
}

/// Narration spoken by the host's own speech engine: the clip carries the
/// text itself as `text/plain`
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeakText;

impl NarrationSource for SpeakText {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, SourceError> {
        Ok(AudioClip {
            mime: SPEAK_TEXT_MIME.into(),
            data: text.as_bytes().to_vec(),
        })
    }
}

/// Mime type of clips produced by [`SpeakText`]
pub const SPEAK_TEXT_MIME: &str = "text/plain";

/// Article text supplied up front (pasted text, bundled demo)
#[derive(Debug, Clone, Default)]
pub struct StaticArticle(pub RawArticle);

impl ContentSource for StaticArticle {
    async fn fetch_article(&self, _url: &str) -> Result<RawArticle, SourceError> {
        Ok(self.0.clone())
    }
}
