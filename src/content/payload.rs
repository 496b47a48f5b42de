//! Data contracts with the external content, tone and narration services
//!
//! Only the fields the game needs; everything else in a service response is
//! ignored by serde.

use serde::{Deserialize, Serialize};

/// Extracted article text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub title: String,
    pub text: String,
}

/// One sentence as delivered by the structuring service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSentence {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    /// Word count, when the service supplies one
    #[serde(default)]
    pub length: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub sentences: Vec<RawSentence>,
}

/// Structured article: paragraphs of sentences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticlePayload {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

impl ArticlePayload {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sentences in reading order
    pub fn sentences(&self) -> impl Iterator<Item = &RawSentence> {
        self.paragraphs.iter().flat_map(|p| p.sentences.iter())
    }

    pub fn sentence_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.sentences.len()).sum()
    }

    /// Texts in reading order, as sent to the tone service
    pub fn texts(&self) -> Vec<String> {
        self.sentences().map(|s| s.text.clone()).collect()
    }
}

/// Tone score for one sentence, matched back by exact text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneScore {
    pub sentence: String,
    pub curviness: f32,
}

impl ToneScore {
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Playable narration audio; opaque to the game
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioClip {
    pub mime: String,
    pub data: Vec<u8>,
}
