//! Content loading pipeline
//!
//! fetch → structure → score → sentences, strictly in that order. Every stage
//! returns a [`StageOutcome`]: the service's data, or a local substitute plus
//! the reason it was needed. The orchestrator just feeds each outcome's value
//! into the next stage, so the fallback policy lives in the stage functions
//! rather than in nested error handling.

use std::collections::HashMap;
use std::fmt;

use super::fallback::{heuristic_scores, heuristic_structure, placeholder_article};
use super::payload::{ArticlePayload, RawArticle, ToneScore};
use super::sources::{ContentSource, SourceError, StructureSource, ToneSource};
use crate::level::Sentence;

/// Pipeline stage names, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    Structure,
    Score,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Structure => "structure",
            Stage::Score => "score",
        };
        f.write_str(name)
    }
}

/// Result of one stage: real data, or a usable substitute
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Fresh(T),
    Degraded { value: T, reason: String },
}

impl<T> StageOutcome<T> {
    /// Keep `result` if it is usable, otherwise substitute `fallback()`
    pub fn or_fallback(result: Result<T, SourceError>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(value) => StageOutcome::Fresh(value),
            Err(err) => StageOutcome::Degraded {
                value: fallback(),
                reason: err.to_string(),
            },
        }
    }

    pub fn value(&self) -> &T {
        match self {
            StageOutcome::Fresh(value) | StageOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            StageOutcome::Fresh(value) | StageOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            StageOutcome::Fresh(_) => None,
            StageOutcome::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StageOutcome::Degraded { .. })
    }
}

/// Every fallback ran and still nothing is playable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    NoPlayableSentences { dropped: usize },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NoPlayableSentences { dropped } => write!(
                f,
                "could not load: no playable sentences ({} too short)",
                dropped
            ),
        }
    }
}

impl std::error::Error for LoadError {}

/// Scored sentences ready for level assembly
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedContent {
    pub title: String,
    pub sentences: Vec<Sentence>,
    /// Stages that fell back, with why
    pub degraded: Vec<(Stage, String)>,
}

impl LoadedContent {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Fetch stage: placeholder article on failure or empty text
pub async fn fetch_stage<C: ContentSource>(source: &C, url: &str) -> StageOutcome<RawArticle> {
    let result = source.fetch_article(url).await.and_then(|article| {
        if article.text.trim().is_empty() {
            Err(SourceError::Empty)
        } else {
            Ok(article)
        }
    });
    StageOutcome::or_fallback(result, placeholder_article)
}

/// Structure stage: one-sentence-per-paragraph split on failure or no sentences
pub async fn structure_stage<S: StructureSource>(
    source: &S,
    article: &RawArticle,
) -> StageOutcome<ArticlePayload> {
    let result = source.structure(article).await.and_then(|payload| {
        if payload.sentences().any(|s| !s.text.trim().is_empty()) {
            Ok(payload)
        } else {
            Err(SourceError::Empty)
        }
    });
    StageOutcome::or_fallback(result, || heuristic_structure(article))
}

/// Score stage: length/punctuation heuristic on failure
pub async fn score_stage<T: ToneSource>(
    source: &T,
    payload: &ArticlePayload,
) -> StageOutcome<Vec<ToneScore>> {
    let texts = payload.texts();
    let result = source.score(&texts).await;
    StageOutcome::or_fallback(result, || heuristic_scores(&texts))
}

/// Attach scores to sentences by exact text; unmatched ones get `default_curviness`
pub fn assemble_sentences(
    payload: &ArticlePayload,
    scores: &[ToneScore],
    default_curviness: f32,
) -> Vec<Sentence> {
    let by_text: HashMap<&str, f32> = scores
        .iter()
        .map(|s| (s.sentence.as_str(), s.curviness))
        .collect();

    payload
        .paragraphs
        .iter()
        .enumerate()
        .flat_map(|(p, paragraph)| {
            paragraph
                .sentences
                .iter()
                .enumerate()
                .map(move |(s, raw)| (p, s, raw))
        })
        .map(|(p, s, raw)| {
            let id = raw.id.clone().unwrap_or_else(|| format!("p{}s{}", p, s));
            let curviness = by_text
                .get(raw.text.as_str())
                .copied()
                .unwrap_or(default_curviness);
            match raw.length {
                Some(words) => Sentence::with_word_count(id, raw.text.clone(), words, curviness),
                None => Sentence::new(id, raw.text.clone(), curviness),
            }
        })
        .collect()
}

/// Run the whole pipeline for `url`.
///
/// Stage failures only degrade the result. The one error is ending up with no
/// sentence long enough to build a platform from.
pub async fn load_content<C, S, T>(
    url: &str,
    content: &C,
    structurer: &S,
    tone: &T,
    default_curviness: f32,
) -> Result<LoadedContent, LoadError>
where
    C: ContentSource,
    S: StructureSource,
    T: ToneSource,
{
    let mut degraded = Vec::new();
    let mut note = |stage: Stage, reason: Option<&str>| {
        if let Some(reason) = reason {
            log::warn!("{} stage degraded: {}", stage, reason);
            degraded.push((stage, reason.to_owned()));
        }
    };

    let article = fetch_stage(content, url).await;
    note(Stage::Fetch, article.degraded_reason());
    let article = article.into_value();

    let payload = structure_stage(structurer, &article).await;
    note(Stage::Structure, payload.degraded_reason());
    let payload = payload.into_value();

    let scores = score_stage(tone, &payload).await;
    note(Stage::Score, scores.degraded_reason());
    let scores = scores.into_value();

    let sentences = assemble_sentences(&payload, &scores, default_curviness);
    let playable = sentences.iter().filter(|s| s.is_playable()).count();
    if playable == 0 {
        log::error!("No playable sentences in {:?}", article.title);
        return Err(LoadError::NoPlayableSentences {
            dropped: sentences.len(),
        });
    }

    log::info!(
        "Loaded {:?}: {} sentences ({} playable), {} degraded stages",
        article.title,
        sentences.len(),
        playable,
        degraded.len()
    );

    Ok(LoadedContent {
        title: article.title,
        sentences,
        degraded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_CURVINESS;
    use crate::content::payload::{Paragraph, RawSentence};
    use crate::content::sources::{Offline, StaticArticle};

    struct FixedStructure(ArticlePayload);

    impl StructureSource for FixedStructure {
        async fn structure(&self, _article: &RawArticle) -> Result<ArticlePayload, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct FixedTone(Vec<ToneScore>);

    impl ToneSource for FixedTone {
        async fn score(&self, _sentences: &[String]) -> Result<Vec<ToneScore>, SourceError> {
            Ok(self.0.clone())
        }
    }

    fn raw(text: &str, length: Option<usize>) -> RawSentence {
        RawSentence {
            id: None,
            text: text.to_owned(),
            length,
        }
    }

    #[test]
    fn test_everything_offline_uses_fallbacks() {
        let loaded = pollster::block_on(load_content(
            "https://example.com/story",
            &Offline,
            &Offline,
            &Offline,
            DEFAULT_CURVINESS,
        ))
        .unwrap();

        assert_eq!(loaded.sentences.len(), 5);
        let stages: Vec<Stage> = loaded.degraded.iter().map(|(s, _)| *s).collect();
        assert_eq!(stages, vec![Stage::Fetch, Stage::Structure, Stage::Score]);
        // Heuristic scores match by text, so nothing gets the default
        assert!(
            loaded
                .sentences
                .iter()
                .all(|s| s.curviness == crate::content::heuristic_curviness(&s.text))
        );
    }

    #[test]
    fn test_services_used_when_available() {
        let article = StaticArticle(RawArticle {
            title: "Tides".into(),
            text: "ignored by the fixed structurer".into(),
        });
        let structure = FixedStructure(ArticlePayload {
            paragraphs: vec![Paragraph {
                sentences: vec![
                    raw("The tide came in over the flats.", None),
                    raw("Nobody saw it coming.", Some(4)),
                ],
            }],
        });
        let tone = FixedTone(vec![ToneScore {
            sentence: "The tide came in over the flats.".into(),
            curviness: 12.0,
        }]);

        let loaded = pollster::block_on(load_content("u", &article, &structure, &tone, 3.0)).unwrap();
        assert!(!loaded.is_degraded());
        assert_eq!(loaded.title, "Tides");
        // Out-of-range score clamped; unmatched sentence gets the default
        assert_eq!(loaded.sentences[0].curviness, 10.0);
        assert_eq!(loaded.sentences[1].curviness, 3.0);
        assert_eq!(loaded.sentences[1].word_count, 4);
        assert_eq!(loaded.sentences[0].id, "p0s0");
    }

    #[test]
    fn test_empty_structure_falls_back() {
        let article = StaticArticle(RawArticle {
            title: String::new(),
            text: "A complete first sentence here. And a second complete one.".into(),
        });
        let structure = FixedStructure(ArticlePayload::default());
        let loaded =
            pollster::block_on(load_content("u", &article, &structure, &Offline, 5.0)).unwrap();
        assert_eq!(loaded.degraded[0], (Stage::Structure, "empty response".to_string()));
        assert_eq!(loaded.sentences.len(), 2);
    }

    #[test]
    fn test_nothing_playable_is_an_error() {
        let article = StaticArticle(RawArticle {
            title: String::new(),
            text: "Hi. Bye now.".into(),
        });
        let err = pollster::block_on(load_content("u", &article, &Offline, &Offline, 5.0))
            .unwrap_err();
        assert_eq!(err, LoadError::NoPlayableSentences { dropped: 2 });
        assert!(err.to_string().starts_with("could not load"));
    }

    #[test]
    fn test_stage_outcome_accessors() {
        let fresh: StageOutcome<u32> = StageOutcome::or_fallback(Ok(3), || 0);
        assert!(!fresh.is_degraded());
        assert_eq!(*fresh.value(), 3);

        let degraded: StageOutcome<u32> =
            StageOutcome::or_fallback(Err(SourceError::Empty), || 7);
        assert_eq!(degraded.degraded_reason(), Some("empty response"));
        assert_eq!(degraded.into_value(), 7);
    }
}
