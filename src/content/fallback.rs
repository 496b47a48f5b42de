//! Local substitutes used when an external stage fails
//!
//! Each one produces something playable so the pipeline never stops on a
//! service error.

use super::payload::{ArticlePayload, Paragraph, RawArticle, RawSentence, ToneScore};
use crate::consts::MAX_CURVINESS;

const PLACEHOLDER_TITLE: &str = "Sentence Surf";

const PLACEHOLDER_TEXT: &str = "\
Welcome to a game where reading becomes a ride across the page. \
Each sentence will become a platform in the game. \
Calm sentences lie almost flat, while excited ones twist and roll! \
Run to the end of every platform to earn a perfect surf bonus. \
Could you reach the final word without ever falling off?";

/// Article used when no content could be fetched
pub fn placeholder_article() -> RawArticle {
    RawArticle {
        title: PLACEHOLDER_TITLE.to_owned(),
        text: PLACEHOLDER_TEXT.to_owned(),
    }
}

/// Split text into sentences on terminal punctuation followed by whitespace
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let terminal = matches!(c, '.' | '!' | '?');
        let at_break = chars.peek().is_none_or(|next| next.is_whitespace());
        if terminal && at_break {
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
    }
    push_trimmed(&mut sentences, &current);
    sentences
}

fn push_trimmed(out: &mut Vec<String>, raw: &str) {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !collapsed.is_empty() {
        out.push(collapsed);
    }
}

/// Structure an article without the service: one sentence per paragraph
pub fn heuristic_structure(article: &RawArticle) -> ArticlePayload {
    let paragraphs = split_sentences(&article.text)
        .into_iter()
        .enumerate()
        .map(|(i, text)| Paragraph {
            sentences: vec![RawSentence {
                id: Some(format!("h{}", i)),
                text,
                length: None,
            }],
        })
        .collect();
    ArticlePayload { paragraphs }
}

/// Guess a sentence's curviness from its length and punctuation.
///
/// Longer sentences and exclamations read as more intense, questions a bit
/// less so, and each pause (comma, semicolon, colon, dash) adds a little.
pub fn heuristic_curviness(text: &str) -> f32 {
    let words = text.split_whitespace().count().min(30) as f32;
    let exclamations = text.matches('!').count().min(2) as f32;
    let questions = text.matches('?').count().min(2) as f32;
    let pauses = text
        .chars()
        .filter(|c| matches!(c, ',' | ';' | ':' | '-'))
        .count()
        .min(4) as f32;

    let score = 2.0 + words * 0.1 + exclamations * 2.0 + questions + pauses * 0.5;
    score.clamp(0.0, MAX_CURVINESS)
}

/// Heuristic scores for every sentence in order
pub fn heuristic_scores(texts: &[String]) -> Vec<ToneScore> {
    texts
        .iter()
        .map(|text| ToneScore {
            sentence: text.clone(),
            curviness: heuristic_curviness(text),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("One two.  Three four!\nFive? v1.2 stays whole. Trailing");
        assert_eq!(
            sentences,
            vec!["One two.", "Three four!", "Five?", "v1.2 stays whole.", "Trailing"]
        );
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_heuristic_structure_is_one_per_paragraph() {
        let payload = heuristic_structure(&placeholder_article());
        assert_eq!(payload.paragraphs.len(), 5);
        assert!(payload.paragraphs.iter().all(|p| p.sentences.len() == 1));
        assert_eq!(
            payload.paragraphs[1].sentences[0].text,
            "Each sentence will become a platform in the game."
        );
        assert_eq!(payload.paragraphs[1].sentences[0].id.as_deref(), Some("h1"));
    }

    #[test]
    fn test_heuristic_curviness_ordering() {
        let calm = heuristic_curviness("The tide went out.");
        let excited = heuristic_curviness("The tide went out!");
        let long = heuristic_curviness(
            "The tide went out slowly, and the boats, one after another, settled into the mud.",
        );
        assert!(excited > calm);
        assert!(long > calm);
        assert!((0.0..=MAX_CURVINESS).contains(&heuristic_curviness(&"wow! ".repeat(50))));
    }
}
