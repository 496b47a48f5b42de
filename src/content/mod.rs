//! Article content: external contracts, fallbacks and the loading pipeline

pub mod fallback;
pub mod narration;
pub mod payload;
pub mod pipeline;
pub mod sources;

pub use fallback::{heuristic_curviness, heuristic_structure, placeholder_article};
pub use narration::{
    NarrationQueue, NarrationRequest, ReadyClip, drain_narration, narrate_next,
};
pub use payload::{ArticlePayload, AudioClip, Paragraph, RawArticle, RawSentence, ToneScore};
pub use pipeline::{LoadError, LoadedContent, Stage, StageOutcome, load_content};
pub use sources::{
    ContentSource, NarrationSource, Offline, SourceError, SpeakText, StaticArticle,
    StructureSource, ToneSource,
};
