//! Sequential narration queue
//!
//! Sentences are narrated when a platform is entered, words as they are
//! crossed. Requests go to the speech service one at a time. Stopping clears
//! the queue and bumps a generation counter; results from an older generation
//! are dropped when they arrive instead of aborting the request.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::payload::AudioClip;
use super::sources::NarrationSource;
use crate::level::Level;
use crate::sim::GameEvent;

/// Most requests kept waiting; older ones are dropped first
pub const MAX_PENDING: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationKind {
    Sentence { platform: usize },
    Word { platform: usize, word_index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationRequest {
    pub kind: NarrationKind,
    pub text: String,
}

/// A request taken off the queue, tagged with the generation it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationJob {
    pub generation: u64,
    pub request: NarrationRequest,
}

/// Audio ready to play
#[derive(Debug, Clone, PartialEq)]
pub struct ReadyClip {
    pub request: NarrationRequest,
    pub clip: AudioClip,
}

#[derive(Debug, Default)]
pub struct NarrationQueue {
    pending: VecDeque<NarrationRequest>,
    generation: u64,
    in_flight: bool,
    enabled: bool,
}

impl NarrationQueue {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.stop();
        }
    }

    pub fn enqueue(&mut self, request: NarrationRequest) {
        if !self.enabled {
            return;
        }
        if self.pending.len() >= MAX_PENDING {
            if let Some(dropped) = self.pending.pop_front() {
                log::debug!("Narration backlog full, dropping {:?}", dropped.text);
            }
        }
        self.pending.push_back(request);
    }

    /// Queue narration for the events of one frame
    pub fn enqueue_events(&mut self, events: &[GameEvent], level: &Level) {
        for event in events {
            match event {
                GameEvent::PlatformEntered { platform } => {
                    if let Some(p) = level.platform(*platform) {
                        self.enqueue(NarrationRequest {
                            kind: NarrationKind::Sentence {
                                platform: *platform,
                            },
                            text: p.sentence.text.clone(),
                        });
                    }
                }
                GameEvent::WordCrossed {
                    platform,
                    word_index,
                    word,
                } => self.enqueue(NarrationRequest {
                    kind: NarrationKind::Word {
                        platform: *platform,
                        word_index: *word_index,
                    },
                    text: word.clone(),
                }),
                _ => {}
            }
        }
    }

    /// Take the next request, unless one is already being synthesized
    pub fn next_job(&mut self) -> Option<NarrationJob> {
        if self.in_flight {
            return None;
        }
        let request = self.pending.pop_front()?;
        self.in_flight = true;
        Some(NarrationJob {
            generation: self.generation,
            request,
        })
    }

    /// Hand back a finished job. Stale or failed results yield nothing.
    pub fn complete(
        &mut self,
        job: NarrationJob,
        result: Result<AudioClip, super::SourceError>,
    ) -> Option<ReadyClip> {
        if job.generation != self.generation {
            log::debug!("Ignoring late narration for {:?}", job.request.text);
            return None;
        }
        self.in_flight = false;
        match result {
            Ok(clip) => Some(ReadyClip {
                request: job.request,
                clip,
            }),
            Err(err) => {
                log::warn!("Narration skipped for {:?}: {}", job.request.text, err);
                None
            }
        }
    }

    /// Drop everything queued; in-flight results will be ignored
    pub fn stop(&mut self) {
        self.pending.clear();
        self.generation += 1;
        self.in_flight = false;
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        !self.in_flight && self.pending.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Synthesize the next queued request.
///
/// The queue is only borrowed around the await, so `stop()` can run while the
/// request is outstanding.
pub async fn narrate_next<N: NarrationSource>(
    queue: &RefCell<NarrationQueue>,
    source: &N,
) -> Option<ReadyClip> {
    let job = queue.borrow_mut().next_job()?;
    let result = source.synthesize(&job.request.text).await;
    queue.borrow_mut().complete(job, result)
}

/// Synthesize queued requests until the queue runs dry.
///
/// Stops early if a job is already in flight elsewhere. Failed requests are
/// skipped; stale ones are dropped.
pub async fn drain_narration<N: NarrationSource>(
    queue: &RefCell<NarrationQueue>,
    source: &N,
) -> Vec<ReadyClip> {
    let mut ready = Vec::new();
    loop {
        let Some(job) = queue.borrow_mut().next_job() else {
            break;
        };
        let result = source.synthesize(&job.request.text).await;
        if let Some(clip) = queue.borrow_mut().complete(job, result) {
            ready.push(clip);
        }
    }
    ready
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::sources::{Offline, SourceError};
    use crate::geometry::GeometryCache;
    use crate::level::{Sentence, build_level};

    struct Echo;

    impl NarrationSource for Echo {
        async fn synthesize(&self, text: &str) -> Result<AudioClip, SourceError> {
            Ok(AudioClip {
                mime: "audio/mpeg".into(),
                data: text.as_bytes().to_vec(),
            })
        }
    }

    fn word(index: usize, text: &str) -> NarrationRequest {
        NarrationRequest {
            kind: NarrationKind::Word {
                platform: 0,
                word_index: index,
            },
            text: text.into(),
        }
    }

    #[test]
    fn test_one_request_at_a_time() {
        let mut queue = NarrationQueue::new(true);
        queue.enqueue(word(1, "quick"));
        queue.enqueue(word(2, "brown"));

        let job = queue.next_job().unwrap();
        assert_eq!(job.request.text, "quick");
        assert!(queue.next_job().is_none());

        let ready = queue.complete(job, Ok(AudioClip::default())).unwrap();
        assert_eq!(ready.request.text, "quick");
        assert_eq!(queue.next_job().unwrap().request.text, "brown");
    }

    #[test]
    fn test_stop_discards_late_results() {
        let mut queue = NarrationQueue::new(true);
        queue.enqueue(word(1, "quick"));
        queue.enqueue(word(2, "brown"));
        let job = queue.next_job().unwrap();

        queue.stop();
        assert_eq!(queue.pending_len(), 0);
        assert!(queue.complete(job, Ok(AudioClip::default())).is_none());
        assert!(queue.is_idle());
        assert_eq!(queue.generation(), 1);
    }

    #[test]
    fn test_failures_are_skipped() {
        let queue = RefCell::new(NarrationQueue::new(true));
        queue.borrow_mut().enqueue(word(1, "quick"));
        queue.borrow_mut().enqueue(word(2, "brown"));

        assert!(pollster::block_on(narrate_next(&queue, &Offline)).is_none());
        let ready = pollster::block_on(narrate_next(&queue, &Echo)).unwrap();
        assert_eq!(ready.clip.data, b"brown".to_vec());
        assert!(queue.borrow().is_idle());
    }

    #[test]
    fn test_drain_empties_queue() {
        let queue = RefCell::new(NarrationQueue::new(true));
        for (i, w) in ["quick", "brown", "fox"].into_iter().enumerate() {
            queue.borrow_mut().enqueue(word(i, w));
        }

        let ready = pollster::block_on(drain_narration(&queue, &Echo));
        let texts: Vec<&str> = ready.iter().map(|r| r.request.text.as_str()).collect();
        assert_eq!(texts, ["quick", "brown", "fox"]);
        assert!(queue.borrow().is_idle());

        // Offline drops every request but still empties the queue
        queue.borrow_mut().enqueue(word(4, "jumps"));
        assert!(pollster::block_on(drain_narration(&queue, &Offline)).is_empty());
        assert!(queue.borrow().is_idle());
    }

    #[test]
    fn test_drain_waits_for_in_flight_job() {
        let queue = RefCell::new(NarrationQueue::new(true));
        queue.borrow_mut().enqueue(word(1, "quick"));
        queue.borrow_mut().enqueue(word(2, "brown"));
        let job = queue.borrow_mut().next_job().unwrap();

        assert!(pollster::block_on(drain_narration(&queue, &Echo)).is_empty());
        assert_eq!(queue.borrow().pending_len(), 1);
        queue.borrow_mut().complete(job, Ok(AudioClip::default()));
        assert_eq!(pollster::block_on(drain_narration(&queue, &Echo)).len(), 1);
    }

    #[test]
    fn test_events_become_requests() {
        let level = build_level(
            &[Sentence::new("s", "The quick brown fox.", 1.0)],
            &mut GeometryCache::default(),
        );
        let mut queue = NarrationQueue::new(true);
        queue.enqueue_events(
            &[
                GameEvent::PlatformEntered { platform: 0 },
                GameEvent::Jumped,
                GameEvent::WordCrossed {
                    platform: 0,
                    word_index: 1,
                    word: "quick".into(),
                },
            ],
            &level,
        );
        assert_eq!(queue.pending_len(), 2);
        assert_eq!(queue.next_job().unwrap().request.text, "The quick brown fox.");
    }

    #[test]
    fn test_disabled_queue_ignores_requests() {
        let mut queue = NarrationQueue::new(false);
        queue.enqueue(word(1, "quick"));
        assert!(queue.is_idle());
    }

    #[test]
    fn test_backlog_is_bounded() {
        let mut queue = NarrationQueue::new(true);
        for i in 0..(MAX_PENDING + 5) {
            queue.enqueue(word(i, "w"));
        }
        assert_eq!(queue.pending_len(), MAX_PENDING);
        let job = queue.next_job().unwrap();
        assert_eq!(
            job.request.kind,
            NarrationKind::Word {
                platform: 0,
                word_index: 5
            }
        );
    }
}
