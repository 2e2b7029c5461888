//! Practice session controller
//!
//! Owns the active word, the drawing surface and the feedback banner, and
//! drives the gateway for pronunciation and grading.
//!
//! ```text
//!            next / clear
//!   ┌──────────────────────────────┐
//!   ▼                              │
//! idle ──say/check──► info ──► correct | incorrect | idle | info
//! ```
//!
//! Session state is locked only between suspension points. Each `next_word`
//! and `clear` bumps an epoch; a gateway result that comes back under an older
//! epoch is dropped instead of overwriting newer feedback.

mod feedback;
mod words;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

pub use feedback::{
    CHECK_FAILED, CHECKING, CORRECT, Feedback, FeedbackKind, GETTING_PRONUNCIATION, INCORRECT,
    NO_PRONUNCIATION, PLAYBACK_FAILED, PRONUNCIATION_FAILED, WRITE_FIRST,
};
pub use words::WordList;

use crate::Result;
use crate::canvas::{MIN_SNAPSHOT_LEN, Point, Surface};
use crate::gateway::{InferenceGateway, Verdict};
use crate::voice::{AudioSink, PcmClip};

struct SessionState {
    words: WordList,
    surface: Surface,
    feedback: Feedback,
    epoch: u64,
}

impl SessionState {
    fn invalidate(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }
}

/// Clears the in-flight flag when a check finishes or its future is dropped
struct CheckGuard<'a>(&'a AtomicBool);

impl Drop for CheckGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Handwriting practice session
pub struct Session {
    gateway: Arc<dyn InferenceGateway>,
    audio: Arc<dyn AudioSink>,
    state: Mutex<SessionState>,
    checking: AtomicBool,
}

impl Session {
    /// Create a session on the first word with a default-sized surface
    ///
    /// # Errors
    ///
    /// Returns error if the word list is empty
    pub fn new(
        words: Vec<String>,
        gateway: Arc<dyn InferenceGateway>,
        audio: Arc<dyn AudioSink>,
    ) -> Result<Self> {
        Self::with_surface(words, Surface::default(), gateway, audio)
    }

    /// Create a session drawing on a specific surface
    ///
    /// # Errors
    ///
    /// Returns error if the word list is empty
    pub fn with_surface(
        words: Vec<String>,
        surface: Surface,
        gateway: Arc<dyn InferenceGateway>,
        audio: Arc<dyn AudioSink>,
    ) -> Result<Self> {
        Ok(Self {
            gateway,
            audio,
            state: Mutex::new(SessionState {
                words: WordList::new(words)?,
                surface,
                feedback: Feedback::idle(),
                epoch: 0,
            }),
            checking: AtomicBool::new(false),
        })
    }

    /// Word the learner should write
    pub async fn current_word(&self) -> String {
        self.state.lock().await.words.current().to_string()
    }

    /// Current feedback banner
    pub async fn feedback(&self) -> Feedback {
        self.state.lock().await.feedback.clone()
    }

    /// Whether a handwriting check is in flight
    #[must_use]
    pub fn is_checking(&self) -> bool {
        self.checking.load(Ordering::Acquire)
    }

    /// Start a stroke
    pub async fn pointer_down(&self, at: Point) {
        self.state.lock().await.surface.pointer_down(at);
    }

    /// Extend the active stroke, if any
    pub async fn pointer_move(&self, to: Point) {
        self.state.lock().await.surface.pointer_move(to);
    }

    /// End the active stroke
    pub async fn pointer_up(&self) {
        self.state.lock().await.surface.pointer_up();
    }

    /// End the active stroke when the pointer leaves the surface
    pub async fn pointer_leave(&self) {
        self.state.lock().await.surface.pointer_leave();
    }

    /// PNG of the current drawing, `None` when blank
    ///
    /// # Errors
    ///
    /// Returns error if PNG encoding fails
    pub async fn export_png(&self) -> Result<Option<Vec<u8>>> {
        self.state.lock().await.surface.export_png()
    }

    /// Wipe the drawing and reset feedback to idle
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.surface.clear();
        state.feedback = Feedback::idle();
        state.invalidate();
    }

    /// Advance to the next word, clearing the drawing and feedback
    pub async fn next_word(&self) -> String {
        let mut state = self.state.lock().await;
        state.words.advance();
        state.surface.clear();
        state.feedback = Feedback::idle();
        state.invalidate();

        let word = state.words.current().to_string();
        tracing::debug!(word = %word, position = state.words.position(), "next word");
        word
    }

    /// Fetch and play the active word's pronunciation
    ///
    /// Returns the resulting feedback.
    pub async fn request_pronunciation(&self) -> Feedback {
        let (word, epoch) = {
            let mut state = self.state.lock().await;
            state.feedback = Feedback::info(GETTING_PRONUNCIATION);
            (state.words.current().to_string(), state.epoch)
        };

        let outcome = match self.gateway.pronounce(&word).await {
            Ok(bytes) if bytes.is_empty() => {
                tracing::warn!(word = %word, "pronunciation response had no audio");
                Feedback::info(NO_PRONUNCIATION)
            }
            Ok(bytes) => {
                if self.is_stale(epoch).await {
                    tracing::debug!(word = %word, "dropping stale pronunciation");
                    return self.feedback().await;
                }
                self.play(&word, &bytes).await
            }
            Err(e) => {
                tracing::error!(word = %word, error = %e, "could not fetch pronunciation");
                Feedback::info(PRONUNCIATION_FAILED)
            }
        };

        self.settle(epoch, outcome).await
    }

    /// Grade the current drawing against the active word
    ///
    /// A blank drawing short-circuits without calling the gateway. While a
    /// check is in flight further checks are ignored and return the current
    /// feedback. Dropping the returned future releases the in-flight flag.
    pub async fn request_check(&self) -> Feedback {
        let (image, word, epoch, _guard) = {
            let mut state = self.state.lock().await;
            if self.checking.load(Ordering::Acquire) {
                tracing::debug!("check already in flight");
                return state.feedback.clone();
            }

            let image = match state.surface.export() {
                Ok(image) => image,
                Err(e) => {
                    tracing::error!(error = %e, "could not export drawing");
                    state.feedback = Feedback::info(CHECK_FAILED);
                    return state.feedback.clone();
                }
            };

            if image.len() < MIN_SNAPSHOT_LEN {
                state.feedback = Feedback::info(WRITE_FIRST);
                return state.feedback.clone();
            }

            self.checking.store(true, Ordering::Release);
            state.feedback = Feedback::info(CHECKING);
            (
                image,
                state.words.current().to_string(),
                state.epoch,
                CheckGuard(&self.checking),
            )
        };

        let outcome = match self.gateway.grade(&image, &word).await {
            Ok(answer) => {
                let verdict = Verdict::classify(&answer);
                tracing::info!(word = %word, ?verdict, "handwriting checked");
                Feedback::verdict(verdict)
            }
            Err(e) => {
                tracing::error!(word = %word, error = %e, "error checking handwriting");
                Feedback::info(CHECK_FAILED)
            }
        };

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            tracing::debug!(word = %word, "dropping stale grading result");
            return state.feedback.clone();
        }
        state.feedback = outcome;
        state.feedback.clone()
    }

    async fn play(&self, word: &str, bytes: &[u8]) -> Feedback {
        let clip = match PcmClip::from_le_bytes(bytes) {
            Ok(clip) => clip,
            Err(e) => {
                tracing::error!(word, error = %e, "failed to decode pronunciation");
                return Feedback::info(PLAYBACK_FAILED);
            }
        };

        match self.audio.play(&clip).await {
            Ok(()) => Feedback::idle(),
            Err(e) => {
                tracing::error!(word, error = %e, "failed to play pronunciation");
                Feedback::info(PLAYBACK_FAILED)
            }
        }
    }

    async fn is_stale(&self, epoch: u64) -> bool {
        self.state.lock().await.epoch != epoch
    }

    /// Apply a result unless the session moved on since it was requested
    async fn settle(&self, epoch: u64, outcome: Feedback) -> Feedback {
        let mut state = self.state.lock().await;
        if state.epoch == epoch {
            state.feedback = outcome;
        }
        state.feedback.clone()
    }
}
