//! User-facing feedback state

use serde::Serialize;

use crate::gateway::Verdict;

pub const GETTING_PRONUNCIATION: &str = "Getting pronunciation...";
pub const NO_PRONUNCIATION: &str = "Could not get pronunciation.";
pub const PRONUNCIATION_FAILED: &str = "Could not fetch pronunciation.";
pub const PLAYBACK_FAILED: &str = "Could not play the pronunciation audio.";
pub const WRITE_FIRST: &str = "Please write the word first.";
pub const CHECKING: &str = "Checking...";
pub const CORRECT: &str = "Correct!";
pub const INCORRECT: &str = "Incorrect, please try again.";
pub const CHECK_FAILED: &str = "Error checking handwriting. Please try again.";

/// Styling class of the feedback banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    #[default]
    Idle,
    Info,
    Correct,
    Incorrect,
}

/// Feedback kind plus the message shown with it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
}

impl Feedback {
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn info(message: &str) -> Self {
        Self {
            kind: FeedbackKind::Info,
            message: message.to_string(),
        }
    }

    /// Feedback for a graded attempt
    #[must_use]
    pub fn verdict(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Correct => Self {
                kind: FeedbackKind::Correct,
                message: CORRECT.to_string(),
            },
            Verdict::Incorrect => Self {
                kind: FeedbackKind::Incorrect,
                message: INCORRECT.to_string(),
            },
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.kind == FeedbackKind::Idle
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            FeedbackKind::Idle => f.write_str("(idle)"),
            FeedbackKind::Info => write!(f, "[info] {}", self.message),
            FeedbackKind::Correct => write!(f, "[correct] {}", self.message),
            FeedbackKind::Incorrect => write!(f, "[incorrect] {}", self.message),
        }
    }
}
