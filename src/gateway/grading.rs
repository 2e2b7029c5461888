//! Grading convention for model answers

use serde::Serialize;

/// Outcome of a handwriting check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    /// Classify the grader's answer
    ///
    /// An answer passes when its trimmed, lowercased form starts with
    /// `correct`. Everything else fails, including "incorrect".
    #[must_use]
    pub fn classify(answer: &str) -> Self {
        if answer.trim().to_lowercase().starts_with("correct") {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }

    #[must_use]
    pub const fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_variants() {
        for answer in ["Correct", "Correct.", "correct", "  CORRECT\n", "Correct!"] {
            assert_eq!(Verdict::classify(answer), Verdict::Correct, "{answer:?}");
        }
    }

    #[test]
    fn incorrect_variants() {
        for answer in [
            "Incorrect",
            "incorrect, try again",
            "",
            "   ",
            "Not correct",
            "The word is correct",
        ] {
            assert_eq!(Verdict::classify(answer), Verdict::Incorrect, "{answer:?}");
        }
    }

    #[test]
    fn prefix_match_is_loose() {
        // Only the prefix matters
        assert!(Verdict::classify("Correctly written").is_correct());
    }
}
