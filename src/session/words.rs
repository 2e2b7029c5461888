//! Fixed practice word list with a round-robin cursor

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
    cursor: usize,
}

impl WordList {
    /// Create a list positioned at its first word
    ///
    /// # Errors
    ///
    /// Returns error if the list is empty
    pub fn new(words: Vec<String>) -> Result<Self> {
        if words.is_empty() {
            return Err(Error::Config("practice word list is empty".to_string()));
        }
        Ok(Self { words, cursor: 0 })
    }

    /// The active word
    #[must_use]
    pub fn current(&self) -> &str {
        &self.words[self.cursor]
    }

    /// Move to the next word, wrapping after the last one
    pub fn advance(&mut self) -> &str {
        self.cursor = (self.cursor + 1) % self.words.len();
        self.current()
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(words: &[&str]) -> WordList {
        WordList::new(words.iter().map(ToString::to_string).collect()).unwrap()
    }

    #[test]
    fn starts_at_first_word() {
        assert_eq!(list(&["air", "water"]).current(), "air");
    }

    #[test]
    fn advancing_a_full_lap_returns_to_start() {
        let words = ["air", "water", "shelter", "food"];
        for start in 0..words.len() {
            let mut list = list(&words);
            for _ in 0..start {
                list.advance();
            }
            let origin = list.current().to_string();

            for laps in 1..=3 {
                for _ in 0..words.len() * laps {
                    list.advance();
                }
                assert_eq!(list.current(), origin);
            }
        }
    }

    #[test]
    fn advance_visits_in_order() {
        let mut list = list(&["air", "water", "shelter", "food"]);
        assert_eq!(list.advance(), "water");
        assert_eq!(list.advance(), "shelter");
        assert_eq!(list.advance(), "food");
        assert_eq!(list.advance(), "air");
        assert_eq!(list.position(), 0);
    }

    #[test]
    fn single_word_list() {
        let mut list = list(&["air"]);
        assert_eq!(list.advance(), "air");
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn empty_list_rejected() {
        assert!(WordList::new(Vec::new()).is_err());
    }
}
