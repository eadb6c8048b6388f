// src/aggregate/words.rs

use super::Aggregator;
use crate::model::{CommitRecord, WordFrequencyEntry};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Words never counted: function words plus version-control boilerplate
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    // articles, conjunctions, pronouns
    "a", "an", "the", "and", "or", "but", "nor", "so", "yet", "if", "then", "else", "than",
    "as", "because", "while", "i", "we", "you", "he", "she", "it", "they", "me", "us", "my",
    "our", "your", "its", "their", "this", "that", "these", "those", "there", "here",
    // prepositions
    "of", "in", "on", "at", "to", "for", "from", "by", "with", "without", "into", "onto",
    "about", "after", "before", "over", "under", "up", "down", "out", "off", "via", "per",
    // auxiliaries and fillers
    "is", "are", "was", "were", "be", "been", "being", "am", "do", "does", "did", "has",
    "have", "had", "not", "no", "can", "will", "should", "would", "could", "also", "just",
    "now", "some", "all", "any", "more", "other", "when", "which", "what", "who", "how",
    // version-control boilerplate
    "commit", "commits", "merge", "merged", "merging", "branch", "pull", "request", "origin",
    "master", "main", "head", "revert", "reverts", "signed", "co", "authored", "wip",
];

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| {
        Regex::new(r"[\p{L}\p{N}]+(?:'[\p{L}\p{N}]+)*").expect("word regex is valid")
    })
}

/// Occurrence counts of message words, in first-seen order
pub struct WordFrequencyAggregator {
    stop_words: HashSet<String>,
    word_map: HashMap<String, usize>,
    entries: Vec<WordFrequencyEntry>,
}

impl WordFrequencyAggregator {
    pub fn new<S: AsRef<str>>(stop_words: &[S]) -> Self {
        Self {
            stop_words: stop_words.iter().map(|w| w.as_ref().to_lowercase()).collect(),
            word_map: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn keep(&self, word: &str) -> bool {
        word.chars().count() >= 2
            && !word.chars().all(|c| c.is_numeric())
            && !self.stop_words.contains(word)
    }
}

impl Aggregator for WordFrequencyAggregator {
    type Output = Vec<WordFrequencyEntry>;

    fn observe(&mut self, commit: &CommitRecord) {
        let message = commit.message.to_lowercase();
        for found in word_regex().find_iter(&message) {
            let word = found.as_str();
            if !self.keep(word) {
                continue;
            }
            match self.word_map.get(word) {
                Some(&id) => self.entries[id].weight += 1,
                None => {
                    self.word_map.insert(word.to_string(), self.entries.len());
                    self.entries.push(WordFrequencyEntry { word: word.to_string(), weight: 1 });
                }
            }
        }
    }

    fn finish(self) -> Self::Output {
        self.entries
    }
}

/// The `k` heaviest words; equal weights keep first-seen order
pub fn top_words(entries: &[WordFrequencyEntry], k: usize) -> Vec<WordFrequencyEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.weight.cmp(&a.weight));
    sorted.truncate(k);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_log;

    fn frequencies(log: &str) -> Vec<WordFrequencyEntry> {
        let mut aggregator = WordFrequencyAggregator::new(DEFAULT_STOP_WORDS);
        aggregator.observe_all(&parse_log(log, None));
        aggregator.finish()
    }

    const LOG: &str = "commit 1
Author: A <a@x.com>
Date:   Mon, 1 Jan 2024 10:00:00 +0000

    Fix the parser; don't panic on 404 errors

commit 2
Author: A <a@x.com>
Date:   Tue, 2 Jan 2024 10:00:00 +0000

    Merge branch 'Parser-Fix' into main

commit 3
Author: A <a@x.com>
Date:   Wed, 3 Jan 2024 10:00:00 +0000

    Fix PARSER again
";

    #[test]
    fn counts_lowercased_words() {
        let words = frequencies(LOG);
        let weight = |w: &str| words.iter().find(|e| e.word == w).map(|e| e.weight);
        assert_eq!(weight("parser"), Some(3));
        assert_eq!(weight("fix"), Some(3));
        assert_eq!(weight("don't"), Some(1));
        assert_eq!(weight("again"), Some(1));
        assert_eq!(weight("404"), None);
        assert_eq!(words[0].word, "fix");
    }

    #[test]
    fn stop_words_never_counted() {
        let words = frequencies(LOG);
        for entry in &words {
            assert!(!DEFAULT_STOP_WORDS.contains(&entry.word.as_str()), "{}", entry.word);
        }
    }

    #[test]
    fn custom_stop_words_are_case_insensitive() {
        let mut aggregator = WordFrequencyAggregator::new(&["FIX"]);
        aggregator.observe_all(&parse_log(LOG, None));
        let words = aggregator.finish();
        assert!(words.iter().all(|e| e.word != "fix"));
        assert!(words.iter().any(|e| e.word == "merge"));
    }

    #[test]
    fn top_words_is_stable() {
        let top = top_words(&frequencies(LOG), 3);
        let names: Vec<&str> = top.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(names, vec!["fix", "parser", "don't"]);
    }
}
