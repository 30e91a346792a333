// Copyright 2025.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;

use itertools::Itertools;
use regex::Regex;

use crate::text::{Lemmatizer, ResourceError, StopWordList};

/// Greedy up to the next whitespace.
const URL_PATTERN: &str = r"https?://\S+|www\.\S+";

/// A legacy special case: this character is deleted outright instead of being
/// replaced by a space like ASCII punctuation.
const ARABIC_SEMICOLON: char = '\u{061B}';

/// Turns raw review text into cleaned text.
///
/// The transformation is a pure function of the input and the static language
/// resources. The step order is fixed: lower-casing, stop word removal, digit
/// removal, URL removal, punctuation removal, lemmatization. Stop words are
/// checked before digits are stripped, and URLs are deleted before punctuation
/// removal can tear them apart.
///
/// Every step is total; the result may be the empty string when all tokens
/// were removed.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stop_words: Arc<StopWordList>,
    lemmatizer: Arc<Lemmatizer>,
    url_pattern: Regex,
}

impl TextNormalizer {
    pub fn new(
        stop_words: Arc<StopWordList>,
        lemmatizer: Arc<Lemmatizer>,
    ) -> Result<Self, ResourceError> {
        Ok(Self {
            stop_words,
            lemmatizer,
            url_pattern: Regex::new(URL_PATTERN)?,
        })
    }

    /// Normalizes a single text. Never fails, safe to call concurrently.
    pub fn normalize(&self, text: &str) -> String {
        let text = lower_case(text);
        let text = self.remove_stop_words(&text);
        let text = remove_digits(&text);
        let text = self.remove_urls(&text);
        let text = remove_punctuation(&text);
        self.lemmatize(&text)
    }

    /// Whether a normalized text falls below the batch-path length filter.
    pub fn is_short(normalized: &str, min_tokens: usize) -> bool {
        normalized.split_whitespace().count() < min_tokens
    }

    fn remove_stop_words(&self, text: &str) -> String {
        text.split_whitespace()
            .filter(|token| !self.stop_words.contains(token))
            .join(" ")
    }

    fn remove_urls(&self, text: &str) -> String {
        self.url_pattern.replace_all(text, "").into_owned()
    }

    fn lemmatize(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|token| self.lemmatizer.lemma(token))
            .join(" ")
    }
}

/// Lower-cases every whitespace-delimited token and rejoins with single
/// spaces, collapsing any irregular whitespace as a side effect.
fn lower_case(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .join(" ")
}

fn remove_digits(text: &str) -> String {
    text.chars().filter(|value| !value.is_numeric()).collect()
}

/// Replaces ASCII punctuation with spaces, deletes U+061B, then collapses
/// whitespace runs and trims.
fn remove_punctuation(text: &str) -> String {
    text.chars()
        .filter(|value| *value != ARABIC_SEMICOLON)
        .map(|value| {
            if value.is_ascii_punctuation() {
                ' '
            } else {
                value
            }
        })
        .collect::<String>()
        .split_whitespace()
        .join(" ")
}
