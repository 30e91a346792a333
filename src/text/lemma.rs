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

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::text::ResourceError;

/// The embedded irregular noun table.
const NOUN_EXCEPTIONS: &str = include_str!("../../resources/lemmas/noun.exc");

/// Suffix rewrite rules for the default (noun) lemmatization rule, tried in
/// order after the exception table. First match wins.
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("zes", "z"),
    ("ies", "y"),
];

/// A dictionary-based noun lemmatizer.
///
/// Irregular forms come from a static exception table; everything else goes
/// through the suffix rules. Lemmatizing a lemma returns it unchanged, so the
/// mapping is idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lemmatizer {
    exceptions: HashMap<CompactString, CompactString>,
}

impl Lemmatizer {
    /// The built-in exception table.
    pub fn embedded() -> Result<Self, ResourceError> {
        Self::parse(NOUN_EXCEPTIONS)
    }

    /// Loads an exception table from a file with one `form lemma` pair per line.
    pub fn from_exception_file<P: AsRef<Path>>(path: P) -> Result<Self, ResourceError> {
        Self::parse(&fs::read_to_string(path.as_ref())?)
    }

    fn parse(raw: &str) -> Result<Self, ResourceError> {
        let mut exceptions = HashMap::new();
        for (number, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(form), Some(lemma), None) => {
                    exceptions.insert(CompactString::from(form), CompactString::from(lemma));
                }
                _ => {
                    return Err(ResourceError::MalformedLemmaEntry {
                        line: number + 1,
                        content: line.to_string(),
                    })
                }
            }
        }
        exceptions.shrink_to_fit();
        Ok(Self { exceptions })
    }

    /// Returns the dictionary lemma of a single token.
    pub fn lemma<'a>(&'a self, token: &'a str) -> Cow<'a, str> {
        if let Some(found) = self.exceptions.get(token) {
            return Cow::Borrowed(found.as_str());
        }
        for (suffix, replacement) in SUFFIX_RULES {
            if let Some(stem) = token.strip_suffix(suffix) {
                // Too-short matches ("ties", "ses") are either exceptions or
                // left alone rather than mangled.
                if stem.chars().count() < 2 {
                    return Cow::Borrowed(token);
                }
                let mut lemma = String::with_capacity(stem.len() + replacement.len());
                lemma.push_str(stem);
                lemma.push_str(replacement);
                return Cow::Owned(lemma);
            }
        }
        if let Some(stem) = token.strip_suffix('s') {
            let keeps_final_s = token.ends_with("ss")
                || token.ends_with("us")
                || token.ends_with("is")
                || token.chars().count() <= 3;
            if !keeps_final_s {
                return Cow::Owned(stem.to_string());
            }
        }
        Cow::Borrowed(token)
    }
}

#[cfg(test)]
mod test {
    use super::Lemmatizer;

    fn lemmatizer() -> Lemmatizer {
        Lemmatizer::embedded().unwrap()
    }

    #[test]
    fn irregular_forms_use_the_exception_table() {
        let lemmatizer = lemmatizer();
        assert_eq!(lemmatizer.lemma("children"), "child");
        assert_eq!(lemmatizer.lemma("movies"), "movie");
        assert_eq!(lemmatizer.lemma("feet"), "foot");
        assert_eq!(lemmatizer.lemma("women"), "woman");
        assert_eq!(lemmatizer.lemma("analyses"), "analysis");
    }

    #[test]
    fn suffix_rules_cover_regular_plurals() {
        let lemmatizer = lemmatizer();
        assert_eq!(lemmatizer.lemma("glasses"), "glass");
        assert_eq!(lemmatizer.lemma("churches"), "church");
        assert_eq!(lemmatizer.lemma("dishes"), "dish");
        assert_eq!(lemmatizer.lemma("boxes"), "box");
        assert_eq!(lemmatizer.lemma("ponies"), "pony");
        assert_eq!(lemmatizer.lemma("reviews"), "review");
        assert_eq!(lemmatizer.lemma("houses"), "house");
    }

    #[test]
    fn guarded_words_are_left_alone() {
        let lemmatizer = lemmatizer();
        assert_eq!(lemmatizer.lemma("glass"), "glass");
        assert_eq!(lemmatizer.lemma("virus"), "virus");
        assert_eq!(lemmatizer.lemma("gas"), "gas");
        assert_eq!(lemmatizer.lemma("movie"), "movie");
        assert_eq!(lemmatizer.lemma("great"), "great");
    }

    #[test]
    fn lemmatization_is_idempotent() {
        let lemmatizer = lemmatizer();
        for token in ["movies", "children", "glasses", "ponies", "reviews", "boxes"] {
            let once = lemmatizer.lemma(token).into_owned();
            let twice = lemmatizer.lemma(&once).into_owned();
            assert_eq!(once, twice, "lemma of {token:?} is not a fixed point");
        }
    }

    #[test]
    fn malformed_exception_entries_are_rejected() {
        assert!(Lemmatizer::parse("men man\nbroken").is_err());
        assert!(Lemmatizer::parse("one two three").is_err());
    }
}
