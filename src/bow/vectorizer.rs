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

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};

use camino::Utf8Path;
use compact_str::CompactString;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorizerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serialisation(#[from] bincode::Error),
}

/// A fixed-vocabulary bag-of-words encoder.
///
/// Fitted once on the normalized training corpus and persisted; the serving
/// path loads it back and reuses it unchanged, so the feature space is
/// identical on both sides. Tokens shorter than two characters are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountVectorizer {
    vocabulary: HashMap<CompactString, usize>,
    terms: Vec<CompactString>,
}

impl CountVectorizer {
    /// Builds the vocabulary from a corpus: at most `max_features` terms,
    /// most frequent first (ties alphabetical), with indices assigned in
    /// alphabetical order of the surviving terms.
    pub fn fit<I, S>(corpus: I, max_features: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: HashMap<CompactString, u64> = HashMap::new();
        for document in corpus {
            for token in tokens(document.as_ref()) {
                *counts.entry(CompactString::from(token)).or_insert(0) += 1;
            }
        }

        let mut terms = counts
            .into_iter()
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
            .take(max_features)
            .map(|(term, _)| term)
            .collect_vec();
        terms.sort_unstable();

        let vocabulary = terms
            .iter()
            .enumerate()
            .map(|(index, term)| (term.clone(), index))
            .collect();
        Self { vocabulary, terms }
    }

    /// Maps a normalized text to a dense count vector of vocabulary width.
    /// Unknown tokens are ignored.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut counts = vec![0f64; self.terms.len()];
        for token in tokens(text) {
            if let Some(index) = self.vocabulary.get(token) {
                counts[*index] += 1.0;
            }
        }
        counts
    }

    /// Sparse encoding with the one-based indices liblinear expects.
    /// Zero counts are omitted.
    pub fn sparse_features(&self, text: &str) -> Vec<(u32, f64)> {
        to_sparse(&self.transform(text))
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[CompactString] {
        &self.terms
    }

    pub fn save<P: AsRef<Utf8Path>>(&self, path: P) -> Result<(), VectorizerError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(
            File::options()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?,
        );
        Ok(bincode::serialize_into(&mut writer, self)?)
    }

    pub fn load<P: AsRef<Utf8Path>>(path: P) -> Result<Self, VectorizerError> {
        let mut reader = BufReader::new(File::options().read(true).open(path.as_ref())?);
        Ok(bincode::deserialize_from(&mut reader)?)
    }
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .filter(|token| token.chars().nth(1).is_some())
}

/// Converts a dense count vector into the one-based sparse form.
pub fn to_sparse(features: &[f64]) -> Vec<(u32, f64)> {
    features
        .iter()
        .enumerate()
        .filter(|(_, value)| **value != 0.0)
        .map(|(index, value)| (index as u32 + 1, *value))
        .collect()
}
