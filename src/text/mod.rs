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

//! Text normalization, the shared unit between batch preprocessing and
//! request serving. Both call sites go through [`TextNormalizer::normalize`]
//! so the cleaned text is identical in training and at inference.

use std::sync::Arc;

use thiserror::Error;

pub mod lemma;
pub mod normalizer;
pub mod stopwords;

pub use lemma::Lemmatizer;
pub use normalizer::TextNormalizer;
pub use stopwords::StopWordList;

/// A failure while loading the static language resources.
///
/// Surfaced once at startup; normalization itself never fails.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed lemma entry on line {line}: {content:?}")]
    MalformedLemmaEntry { line: usize, content: String },
    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// Where a language resource comes from.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResourceSource {
    /// The list compiled into the binary.
    #[default]
    Embedded,
    /// An external file, one entry per line.
    File(camino::Utf8PathBuf),
}

/// The static resources behind normalization, loaded once before the first
/// call and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct LanguageResources {
    pub stop_words: Arc<StopWordList>,
    pub lemmatizer: Arc<Lemmatizer>,
}

impl LanguageResources {
    pub fn load(
        stop_words: &ResourceSource,
        lemmas: &ResourceSource,
    ) -> Result<Self, ResourceError> {
        let stop_words = match stop_words {
            ResourceSource::Embedded => StopWordList::embedded_english(),
            ResourceSource::File(path) => StopWordList::from_file(path)?,
        };
        let lemmatizer = match lemmas {
            ResourceSource::Embedded => Lemmatizer::embedded()?,
            ResourceSource::File(path) => Lemmatizer::from_exception_file(path)?,
        };
        Ok(Self {
            stop_words: Arc::new(stop_words),
            lemmatizer: Arc::new(lemmatizer),
        })
    }

    /// Builds the normalizer on top of the loaded resources.
    pub fn normalizer(&self) -> Result<TextNormalizer, ResourceError> {
        TextNormalizer::new(self.stop_words.clone(), self.lemmatizer.clone())
    }
}
