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

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader};
use std::path::Path;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// The embedded default English stop word list.
const ENGLISH_STOP_WORDS: &str = include_str!("../../resources/stopwords/en.txt");

/// A process-wide stop word set. Loaded once at startup, read-only afterwards.
///
/// Matching is exact and case-sensitive; the normalizer lower-cases the text
/// before consulting the list, so the list itself holds lower-cased entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopWordList {
    words: HashSet<CompactString>,
}

impl StopWordList {
    pub fn from_raw(mut words: HashSet<CompactString>) -> Self {
        words.shrink_to_fit();
        Self { words }
    }

    /// The built-in English list.
    pub fn embedded_english() -> Self {
        Self::from_lines(ENGLISH_STOP_WORDS.lines())
    }

    /// Loads a stop word list from a file with one word per line.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let lines = BufReader::new(File::open(path.as_ref())?)
            .lines()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_lines(lines.iter().map(|value| value.as_str())))
    }

    fn from_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Self {
        Self::from_raw(
            lines
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(CompactString::from)
                .collect(),
        )
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
