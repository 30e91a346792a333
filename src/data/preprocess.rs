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

use thiserror::Error;

use crate::config::Configs;
use crate::data::io::{self, DataError, LabelledReview};
use crate::text::{LanguageResources, ResourceError, TextNormalizer};

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Normalizes the review column of both splits and writes the interim CSVs.
/// This is the batch-side call site of the shared normalizer.
pub fn run(configs: &Configs, resources: &LanguageResources) -> Result<(), PreprocessError> {
    let normalizer = resources.normalizer()?;
    let min_tokens = configs.params().preprocessing.min_tokens;

    let pairs = [
        (
            configs.paths().train_data_file(),
            configs.paths().train_processed_file(),
        ),
        (
            configs.paths().test_data_file(),
            configs.paths().test_processed_file(),
        ),
    ];

    for (input, output) in pairs {
        let rows: Vec<LabelledReview> = io::read_records(&input)?;
        let total = rows.len();
        let cleaned = preprocess_rows(&normalizer, rows, min_tokens);
        log::info!(
            "{input}: normalized {} rows ({} dropped)",
            cleaned.len(),
            total - cleaned.len()
        );
        io::write_records(&output, &cleaned)?;
    }
    Ok(())
}

/// Applies the normalizer to every row. Rows below `min_tokens` normalized
/// tokens are dropped when the filter is enabled.
pub fn preprocess_rows(
    normalizer: &TextNormalizer,
    rows: Vec<LabelledReview>,
    min_tokens: Option<usize>,
) -> Vec<LabelledReview> {
    rows.into_iter()
        .filter_map(|row| {
            let review = normalizer.normalize(&row.review);
            if let Some(min) = min_tokens {
                if TextNormalizer::is_short(&review, min) {
                    return None;
                }
            }
            Some(LabelledReview {
                review,
                sentiment: row.sentiment,
            })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::preprocess_rows;
    use crate::data::io::LabelledReview;
    use crate::text::{LanguageResources, ResourceSource, TextNormalizer};

    fn normalizer() -> TextNormalizer {
        LanguageResources::load(&ResourceSource::Embedded, &ResourceSource::Embedded)
            .unwrap()
            .normalizer()
            .unwrap()
    }

    fn row(review: &str, sentiment: u8) -> LabelledReview {
        LabelledReview {
            review: review.to_string(),
            sentiment,
        }
    }

    #[test]
    fn rows_are_normalized_in_place() {
        let cleaned = preprocess_rows(
            &normalizer(),
            vec![row("The MOVIE was Great!!! 123", 1)],
            None,
        );
        assert_eq!(cleaned[0].review, "movie great");
        assert_eq!(cleaned[0].sentiment, 1);
    }

    #[test]
    fn short_rows_are_dropped_only_when_enabled() {
        let rows = vec![
            row("The MOVIE was Great!!! 123", 1),
            row("Truly spectacular acting throughout", 1),
        ];
        // "movie great" has two tokens and falls under a 3 token minimum
        let filtered = preprocess_rows(&normalizer(), rows.clone(), Some(3));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].review, "truly spectacular acting throughout");

        let unfiltered = preprocess_rows(&normalizer(), rows, None);
        assert_eq!(unfiltered.len(), 2);
    }

    #[test]
    fn batch_path_matches_direct_normalization() {
        // regression guard against train/serve skew: the batch entry point
        // must not diverge from a direct normalize call on the same input
        let normalizer = normalizer();
        let input = "What a STRANGE little film... 9/10 www.example.com";
        let direct = normalizer.normalize(input);
        let batch = preprocess_rows(&normalizer, vec![row(input, 0)], None);
        assert_eq!(batch[0].review, direct);
    }
}
