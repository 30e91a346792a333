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

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use crate::config::{Configs, EnvironmentError};
use crate::data::io::{self, DataError, LabelledReview, RawReview};
use crate::data::storage::{self, StorageError};

/// Fixed seed so repeated ingestion runs produce the same split.
const SPLIT_SEED: u64 = 42;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Fetches the raw dataset from the bucket, maps the labels, splits it and
/// writes the raw train/test CSVs.
pub fn run(configs: &Configs) -> Result<(), IngestError> {
    let ingestion = &configs.params().data_ingestion;
    let environment = configs.environment();

    let store = storage::for_bucket(environment.s3_bucket()?, environment.s3_credentials())?;
    let raw = store.fetch(&ingestion.raw_file)?;
    log::info!(
        "Fetched {} ({} bytes) from object storage",
        ingestion.raw_file,
        raw.len()
    );

    let rows: Vec<RawReview> = io::read_records_from(raw.as_slice())?;
    let labelled = label_reviews(rows);
    log::info!("{} labelled rows after filtering", labelled.len());

    let (train, test) = split(labelled, ingestion.test_size);
    io::write_records(configs.paths().train_data_file(), &train)?;
    io::write_records(configs.paths().test_data_file(), &test)?;
    log::info!(
        "Wrote {} train rows and {} test rows",
        train.len(),
        test.len()
    );
    Ok(())
}

/// Keeps only rows labelled `positive` or `negative`, mapped to 1 and 0.
/// Everything else (unlabelled, neutral, junk) is dropped.
pub fn label_reviews(rows: Vec<RawReview>) -> Vec<LabelledReview> {
    rows.into_iter()
        .filter_map(|row| {
            let sentiment = match row.sentiment.as_str() {
                "positive" => 1,
                "negative" => 0,
                _ => return None,
            };
            Some(LabelledReview {
                review: row.review,
                sentiment,
            })
        })
        .collect()
}

/// Deterministic shuffled split; `test_size` is the held-out fraction.
pub fn split(
    mut rows: Vec<LabelledReview>,
    test_size: f64,
) -> (Vec<LabelledReview>, Vec<LabelledReview>) {
    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    rows.shuffle(&mut rng);
    let test_len = (rows.len() as f64 * test_size.clamp(0.0, 1.0)).round() as usize;
    let train_len = rows.len() - test_len;
    let test = rows.split_off(train_len);
    (rows, test)
}

#[cfg(test)]
mod test {
    use super::{label_reviews, split};
    use crate::data::io::{LabelledReview, RawReview};

    fn raw(review: &str, sentiment: &str) -> RawReview {
        RawReview {
            review: review.to_string(),
            sentiment: sentiment.to_string(),
        }
    }

    #[test]
    fn labels_are_mapped_and_others_dropped() {
        let rows = vec![
            raw("good", "positive"),
            raw("bad", "negative"),
            raw("meh", "neutral"),
            raw("empty", ""),
        ];
        let labelled = label_reviews(rows);
        assert_eq!(labelled.len(), 2);
        assert_eq!(labelled[0].sentiment, 1);
        assert_eq!(labelled[1].sentiment, 0);
    }

    #[test]
    fn split_is_deterministic_and_sized() {
        let rows: Vec<LabelledReview> = (0..100)
            .map(|index| LabelledReview {
                review: format!("review {index}"),
                sentiment: (index % 2) as u8,
            })
            .collect();

        let (train_a, test_a) = split(rows.clone(), 0.2);
        let (train_b, test_b) = split(rows, 0.2);
        assert_eq!(train_a.len(), 80);
        assert_eq!(test_a.len(), 20);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
    }

    #[test]
    fn extreme_test_sizes_are_clamped() {
        let rows: Vec<LabelledReview> = (0..10)
            .map(|index| LabelledReview {
                review: index.to_string(),
                sentiment: 1,
            })
            .collect();
        let (train, test) = split(rows, 2.0);
        assert!(train.is_empty());
        assert_eq!(test.len(), 10);
    }
}
