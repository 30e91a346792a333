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

use camino::Utf8Path;
use itertools::Itertools;
use thiserror::Error;

use crate::bow::vectorizer::{CountVectorizer, VectorizerError};
use crate::config::Configs;
use crate::data::io::{self, DataError, LabelledReview};

#[derive(Debug, Error)]
pub enum FeaturizeError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Vectorizer(#[from] VectorizerError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// A labelled feature vector, the row format of the bag-of-words CSVs.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub features: Vec<f64>,
    pub label: u8,
}

/// Fits the vectorizer on the processed training split, transforms both
/// splits, writes the bag-of-words CSVs and persists the vectorizer.
pub fn run(configs: &Configs) -> Result<(), FeaturizeError> {
    let params = &configs.params().feature_engineering;
    let paths = configs.paths();

    let train: Vec<LabelledReview> = io::read_records(paths.train_processed_file())?;
    let test: Vec<LabelledReview> = io::read_records(paths.test_processed_file())?;

    let vectorizer = CountVectorizer::fit(train.iter().map(|row| row.review.as_str()), params.max_features);
    log::info!(
        "Fitted vectorizer with {} terms from {} training rows",
        vectorizer.vocabulary_size(),
        train.len()
    );

    write_feature_csv(paths.train_bow_file(), &transform_rows(&vectorizer, &train))?;
    write_feature_csv(paths.test_bow_file(), &transform_rows(&vectorizer, &test))?;

    let vectorizer_file = paths.vectorizer_file(&params.vectorizer_name);
    vectorizer.save(&vectorizer_file)?;
    log::info!("Saved vectorizer to {vectorizer_file}");
    Ok(())
}

pub fn transform_rows(vectorizer: &CountVectorizer, rows: &[LabelledReview]) -> Vec<FeatureRow> {
    rows.iter()
        .map(|row| FeatureRow {
            features: vectorizer.transform(&row.review),
            label: row.sentiment,
        })
        .collect()
}

/// Columns are the vocabulary indices `0..n-1` followed by `label`.
pub fn write_feature_csv<P: AsRef<Utf8Path>>(
    path: P,
    rows: &[FeatureRow],
) -> Result<(), FeaturizeError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;

    let width = rows.first().map(|row| row.features.len()).unwrap_or(0);
    let mut header = (0..width).map(|index| index.to_string()).collect_vec();
    header.push("label".to_string());
    writer.write_record(&header)?;

    for row in rows {
        let mut record = row
            .features
            .iter()
            .map(|value| value.to_string())
            .collect_vec();
        record.push(row.label.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a bag-of-words CSV back into feature rows.
pub fn read_feature_csv<P: AsRef<Utf8Path>>(path: P) -> Result<Vec<FeatureRow>, FeaturizeError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut features = Vec::with_capacity(record.len().saturating_sub(1));
        let mut label = 0u8;
        for (index, field) in record.iter().enumerate() {
            if index + 1 == record.len() {
                label = field.parse().map_err(|_| {
                    csv::Error::from(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("invalid label {field:?}"),
                    ))
                })?;
            } else {
                features.push(field.parse().map_err(|_| {
                    csv::Error::from(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("invalid feature value {field:?}"),
                    ))
                })?);
            }
        }
        rows.push(FeatureRow { features, label });
    }
    Ok(rows)
}

#[cfg(test)]
mod test {
    use camino::Utf8PathBuf;

    use super::{read_feature_csv, transform_rows, write_feature_csv, FeatureRow};
    use crate::bow::vectorizer::CountVectorizer;
    use crate::data::io::LabelledReview;

    fn row(review: &str, sentiment: u8) -> LabelledReview {
        LabelledReview {
            review: review.to_string(),
            sentiment,
        }
    }

    #[test]
    fn rows_keep_their_labels_through_transformation() {
        let vectorizer = CountVectorizer::fit(["good movie", "bad movie"], 100);
        let rows = transform_rows(
            &vectorizer,
            &[row("good good movie", 1), row("bad movie", 0)],
        );
        assert_eq!(rows[0].label, 1);
        assert_eq!(rows[1].label, 0);
        // vocabulary is [bad, good, movie]
        assert_eq!(rows[0].features, [0.0, 2.0, 1.0]);
        assert_eq!(rows[1].features, [1.0, 0.0, 1.0]);
    }

    #[test]
    fn feature_csv_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("train_bow.csv")).unwrap();
        let rows = vec![
            FeatureRow {
                features: vec![0.0, 2.0, 1.0],
                label: 1,
            },
            FeatureRow {
                features: vec![1.0, 0.0, 1.0],
                label: 0,
            },
        ];
        write_feature_csv(&path, &rows).unwrap();

        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("0,1,2,label\n"));
        assert_eq!(read_feature_csv(&path).unwrap(), rows);
    }
}
