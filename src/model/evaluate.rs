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

use std::fs::File;
use std::io::BufWriter;

use camino::Utf8Path;
use liblinear::model::traits::ModelBase;
use liblinear::solver::L1R_LR;
use liblinear::{Model, PredictionInput};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bow::engineering::{self, FeatureRow};
use crate::bow::vectorizer::to_sparse;
use crate::config::Configs;
use crate::model::{train, ModelStageError};

/// Held-out metrics of a trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub auc: f64,
}

/// Ties an evaluation run to the artifact it scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentInfo {
    pub run_id: Uuid,
    pub experiment_name: String,
    pub model_path: String,
}

/// Scores the trained model on the test bag-of-words CSV and writes
/// `metrics.json` and `experiment_info.json` into the reports directory.
pub fn run(configs: &Configs) -> Result<ExperimentInfo, ModelStageError> {
    let model_file = configs
        .paths()
        .model_file(&configs.params().model_training.model_name);
    let model = train::load_model(&model_file)?;
    let rows = engineering::read_feature_csv(configs.paths().test_bow_file())?;

    let metrics = evaluate(&model, &rows)?;
    log::info!(
        "Evaluated {} rows: accuracy {:.4}, precision {:.4}, recall {:.4}, auc {:.4}",
        rows.len(),
        metrics.accuracy,
        metrics.precision,
        metrics.recall,
        metrics.auc
    );
    write_json(configs.paths().metrics_file(), &metrics)?;

    let info = ExperimentInfo {
        run_id: Uuid::new_v4(),
        experiment_name: configs.params().model_evaluation.experiment_name.clone(),
        model_path: model_file.into_string(),
    };
    write_json(configs.paths().experiment_info_file(), &info)?;
    log::info!("Recorded evaluation run {}", info.run_id);
    Ok(info)
}

/// Computes accuracy, precision, recall and AUC of the model on labelled
/// feature rows.
pub fn evaluate(
    model: &Model<L1R_LR>,
    rows: &[FeatureRow],
) -> Result<EvaluationMetrics, ModelStageError> {
    let mut labels = Vec::with_capacity(rows.len());
    let mut predictions = Vec::with_capacity(rows.len());
    let mut scores = Vec::with_capacity(rows.len());
    for row in rows {
        let (prediction, score) = score_row(model, &row.features)?;
        labels.push(row.label);
        predictions.push(prediction);
        scores.push(score);
    }

    Ok(EvaluationMetrics {
        accuracy: accuracy(&labels, &predictions),
        precision: precision(&labels, &predictions),
        recall: recall(&labels, &predictions),
        auc: roc_auc(&labels, &scores).unwrap_or(f64::NAN),
    })
}

fn score_row(model: &Model<L1R_LR>, features: &[f64]) -> Result<(u8, f64), ModelStageError> {
    let mut sparse = to_sparse(features);
    if sparse.is_empty() {
        sparse.push((1, 0.0));
    }
    let input = PredictionInput::from_sparse_features(sparse)?;
    let prediction = model.predict(&input)?;
    let (decision_values, _) = model.predict_values(&input)?;
    let first = decision_values.first().copied().unwrap_or(0.0);
    let first_probability = 1.0 / (1.0 + (-first).exp());
    let score = if model.labels().first() == Some(&1) {
        first_probability
    } else {
        1.0 - first_probability
    };
    Ok((if prediction >= 0.5 { 1 } else { 0 }, score))
}

pub fn accuracy(labels: &[u8], predictions: &[u8]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = labels
        .iter()
        .zip(predictions)
        .filter(|(label, prediction)| label == prediction)
        .count();
    correct as f64 / labels.len() as f64
}

/// Of everything predicted positive, the fraction that is positive.
/// Zero when nothing was predicted positive.
pub fn precision(labels: &[u8], predictions: &[u8]) -> f64 {
    let (true_positives, false_positives) = labels.iter().zip(predictions).fold(
        (0usize, 0usize),
        |(tp, fp), (label, prediction)| match (label, prediction) {
            (1, 1) => (tp + 1, fp),
            (0, 1) => (tp, fp + 1),
            _ => (tp, fp),
        },
    );
    let predicted_positive = true_positives + false_positives;
    if predicted_positive == 0 {
        0.0
    } else {
        true_positives as f64 / predicted_positive as f64
    }
}

/// Of all positives, the fraction that was found. Zero when there are none.
pub fn recall(labels: &[u8], predictions: &[u8]) -> f64 {
    let (true_positives, false_negatives) = labels.iter().zip(predictions).fold(
        (0usize, 0usize),
        |(tp, fnc), (label, prediction)| match (label, prediction) {
            (1, 1) => (tp + 1, fnc),
            (1, 0) => (tp, fnc + 1),
            _ => (tp, fnc),
        },
    );
    let actual_positive = true_positives + false_negatives;
    if actual_positive == 0 {
        0.0
    } else {
        true_positives as f64 / actual_positive as f64
    }
}

/// Area under the ROC curve via the Mann-Whitney rank statistic, with
/// average ranks over tied scores. `None` when one class is absent.
pub fn roc_auc(labels: &[u8], scores: &[f64]) -> Option<f64> {
    let positives = labels.iter().filter(|label| **label == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by(|a, b| scores[*a].total_cmp(&scores[*b]));

    let mut ranks = vec![0f64; labels.len()];
    let mut index = 0;
    while index < order.len() {
        let mut end = index + 1;
        while end < order.len() && scores[order[end]] == scores[order[index]] {
            end += 1;
        }
        // ranks are one-based, ties share the average rank of their run
        let average = (index + 1 + end) as f64 / 2.0;
        for position in index..end {
            ranks[order[position]] = average;
        }
        index = end;
    }

    let positive_rank_sum: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|(label, _)| **label == 1)
        .map(|(_, rank)| rank)
        .sum();
    let positives = positives as f64;
    let negatives = negatives as f64;
    Some((positive_rank_sum - positives * (positives + 1.0) / 2.0) / (positives * negatives))
}

fn write_json<P: AsRef<Utf8Path>, T: Serialize>(path: P, value: &T) -> Result<(), ModelStageError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(
        File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?,
    );
    Ok(serde_json::to_writer_pretty(writer, value)?)
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use super::{accuracy, evaluate, precision, recall, roc_auc};
    use crate::bow::engineering::FeatureRow;
    use crate::model::train::train_from_rows;

    #[test]
    fn confusion_based_metrics() {
        let labels = [1, 1, 1, 0, 0, 0];
        let predictions = [1, 1, 0, 0, 0, 1];
        assert_approx_eq!(f64, accuracy(&labels, &predictions), 4.0 / 6.0);
        assert_approx_eq!(f64, precision(&labels, &predictions), 2.0 / 3.0);
        assert_approx_eq!(f64, recall(&labels, &predictions), 2.0 / 3.0);
    }

    #[test]
    fn degenerate_predictions_do_not_divide_by_zero() {
        let labels = [1, 0];
        assert_approx_eq!(f64, precision(&labels, &[0, 0]), 0.0);
        assert_approx_eq!(f64, recall(&[0, 0], &[1, 0]), 0.0);
        assert_approx_eq!(f64, accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn auc_of_a_perfect_ranking_is_one() {
        let labels = [0, 0, 1, 1];
        let scores = [0.1, 0.2, 0.8, 0.9];
        assert_approx_eq!(f64, roc_auc(&labels, &scores).unwrap(), 1.0);
    }

    #[test]
    fn auc_of_an_uninformative_ranking_is_half() {
        let labels = [0, 1, 0, 1];
        let scores = [0.5, 0.5, 0.5, 0.5];
        assert_approx_eq!(f64, roc_auc(&labels, &scores).unwrap(), 0.5);
    }

    #[test]
    fn auc_needs_both_classes() {
        assert!(roc_auc(&[1, 1], &[0.2, 0.9]).is_none());
    }

    #[test]
    fn a_separable_model_evaluates_cleanly() {
        let mut rows = Vec::new();
        for _ in 0..20 {
            rows.push(FeatureRow {
                features: vec![3.0, 0.0],
                label: 1,
            });
            rows.push(FeatureRow {
                features: vec![0.0, 3.0],
                label: 0,
            });
        }
        let model = train_from_rows(&rows, 1.0).unwrap();
        let metrics = evaluate(&model, &rows).unwrap();
        assert_approx_eq!(f64, metrics.accuracy, 1.0);
        assert_approx_eq!(f64, metrics.precision, 1.0);
        assert_approx_eq!(f64, metrics.recall, 1.0);
        assert_approx_eq!(f64, metrics.auc, 1.0);
    }
}
