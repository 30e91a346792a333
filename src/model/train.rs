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
use liblinear::model::traits::TrainableModel;
use liblinear::parameter::serde::GenericParameters;
use liblinear::solver::{GenericSolver, L1R_LR};
use liblinear::{Model, TrainingInput};

use crate::bow::engineering::{self, FeatureRow};
use crate::bow::vectorizer::to_sparse;
use crate::config::Configs;
use crate::model::{LibLinearError, ModelStageError};

/// Trains the L1-regularised logistic regression on the training
/// bag-of-words CSV and writes the model file.
pub fn run(configs: &Configs) -> Result<(), ModelStageError> {
    let params = &configs.params().model_training;
    let rows = engineering::read_feature_csv(configs.paths().train_bow_file())?;
    log::info!("Training on {} rows", rows.len());

    let model = train_from_rows(&rows, params.cost)?;

    let model_file = configs.paths().model_file(&params.model_name);
    save_model(&model, &model_file)?;
    log::info!("Saved model to {model_file}");
    Ok(())
}

pub fn train_from_rows(rows: &[FeatureRow], cost: f64) -> Result<Model<L1R_LR>, LibLinearError> {
    let mut labels = Vec::with_capacity(rows.len());
    let mut features = Vec::with_capacity(rows.len());
    for row in rows {
        labels.push(row.label as f64);
        features.push(to_sparse(&row.features));
    }

    let data = TrainingInput::from_sparse_features(labels, features)?;
    let parameters = GenericParameters {
        epsilon: Some(0.0003),
        cost: Some(cost),
        ..GenericParameters::default()
    }
    .try_into()
    .map_err(LibLinearError::from)?;

    Ok(Model::train(&data, &parameters)?)
}

pub fn save_model<P: AsRef<Utf8Path>>(
    model: &Model<L1R_LR>,
    path: P,
) -> Result<(), ModelStageError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    liblinear::model::serde::save_model_to_disk(model, path.as_str())?;
    Ok(())
}

pub fn load_model<P: AsRef<Utf8Path>>(path: P) -> Result<Model<L1R_LR>, ModelStageError> {
    let model: Model<GenericSolver> =
        liblinear::model::serde::load_model_from_disk(path.as_ref().as_str())?;
    model
        .try_into()
        .map_err(|_| ModelStageError::SolverMismatch)
}
