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

//! Pipeline entry points for the registry operations.

use std::fs::File;
use std::io::BufReader;

use thiserror::Error;

use crate::config::{Configs, EnvironmentError};
use crate::model::evaluate::ExperimentInfo;
use crate::registry::{ModelRegistry, ModelVersion, RegistryError};

#[derive(Debug, Error)]
pub enum RegistryStageError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    ExperimentInfo(#[from] serde_json::Error),
}

/// Registers the trained model and its vectorizer under the run recorded by
/// the evaluation stage. The new version lands in `Staging`.
pub fn register(configs: &Configs) -> Result<ModelVersion, RegistryStageError> {
    let registry = ModelRegistry::open(configs.environment().registry_uri()?)?;

    let reader = BufReader::new(
        File::options()
            .read(true)
            .open(configs.paths().experiment_info_file())?,
    );
    let info: ExperimentInfo = serde_json::from_reader(reader)?;

    let model_name = &configs.params().model_training.model_name;
    let artifacts = [
        configs.paths().model_file(model_name),
        configs
            .paths()
            .vectorizer_file(&configs.params().feature_engineering.vectorizer_name),
    ];
    Ok(registry.register(model_name, Some(info.run_id), &artifacts)?)
}

/// Promotes the newest `Staging` version of the configured model.
pub fn promote(configs: &Configs) -> Result<ModelVersion, RegistryStageError> {
    let registry = ModelRegistry::open(configs.environment().registry_uri()?)?;
    Ok(registry.promote(&configs.params().model_training.model_name)?)
}
