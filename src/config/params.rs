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
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::ResourceSource;

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("parameter file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// The nested parameter file consumed by the pipeline stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub data_ingestion: DataIngestionParams,
    pub preprocessing: PreprocessingParams,
    pub feature_engineering: FeatureEngineeringParams,
    pub model_training: ModelTrainingParams,
    pub model_evaluation: ModelEvaluationParams,
    pub serving: ServingParams,
    pub resources: ResourceParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataIngestionParams {
    /// Key of the raw CSV inside the bucket.
    pub raw_file: String,
    /// Fraction of rows held out for the test split.
    pub test_size: f64,
}

impl Default for DataIngestionParams {
    fn default() -> Self {
        Self {
            raw_file: "reviews.csv".to_string(),
            test_size: 0.2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingParams {
    /// When set, batch preprocessing drops rows whose normalized text has
    /// fewer than this many tokens. Off by default; the serving path never
    /// filters.
    pub min_tokens: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureEngineeringParams {
    pub max_features: usize,
    pub vectorizer_name: String,
}

impl Default for FeatureEngineeringParams {
    fn default() -> Self {
        Self {
            max_features: 1000,
            vectorizer_name: "vectorizer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelTrainingParams {
    pub model_name: String,
    /// Inverse regularization strength passed to the solver.
    pub cost: f64,
}

impl Default for ModelTrainingParams {
    fn default() -> Self {
        Self {
            model_name: "model".to_string(),
            cost: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelEvaluationParams {
    pub experiment_name: String,
}

impl Default for ModelEvaluationParams {
    fn default() -> Self {
        Self {
            experiment_name: "sentiment".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServingParams {
    pub host: String,
    pub port: u16,
}

impl Default for ServingParams {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

/// Optional overrides for the static language resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceParams {
    pub stop_words: ResourceSource,
    pub lemmas: ResourceSource,
}

impl Params {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ParamsError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path).map_err(|source| ParamsError::Io {
            path: path.display().to_string(),
            source,
        })?);
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Writes a fully defaulted parameter file, mirroring the example config
    /// generation of the CLI.
    pub fn write_example<P: AsRef<Path>>(path: P) -> Result<(), ParamsError> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path).map_err(|source| ParamsError::Io {
            path: path.display().to_string(),
            source,
        })?);
        Ok(serde_yaml::to_writer(writer, &Params::default())?)
    }
}

#[cfg(test)]
mod test {
    use super::Params;

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let params: Params = serde_yaml::from_str(
            "feature_engineering:\n  max_features: 50\n",
        )
        .unwrap();
        assert_eq!(params.feature_engineering.max_features, 50);
        assert_eq!(params.feature_engineering.vectorizer_name, "vectorizer");
        assert_eq!(params.data_ingestion.test_size, 0.2);
        assert!(params.preprocessing.min_tokens.is_none());
    }

    #[test]
    fn example_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.yaml");
        Params::write_example(&path).unwrap();
        let params = Params::load(&path).unwrap();
        assert_eq!(params.model_training.model_name, "model");
        assert_eq!(params.serving.port, 5001);
    }
}
