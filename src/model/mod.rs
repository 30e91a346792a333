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

//! Model training, the sentiment classifier and offline evaluation.

use liblinear::errors::{ModelError, PredictionInputError, TrainingInputError};
use thiserror::Error;

pub mod classifier;
pub mod evaluate;
pub mod train;

pub use classifier::{Sentiment, SentimentClassifier};

/// An error from liblinear
#[derive(Debug, Error)]
pub enum LibLinearError {
    #[error(transparent)]
    Training(#[from] TrainingInputError),
    #[error(transparent)]
    Build(#[from] ModelError),
    #[error(transparent)]
    Prediction(#[from] PredictionInputError),
}

/// An error from the training or evaluation stages
#[derive(Debug, Error)]
pub enum ModelStageError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    LibLinear(#[from] LibLinearError),
    #[error(transparent)]
    Featurize(#[from] crate::bow::FeaturizeError),
    #[error(transparent)]
    Serialisation(#[from] serde_json::Error),
    #[error("the stored model does not use the expected solver")]
    SolverMismatch,
}

impl From<ModelError> for ModelStageError {
    fn from(value: ModelError) -> Self {
        Self::LibLinear(LibLinearError::Build(value))
    }
}

impl From<TrainingInputError> for ModelStageError {
    fn from(value: TrainingInputError) -> Self {
        Self::LibLinear(LibLinearError::Training(value))
    }
}

impl From<PredictionInputError> for ModelStageError {
    fn from(value: PredictionInputError) -> Self {
        Self::LibLinear(LibLinearError::Prediction(value))
    }
}
