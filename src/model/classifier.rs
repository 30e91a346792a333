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

use std::fmt::{Debug, Formatter};

use liblinear::model::traits::ModelBase;
use liblinear::solver::L1R_LR;
use liblinear::{Model, PredictionInput};
use serde::{Deserialize, Serialize};

use crate::bow::CountVectorizer;
use crate::model::LibLinearError;
use crate::text::TextNormalizer;

/// The two classes of the classifier, mapped from the labels 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Positive,
}

impl Sentiment {
    pub fn from_label(label: f64) -> Self {
        if label >= 0.5 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Positive => "positive",
        }
    }
}

/// The full inference path: normalizer, fitted vectorizer and trained model.
/// All three are the artifacts the batch pipeline produced, so a text is
/// treated exactly as it would have been at training time.
pub struct SentimentClassifier {
    model: Model<L1R_LR>,
    vectorizer: CountVectorizer,
    normalizer: TextNormalizer,
}

impl Debug for SentimentClassifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentClassifier")
            .field("vocabulary_size", &self.vectorizer.vocabulary_size())
            .finish_non_exhaustive()
    }
}

impl SentimentClassifier {
    pub fn new(
        model: Model<L1R_LR>,
        vectorizer: CountVectorizer,
        normalizer: TextNormalizer,
    ) -> Self {
        Self {
            model,
            vectorizer,
            normalizer,
        }
    }

    pub fn predict(&self, text: &str) -> Result<Sentiment, LibLinearError> {
        let input = self.prediction_input(text)?;
        Ok(Sentiment::from_label(self.model.predict(&input)?))
    }

    /// Probability of the positive class, from the decision value of the
    /// logistic regression.
    pub fn positive_probability(&self, text: &str) -> Result<f64, LibLinearError> {
        let input = self.prediction_input(text)?;
        let (decision_values, _) = self.model.predict_values(&input)?;
        let first = decision_values.first().copied().unwrap_or(0.0);
        // a positive decision value votes for the first label of the model
        let first_probability = 1.0 / (1.0 + (-first).exp());
        if self.model.labels().first() == Some(&1) {
            Ok(first_probability)
        } else {
            Ok(1.0 - first_probability)
        }
    }

    fn prediction_input(&self, text: &str) -> Result<PredictionInput, LibLinearError> {
        let normalized = self.normalizer.normalize(text);
        let mut sparse = self.vectorizer.sparse_features(&normalized);
        if sparse.is_empty() {
            // liblinear rejects empty inputs, a zero weight changes nothing
            sparse.push((1, 0.0));
        }
        Ok(PredictionInput::from_sparse_features(sparse)?)
    }
}
