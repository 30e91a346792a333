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

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// The on-disk layout of a pipeline run, everything relative to a single
/// project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    root: Utf8PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("."),
        }
    }
}

impl PathsConfig {
    pub fn new<P: AsRef<Utf8Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn raw_data_dir(&self) -> Utf8PathBuf {
        self.root.join("data/raw")
    }

    pub fn interim_data_dir(&self) -> Utf8PathBuf {
        self.root.join("data/interim")
    }

    pub fn processed_data_dir(&self) -> Utf8PathBuf {
        self.root.join("data/processed")
    }

    pub fn models_dir(&self) -> Utf8PathBuf {
        self.root.join("models")
    }

    pub fn reports_dir(&self) -> Utf8PathBuf {
        self.root.join("reports")
    }

    pub fn train_data_file(&self) -> Utf8PathBuf {
        self.raw_data_dir().join("train.csv")
    }

    pub fn test_data_file(&self) -> Utf8PathBuf {
        self.raw_data_dir().join("test.csv")
    }

    pub fn train_processed_file(&self) -> Utf8PathBuf {
        self.interim_data_dir().join("train_processed.csv")
    }

    pub fn test_processed_file(&self) -> Utf8PathBuf {
        self.interim_data_dir().join("test_processed.csv")
    }

    pub fn train_bow_file(&self) -> Utf8PathBuf {
        self.processed_data_dir().join("train_bow.csv")
    }

    pub fn test_bow_file(&self) -> Utf8PathBuf {
        self.processed_data_dir().join("test_bow.csv")
    }

    pub fn vectorizer_file(&self, name: &str) -> Utf8PathBuf {
        self.models_dir().join(format!("{name}.bin"))
    }

    pub fn model_file(&self, name: &str) -> Utf8PathBuf {
        self.models_dir().join(format!("{name}.model"))
    }

    pub fn metrics_file(&self) -> Utf8PathBuf {
        self.reports_dir().join("metrics.json")
    }

    pub fn experiment_info_file(&self) -> Utf8PathBuf {
        self.reports_dir().join("experiment_info.json")
    }
}
