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

//! A file-backed model registry.
//!
//! Each registered model owns a directory under the registry root with an
//! `index.json` listing its versions and one subdirectory per version holding
//! the copied artifacts. The index is the single source of truth for stages.

pub mod stage;

use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, BufWriter};

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Index(#[from] serde_json::Error),
    #[error("artifact path {0:?} has no file name")]
    UnnamedArtifact(Utf8PathBuf),
    #[error("model {model:?} has no version {version}")]
    UnknownVersion { model: String, version: u32 },
    #[error("model {model:?} has no version at stage {stage}")]
    NoVersionAtStage { model: String, stage: Stage },
}

/// Lifecycle stage of a registered model version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    None,
    Staging,
    Production,
    Archived,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::None => "None",
            Self::Staging => "Staging",
            Self::Production => "Production",
            Self::Archived => "Archived",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVersion {
    pub version: u32,
    pub stage: Stage,
    pub run_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    pub artifacts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelIndex {
    name: String,
    versions: Vec<ModelVersion>,
}

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    root: Utf8PathBuf,
}

impl ModelRegistry {
    /// Opens (and if necessary creates) the registry at the given root.
    pub fn open<P: Into<Utf8PathBuf>>(root: P) -> Result<Self, RegistryError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Copies the artifacts into a fresh version directory and records the
    /// new version, entering at `None` and immediately moved to `Staging`.
    pub fn register(
        &self,
        model: &str,
        run_id: Option<Uuid>,
        artifacts: &[Utf8PathBuf],
    ) -> Result<ModelVersion, RegistryError> {
        let mut index = self.load_index(model)?;
        let version = index
            .versions
            .iter()
            .map(|entry| entry.version)
            .max()
            .unwrap_or(0)
            + 1;

        let version_dir = self.version_dir(model, version);
        std::fs::create_dir_all(&version_dir)?;
        let mut names = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let name = artifact
                .file_name()
                .ok_or_else(|| RegistryError::UnnamedArtifact(artifact.clone()))?;
            std::fs::copy(artifact, version_dir.join(name))?;
            names.push(name.to_string());
        }

        index.versions.push(ModelVersion {
            version,
            stage: Stage::None,
            run_id,
            created: OffsetDateTime::now_utc(),
            artifacts: names,
        });
        self.store_index(&index)?;
        log::info!("Registered {model} version {version}");

        let entry = self.transition(model, version, Stage::Staging)?;
        Ok(entry)
    }

    /// The newest version currently at `stage`.
    pub fn latest_version(
        &self,
        model: &str,
        stage: Stage,
    ) -> Result<Option<ModelVersion>, RegistryError> {
        let index = self.load_index(model)?;
        Ok(index
            .versions
            .into_iter()
            .filter(|entry| entry.stage == stage)
            .max_by_key(|entry| entry.version))
    }

    /// Moves one version to a new stage.
    pub fn transition(
        &self,
        model: &str,
        version: u32,
        stage: Stage,
    ) -> Result<ModelVersion, RegistryError> {
        let mut index = self.load_index(model)?;
        let entry = index
            .versions
            .iter_mut()
            .find(|entry| entry.version == version)
            .ok_or_else(|| RegistryError::UnknownVersion {
                model: model.to_string(),
                version,
            })?;
        entry.stage = stage;
        let entry = entry.clone();
        self.store_index(&index)?;
        log::info!("Transitioned {model} version {version} to {stage}");
        Ok(entry)
    }

    /// Promotes the newest `Staging` version to `Production`, archiving every
    /// version currently in `Production` first.
    pub fn promote(&self, model: &str) -> Result<ModelVersion, RegistryError> {
        let candidate = self.latest_version(model, Stage::Staging)?.ok_or_else(|| {
            RegistryError::NoVersionAtStage {
                model: model.to_string(),
                stage: Stage::Staging,
            }
        })?;

        let mut index = self.load_index(model)?;
        for entry in index
            .versions
            .iter_mut()
            .filter(|entry| entry.stage == Stage::Production)
        {
            entry.stage = Stage::Archived;
            log::info!("Archived {model} version {}", entry.version);
        }
        self.store_index(&index)?;

        self.transition(model, candidate.version, Stage::Production)
    }

    /// Where an artifact of a version lives inside the registry.
    pub fn artifact_path(&self, model: &str, version: u32, name: &str) -> Utf8PathBuf {
        self.version_dir(model, version).join(name)
    }

    fn version_dir(&self, model: &str, version: u32) -> Utf8PathBuf {
        self.root.join(model).join(version.to_string())
    }

    fn index_file(&self, model: &str) -> Utf8PathBuf {
        self.root.join(model).join("index.json")
    }

    fn load_index(&self, model: &str) -> Result<ModelIndex, RegistryError> {
        let file = self.index_file(model);
        if !file.exists() {
            return Ok(ModelIndex {
                name: model.to_string(),
                versions: Vec::new(),
            });
        }
        let reader = BufReader::new(File::options().read(true).open(file)?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn store_index(&self, index: &ModelIndex) -> Result<(), RegistryError> {
        let file = self.index_file(&index.name);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(
            File::options()
                .write(true)
                .create(true)
                .truncate(true)
                .open(file)?,
        );
        Ok(serde_json::to_writer_pretty(writer, index)?)
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use camino::Utf8PathBuf;

    use super::{ModelRegistry, RegistryError, Stage};

    fn temp_root(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn artifact(dir: &Utf8PathBuf, name: &str, content: &[u8]) -> Utf8PathBuf {
        let path = dir.join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(content)
            .unwrap();
        path
    }

    #[test]
    fn registration_copies_artifacts_and_enters_staging() {
        let dir = tempfile::tempdir().unwrap();
        let root = temp_root(&dir);
        let model_file = artifact(&root, "model.model", b"weights");

        let registry = ModelRegistry::open(root.join("registry")).unwrap();
        let entry = registry
            .register("sentiment", None, &[model_file])
            .unwrap();

        assert_eq!(entry.version, 1);
        assert_eq!(entry.stage, Stage::Staging);
        let stored = registry.artifact_path("sentiment", 1, "model.model");
        assert_eq!(std::fs::read(stored).unwrap(), b"weights");
    }

    #[test]
    fn versions_are_allocated_sequentially() {
        let dir = tempfile::tempdir().unwrap();
        let root = temp_root(&dir);
        let model_file = artifact(&root, "model.model", b"weights");

        let registry = ModelRegistry::open(root.join("registry")).unwrap();
        let first = registry.register("sentiment", None, &[model_file.clone()]).unwrap();
        let second = registry.register("sentiment", None, &[model_file]).unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);

        let latest = registry
            .latest_version("sentiment", Stage::Staging)
            .unwrap()
            .unwrap();
        assert_eq!(latest.version, 2);
    }

    #[test]
    fn promotion_archives_the_previous_production_version() {
        let dir = tempfile::tempdir().unwrap();
        let root = temp_root(&dir);
        let model_file = artifact(&root, "model.model", b"weights");

        let registry = ModelRegistry::open(root.join("registry")).unwrap();
        registry.register("sentiment", None, &[model_file.clone()]).unwrap();
        registry.register("sentiment", None, &[model_file]).unwrap();

        let promoted = registry.promote("sentiment").unwrap();
        assert_eq!(promoted.version, 2);
        assert_eq!(promoted.stage, Stage::Production);

        // no staging versions are left, a second promotion has nothing to take
        assert!(matches!(
            registry.promote("sentiment"),
            Err(RegistryError::NoVersionAtStage { .. })
        ));

        let production = registry
            .latest_version("sentiment", Stage::Production)
            .unwrap()
            .unwrap();
        assert_eq!(production.version, 2);
    }

    #[test]
    fn promoting_twice_archives_the_older_version() {
        let dir = tempfile::tempdir().unwrap();
        let root = temp_root(&dir);
        let model_file = artifact(&root, "model.model", b"weights");

        let registry = ModelRegistry::open(root.join("registry")).unwrap();
        registry.register("sentiment", None, &[model_file.clone()]).unwrap();
        registry.promote("sentiment").unwrap();
        registry.register("sentiment", None, &[model_file]).unwrap();
        registry.promote("sentiment").unwrap();

        let archived = registry
            .latest_version("sentiment", Stage::Archived)
            .unwrap()
            .unwrap();
        assert_eq!(archived.version, 1);
    }

    #[test]
    fn transitions_to_unknown_versions_fail() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::open(temp_root(&dir).join("registry")).unwrap();
        assert!(matches!(
            registry.transition("sentiment", 7, Stage::Production),
            Err(RegistryError::UnknownVersion { version: 7, .. })
        ));
    }
}
