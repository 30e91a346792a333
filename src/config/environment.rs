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

use camino::Utf8PathBuf;
use thiserror::Error;

pub const S3_BUCKET: &str = "S3_BUCKET";
pub const S3_ACCESS_KEY: &str = "S3_ACCESS_KEY";
pub const S3_SECRET_KEY: &str = "S3_SECRET_KEY";
pub const PARAMS_FILE: &str = "PARAMS_FILE";
pub const REGISTRY_URI: &str = "REGISTRY_URI";

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("{0} is not set and no default value is provided")]
    Missing(&'static str),
    #[error("{name} holds a non-unicode value")]
    NotUnicode { name: &'static str },
}

/// Environment-provided configuration, read once at startup. Components get a
/// reference to this instead of reading the process environment ad hoc.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentConfig {
    s3_bucket: Option<String>,
    s3_access_key: Option<String>,
    s3_secret_key: Option<String>,
    params_file: Option<Utf8PathBuf>,
    registry_uri: Option<Utf8PathBuf>,
}

fn var(name: &'static str) -> Result<Option<String>, EnvironmentError> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(EnvironmentError::NotUnicode { name }),
    }
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self, EnvironmentError> {
        Ok(Self {
            s3_bucket: var(S3_BUCKET)?,
            s3_access_key: var(S3_ACCESS_KEY)?,
            s3_secret_key: var(S3_SECRET_KEY)?,
            params_file: var(PARAMS_FILE)?.map(Utf8PathBuf::from),
            registry_uri: var(REGISTRY_URI)?.map(Utf8PathBuf::from),
        })
    }

    /// The parameter file, defaulting to `params.yaml` in the working
    /// directory.
    pub fn params_file(&self) -> Utf8PathBuf {
        self.params_file
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from("params.yaml"))
    }

    /// The bucket holding the raw data. Required for ingestion.
    pub fn s3_bucket(&self) -> Result<&str, EnvironmentError> {
        self.s3_bucket
            .as_deref()
            .ok_or(EnvironmentError::Missing(S3_BUCKET))
    }

    pub fn s3_credentials(&self) -> Option<(&str, &str)> {
        match (self.s3_access_key.as_deref(), self.s3_secret_key.as_deref()) {
            (Some(access), Some(secret)) => Some((access, secret)),
            _ => None,
        }
    }

    /// The model registry root. Required for registration, promotion and
    /// serving.
    pub fn registry_uri(&self) -> Result<&camino::Utf8Path, EnvironmentError> {
        self.registry_uri
            .as_deref()
            .ok_or(EnvironmentError::Missing(REGISTRY_URI))
    }

    #[cfg(test)]
    pub fn for_test(
        s3_bucket: Option<String>,
        registry_uri: Option<Utf8PathBuf>,
    ) -> Self {
        Self {
            s3_bucket,
            registry_uri,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod test {
    use super::EnvironmentConfig;

    #[test]
    fn missing_required_values_are_errors() {
        let config = EnvironmentConfig::default();
        assert!(config.s3_bucket().is_err());
        assert!(config.registry_uri().is_err());
        assert_eq!(config.params_file(), "params.yaml");
    }

    #[test]
    fn credentials_require_both_halves() {
        let config = EnvironmentConfig {
            s3_access_key: Some("key".into()),
            ..EnvironmentConfig::default()
        };
        assert!(config.s3_credentials().is_none());
    }
}
