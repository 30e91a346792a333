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
use thiserror::Error;

pub mod environment;
pub mod params;
pub mod paths;

pub use environment::{EnvironmentConfig, EnvironmentError};
pub use params::{Params, ParamsError};
pub use paths::PathsConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
    #[error(transparent)]
    Params(#[from] ParamsError),
}

/// A collection of all configuration used by the pipeline.
/// Loaded once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct Configs {
    pub paths: PathsConfig,
    pub environment: EnvironmentConfig,
    pub params: Params,
}

impl Configs {
    pub fn new(paths: PathsConfig, environment: EnvironmentConfig, params: Params) -> Self {
        Self {
            paths,
            environment,
            params,
        }
    }

    /// Reads the environment once, then the parameter file it points to
    /// (an explicit `--params` wins over `PARAMS_FILE`).
    pub fn load(root: &Utf8Path, params_override: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let environment = EnvironmentConfig::from_env()?;
        let params_file = params_override
            .map(|value| value.to_path_buf())
            .unwrap_or_else(|| environment.params_file());
        let params = Params::load(&params_file)?;
        Ok(Self::new(PathsConfig::new(root), environment, params))
    }

    #[inline]
    pub fn paths(&self) -> &PathsConfig {
        &self.paths
    }

    #[inline]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[inline]
    pub fn environment(&self) -> &EnvironmentConfig {
        &self.environment
    }
}
