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

use std::fmt::Debug;
use std::io::Read;
use std::time::Duration;

use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("object {key:?} not available: status {status}")]
    Status { key: String, status: u16 },
}

/// Fetches raw objects from a bucket. The pipeline treats the store as a
/// read-only collaborator; failures are fatal and propagated.
pub trait ObjectStorage: Debug {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StorageError>;
}

/// A bucket that is just a directory. Used for local runs and tests.
#[derive(Debug)]
pub struct FsObjectStorage {
    root: Utf8PathBuf,
}

impl FsObjectStorage {
    pub fn new<P: Into<Utf8PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl ObjectStorage for FsObjectStorage {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let mut data = Vec::new();
        std::fs::File::open(self.root.join(key))?.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// A bucket behind an HTTP endpoint (presigned or gateway-fronted object
/// storage). Credentials, when present, travel as basic auth.
#[derive(Debug)]
pub struct HttpObjectStorage {
    base: String,
    credentials: Option<(String, String)>,
    client: reqwest::blocking::Client,
}

impl HttpObjectStorage {
    pub fn new(base: &str, credentials: Option<(&str, &str)>) -> Result<Self, StorageError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            credentials: credentials.map(|(a, s)| (a.to_string(), s.to_string())),
            client,
        })
    }
}

impl ObjectStorage for HttpObjectStorage {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let mut request = self.client.get(format!("{}/{}", self.base, key));
        if let Some((access, secret)) = &self.credentials {
            request = request.basic_auth(access, Some(secret));
        }
        let response = request.send()?;
        if !response.status().is_success() {
            return Err(StorageError::Status {
                key: key.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }
}

/// Picks a store implementation from the bucket value: an `http(s)` URL goes
/// through the network, anything else is a local directory.
pub fn for_bucket(
    bucket: &str,
    credentials: Option<(&str, &str)>,
) -> Result<Box<dyn ObjectStorage>, StorageError> {
    if bucket.starts_with("http://") || bucket.starts_with("https://") {
        Ok(Box::new(HttpObjectStorage::new(bucket, credentials)?))
    } else {
        Ok(Box::new(FsObjectStorage::new(bucket)))
    }
}
