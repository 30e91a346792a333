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
use std::io::{BufReader, BufWriter, Read};

use camino::Utf8Path;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// A row of the raw dataset as it arrives from object storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReview {
    pub review: String,
    pub sentiment: String,
}

/// A row after label mapping: `positive` -> 1, `negative` -> 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledReview {
    pub review: String,
    pub sentiment: u8,
}

pub fn read_records<T: DeserializeOwned, P: AsRef<Utf8Path>>(path: P) -> Result<Vec<T>, DataError> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    read_records_from(reader)
}

/// Reads typed records from any CSV source. A missing expected column
/// surfaces as a fatal `Csv` error.
pub fn read_records_from<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, DataError> {
    csv::Reader::from_reader(reader)
        .into_deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(DataError::from)
}

/// Writes typed records, creating the parent directory if needed.
pub fn write_records<T: Serialize, P: AsRef<Utf8Path>>(
    path: P,
    records: &[T],
) -> Result<(), DataError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_writer(BufWriter::new(File::create(path)?));
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use camino::Utf8PathBuf;

    use super::{read_records, read_records_from, write_records, LabelledReview, RawReview};

    #[test]
    fn round_trips_labelled_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("nested/rows.csv")).unwrap();
        let rows = vec![
            LabelledReview {
                review: "movie great".to_string(),
                sentiment: 1,
            },
            LabelledReview {
                review: "awful, skip it".to_string(),
                sentiment: 0,
            },
        ];
        write_records(&path, &rows).unwrap();
        let read: Vec<LabelledReview> = read_records(&path).unwrap();
        assert_eq!(read, rows);
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = "text,label\nhello,1\n";
        let result = read_records_from::<RawReview, _>(csv.as_bytes());
        assert!(result.is_err());
    }
}
