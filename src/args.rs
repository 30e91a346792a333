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
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Train, register and serve a sentiment classifier.
pub struct PolarityArgs {
    /// Write an exemplary params.example.yaml and exit
    #[arg(long)]
    pub generate_example_params: bool,

    /// The project root holding data/, models/ and reports/
    #[arg(long, default_value = ".")]
    pub root: Utf8PathBuf,

    /// The parameter file, overriding the PARAMS_FILE variable
    #[arg(long)]
    pub params: Option<Utf8PathBuf>,

    /// The log level of the pipeline
    #[arg(long, default_value_t = log::LevelFilter::Info)]
    pub log_level: log::LevelFilter,

    /// Log to file
    #[arg(long)]
    pub log_to_file: bool,

    /// The pipeline stage to run
    #[command(subcommand)]
    pub mode: Option<RunMode>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Fetch the raw reviews from object storage and write the raw splits.
    Ingest,
    /// Normalize the review text of both splits.
    Preprocess,
    /// Fit the vectorizer and write the bag-of-words CSVs.
    Featurize,
    /// Train the logistic regression on the training features.
    Train,
    /// Score the model on the test split and record the run.
    Evaluate,
    /// Register the trained artifacts as a new staging version.
    Register,
    /// Promote the newest staging version to production.
    Promote,
    /// Serve predictions over HTTP.
    Serve,
}

#[cfg(test)]
mod test {
    use clap::Parser;

    use super::{PolarityArgs, RunMode};

    #[test]
    fn stages_parse_as_subcommands() {
        let args = PolarityArgs::parse_from(["polarity", "--root", "/tmp/run", "train"]);
        assert_eq!(args.mode, Some(RunMode::Train));
        assert_eq!(args.root, "/tmp/run");
        assert_eq!(args.log_level, log::LevelFilter::Info);
    }

    #[test]
    fn the_example_flag_needs_no_subcommand() {
        let args = PolarityArgs::parse_from(["polarity", "--generate-example-params"]);
        assert!(args.generate_example_params);
        assert!(args.mode.is_none());
    }
}
