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

use anyhow::Context;
use clap::Parser;

use crate::args::{PolarityArgs, RunMode};
use crate::config::{Configs, Params};
use crate::text::LanguageResources;

mod args;
mod bow;
mod config;
mod data;
mod logging;
mod model;
mod registry;
mod serve;
mod text;

fn main() -> anyhow::Result<()> {
    let args = PolarityArgs::parse();

    if args.generate_example_params {
        Params::write_example("params.example.yaml")
            .context("could not write the example parameter file")?;
        println!("Wrote params.example.yaml");
        return Ok(());
    }

    let Some(mode) = args.mode else {
        println!("Nothing to do, pick a stage (see --help).");
        return Ok(());
    };

    logging::configure_logging(&args, &args.root);
    let configs = Configs::load(&args.root, args.params.as_deref())
        .context("could not load the configuration")?;

    exec(mode, &configs)
}

fn exec(mode: RunMode, configs: &Configs) -> anyhow::Result<()> {
    match mode {
        RunMode::Ingest => data::ingest::run(configs)?,
        RunMode::Preprocess => {
            let resources = load_resources(configs)?;
            data::preprocess::run(configs, &resources)?
        }
        RunMode::Featurize => bow::engineering::run(configs)?,
        RunMode::Train => model::train::run(configs)?,
        RunMode::Evaluate => {
            model::evaluate::run(configs)?;
        }
        RunMode::Register => {
            let entry = registry::stage::register(configs)?;
            log::info!("Version {} is now in {}", entry.version, entry.stage);
        }
        RunMode::Promote => {
            let entry = registry::stage::promote(configs)?;
            log::info!("Version {} is now in {}", entry.version, entry.stage);
        }
        RunMode::Serve => serve::run(configs)?,
    }
    Ok(())
}

fn load_resources(configs: &Configs) -> anyhow::Result<LanguageResources> {
    let resources = &configs.params().resources;
    LanguageResources::load(&resources.stop_words, &resources.lemmas)
        .context("could not load the language resources")
}
