// Copyright 2025 JiangLong.
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

use crate::cli::config::Config;
use crate::cli::display::format::{format_condition_status, format_empty_string, format_timestamp_since};
use crate::cli::flags;
use crate::cli::options::{
    dry_run_resource, run, DeleteOptions, Executable, ListOptions, ResourceOptions, Validatable,
    WatchOptions,
};
use crate::cli::verbs::{
    wait_and_tail, DeleteVerb, ListVerb, Listable, Noun, StatusVerb, TailOptions, TailVerb,
    Tailable,
};
use crate::domain::apis::{Conditioned, Processor, ProcessorSpec};
use crate::domain::parsers;
use crate::domain::validation::{validators, FieldError};
use crate::infrastructure::constants::{
    CONTAINER_NAME_FUNCTION, CONTAINER_NAME_PROCESSOR, LABEL_PROCESSOR, TAIL_SINCE_CREATE,
};
use crate::shared::error::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use comfy_table::Cell;

impl Noun for Processor {
    const SINGULAR: &'static str = "processor";
    const PLURAL: &'static str = "processors";
    const NOUN: &'static str = "processor";
}

impl Listable for Processor {
    fn list_headers() -> &'static [&'static str] {
        &["Name", "Function", "Inputs", "Outputs", "Status", "Age"]
    }

    fn list_row(&self, now: DateTime<Utc>) -> Vec<Cell> {
        vec![
            Cell::new(self.metadata.name.clone().unwrap_or_default()),
            format_empty_string(&self.spec.function_ref),
            format_empty_string(&self.spec.inputs.join(",")),
            format_empty_string(&self.spec.outputs.join(",")),
            format_condition_status(self.ready_condition()),
            format_timestamp_since(self.metadata.creation_timestamp.as_ref(), now),
        ]
    }
}

impl Tailable for Processor {
    const LOG_LABEL: &'static str = LABEL_PROCESSOR;
    const CONTAINERS: &'static [&'static str] = &[CONTAINER_NAME_FUNCTION, CONTAINER_NAME_PROCESSOR];
}

/// Processors apply functions to messages on streams
#[derive(Subcommand, Debug)]
pub enum ProcessorCommand {
    /// create a processor to apply a function to messages on streams
    Create(ProcessorCreateOptions),
    /// table listing of processors
    List(ListOptions),
    /// delete processor(s)
    Delete(DeleteOptions),
    /// show processor readiness
    Status(ResourceOptions),
    /// watch processor logs
    Tail(TailOptions),
}

impl ProcessorCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        match self {
            Self::Create(opts) => run(config, opts).await,
            Self::List(opts) => run(config, ListVerb::<Processor>::new(opts)).await,
            Self::Delete(opts) => run(config, DeleteVerb::<Processor>::new(opts)).await,
            Self::Status(opts) => run(config, StatusVerb::<Processor>::new(opts)).await,
            Self::Tail(opts) => run(config, TailVerb::<Processor>::new(opts)).await,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProcessorCreateOptions {
    #[command(flatten)]
    pub resource: ResourceOptions,

    /// name of function to apply to the input streams
    #[arg(long, value_name = "name")]
    pub function_ref: Option<String>,

    /// name of stream to read messages from (may be set multiple times)
    #[arg(long, value_name = "name")]
    pub input: Vec<String>,

    /// name of stream to write messages to (may be set multiple times)
    #[arg(long, value_name = "name")]
    pub output: Vec<String>,

    #[command(flatten)]
    pub watch: WatchOptions,
}

impl Validatable for ProcessorCreateOptions {
    fn validate(&self) -> FieldError {
        let mut errs = self.resource.validate();
        if self.function_ref.as_deref().unwrap_or_default().is_empty() {
            errs = errs.also(FieldError::missing_field([flags::FUNCTION_REF]));
        }
        if self.input.is_empty() {
            errs = errs.also(FieldError::missing_field([flags::INPUT]));
        } else {
            errs = errs.also(validators::k8s_names(&self.input, flags::INPUT));
        }
        errs.also(validators::k8s_names(&self.output, flags::OUTPUT))
            .also(self.watch.validate())
    }
}

#[async_trait::async_trait]
impl Executable for ProcessorCreateOptions {
    fn resolve(&mut self, config: &Config) {
        self.resource.resolve(config);
    }

    async fn exec(&self, config: &Config) -> Result<()> {
        let namespace = self.resource.namespace();
        let name = &self.resource.name;

        let mut processor = Processor::new(
            name,
            ProcessorSpec {
                function_ref: self.function_ref.clone().unwrap_or_default(),
                inputs: self.input.clone(),
                outputs: self.output.clone(),
            },
        );
        processor.metadata.namespace = Some(namespace.to_string());

        if self.watch.dry_run {
            dry_run_resource(config, &processor)?;
        } else {
            config.api::<Processor>(namespace).create(&processor).await?;
        }
        config.successf(&format!("Created processor {:?}\n", name))?;

        if self.watch.tail {
            config.infof(&format!("Waiting for processor {:?} to become ready...\n", name))?;
            let since = parsers::duration(TAIL_SINCE_CREATE).unwrap_or_default();
            wait_and_tail::<Processor>(config, namespace, name, &self.watch.wait_timeout, since)
                .await?;
            config.successf(&format!("Processor {:?} is ready\n", name))?;
        }
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        self.watch.dry_run
    }
}
