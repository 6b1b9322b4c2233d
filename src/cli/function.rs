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

use crate::cli::build::{build_locally, registered_builder, resolve_target_image, SourceOptions};
use crate::cli::config::Config;
use crate::cli::flags;
use crate::cli::display::format::{format_condition_status, format_empty_string, format_timestamp_since};
use crate::cli::options::{
    dry_run_resource, run, DeleteOptions, Executable, ListOptions, ResourceOptions, Validatable,
    WatchOptions,
};
use crate::cli::verbs::{
    wait_and_tail, DeleteVerb, ListVerb, Listable, Noun, StatusVerb, TailOptions, TailVerb,
    Tailable,
};
use crate::domain::apis::{Conditioned, Function, FunctionSpec};
use crate::domain::parsers;
use crate::domain::validation::FieldError;
use crate::infrastructure::constants::{FUNCTION_BUILDER_KEY, LABEL_FUNCTION, TAIL_SINCE_CREATE};
use crate::shared::error::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use comfy_table::Cell;
use std::collections::BTreeMap;

impl Noun for Function {
    const SINGULAR: &'static str = "function";
    const PLURAL: &'static str = "functions";
    const NOUN: &'static str = "function";
}

impl Listable for Function {
    fn list_headers() -> &'static [&'static str] {
        &["Name", "Latest Image", "Artifact", "Handler", "Invoker", "Status", "Age"]
    }

    fn list_row(&self, now: DateTime<Utc>) -> Vec<Cell> {
        let latest_image = self
            .status
            .as_ref()
            .map(|s| s.latest_image.as_str())
            .unwrap_or_default();
        vec![
            Cell::new(self.metadata.name.clone().unwrap_or_default()),
            format_empty_string(latest_image),
            format_empty_string(&self.spec.artifact),
            format_empty_string(&self.spec.handler),
            format_empty_string(&self.spec.invoker),
            format_condition_status(self.ready_condition()),
            format_timestamp_since(self.metadata.creation_timestamp.as_ref(), now),
        ]
    }
}

impl Tailable for Function {
    const LOG_LABEL: &'static str = LABEL_FUNCTION;
    const CONTAINERS: &'static [&'static str] = &[];
}

/// Functions built from source with the riff function buildpack
#[derive(Subcommand, Debug)]
pub enum FunctionCommand {
    /// create a function from source
    Create(FunctionCreateOptions),
    /// table listing of functions
    List(ListOptions),
    /// delete function(s)
    Delete(DeleteOptions),
    /// show function readiness
    Status(ResourceOptions),
    /// watch build logs
    Tail(TailOptions),
}

impl FunctionCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        match self {
            Self::Create(opts) => run(config, opts).await,
            Self::List(opts) => run(config, ListVerb::<Function>::new(opts)).await,
            Self::Delete(opts) => run(config, DeleteVerb::<Function>::new(opts)).await,
            Self::Status(opts) => run(config, StatusVerb::<Function>::new(opts)).await,
            Self::Tail(opts) => run(config, TailVerb::<Function>::new(opts)).await,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FunctionCreateOptions {
    #[command(flatten)]
    pub resource: ResourceOptions,

    /// repository where the built images are pushed; `_` uses the default image prefix
    #[arg(long, value_name = "repository", default_value = "_")]
    pub image: String,

    /// path to the function source code
    #[arg(long, value_name = "file", default_value = "")]
    pub artifact: String,

    /// name of the method or class to invoke
    #[arg(long, value_name = "name", default_value = "")]
    pub handler: String,

    /// language runtime invoker, detected when not set
    #[arg(long, value_name = "name", default_value = "")]
    pub invoker: String,

    #[command(flatten)]
    pub source: SourceOptions,

    #[command(flatten)]
    pub watch: WatchOptions,
}

impl Default for FunctionCreateOptions {
    fn default() -> Self {
        Self {
            resource: ResourceOptions::default(),
            image: "_".to_string(),
            artifact: String::new(),
            handler: String::new(),
            invoker: String::new(),
            source: SourceOptions::default(),
            watch: WatchOptions::default(),
        }
    }
}

impl FunctionCreateOptions {
    fn build_env(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("RIFF".to_string(), "true".to_string()),
            ("RIFF_ARTIFACT".to_string(), self.artifact.clone()),
            ("RIFF_HANDLER".to_string(), self.handler.clone()),
            ("RIFF_OVERRIDE".to_string(), self.invoker.clone()),
        ])
    }
}

impl Validatable for FunctionCreateOptions {
    fn validate(&self) -> FieldError {
        let mut errs = self.resource.validate();
        if self.image.is_empty() {
            errs = errs.also(FieldError::missing_field([flags::IMAGE]));
        }
        errs.also(self.source.validate()).also(self.watch.validate())
    }
}

#[async_trait::async_trait]
impl Executable for FunctionCreateOptions {
    fn resolve(&mut self, config: &Config) {
        self.resource.resolve(config);
    }

    async fn exec(&self, config: &Config) -> Result<()> {
        let namespace = self.resource.namespace();
        let name = &self.resource.name;

        let mut function = Function::new(
            name,
            FunctionSpec {
                image: self.image.clone(),
                artifact: self.artifact.clone(),
                handler: self.handler.clone(),
                invoker: self.invoker.clone(),
                cache_size: self.source.cache_size.as_deref().and_then(parsers::quantity),
                source: self.source.source(),
            },
        );
        function.metadata.namespace = Some(namespace.to_string());

        if let Some(local_path) = self.source.local_path() {
            let target = resolve_target_image(config, namespace, &self.image, name).await?;
            let builder = registered_builder(config, FUNCTION_BUILDER_KEY).await?;
            build_locally(config, target, local_path, builder, self.build_env()).await?;
        }

        if self.watch.dry_run {
            dry_run_resource(config, &function)?;
        } else {
            config.api::<Function>(namespace).create(&function).await?;
        }
        config.successf(&format!("Created function {:?}\n", name))?;

        if self.watch.tail {
            config.infof(&format!("Waiting for function {:?} to become ready...\n", name))?;
            let since = parsers::duration(TAIL_SINCE_CREATE).unwrap_or_default();
            wait_and_tail::<Function>(config, namespace, name, &self.watch.wait_timeout, since)
                .await?;
            config.successf(&format!("Function {:?} is ready\n", name))?;
        }
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        self.watch.dry_run
    }
}
