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

use crate::cli::build::{build_locally, resolve_target_image, SourceOptions};
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
use crate::domain::apis::{Application, ApplicationSpec, Conditioned};
use crate::domain::parsers;
use crate::domain::validation::FieldError;
use crate::infrastructure::constants::{APPLICATION_BUILDER, LABEL_APPLICATION, TAIL_SINCE_CREATE};
use crate::shared::error::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use comfy_table::Cell;
use std::collections::BTreeMap;

impl Noun for Application {
    const SINGULAR: &'static str = "application";
    const PLURAL: &'static str = "applications";
    const NOUN: &'static str = "application";
}

impl Listable for Application {
    fn list_headers() -> &'static [&'static str] {
        &["Name", "Latest Image", "Status", "Age"]
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
            format_condition_status(self.ready_condition()),
            format_timestamp_since(self.metadata.creation_timestamp.as_ref(), now),
        ]
    }
}

impl Tailable for Application {
    const LOG_LABEL: &'static str = LABEL_APPLICATION;
    const CONTAINERS: &'static [&'static str] = &[];
}

/// Applications built from source with Cloud Native Buildpacks
#[derive(Subcommand, Debug)]
pub enum ApplicationCommand {
    /// create an application from source
    Create(ApplicationCreateOptions),
    /// table listing of applications
    List(ListOptions),
    /// delete application(s)
    Delete(DeleteOptions),
    /// show application readiness
    Status(ResourceOptions),
    /// watch build logs
    Tail(TailOptions),
}

impl ApplicationCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        match self {
            Self::Create(opts) => run(config, opts).await,
            Self::List(opts) => run(config, ListVerb::<Application>::new(opts)).await,
            Self::Delete(opts) => run(config, DeleteVerb::<Application>::new(opts)).await,
            Self::Status(opts) => run(config, StatusVerb::<Application>::new(opts)).await,
            Self::Tail(opts) => run(config, TailVerb::<Application>::new(opts)).await,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ApplicationCreateOptions {
    #[command(flatten)]
    pub resource: ResourceOptions,

    /// repository where the built images are pushed
    #[arg(long, value_name = "repository")]
    pub image: Option<String>,

    #[command(flatten)]
    pub source: SourceOptions,

    #[command(flatten)]
    pub watch: WatchOptions,
}

impl ApplicationCreateOptions {
    fn image(&self) -> &str {
        self.image.as_deref().unwrap_or_default()
    }
}

impl Validatable for ApplicationCreateOptions {
    fn validate(&self) -> FieldError {
        let mut errs = self.resource.validate();
        if self.image().is_empty() {
            errs = errs.also(FieldError::missing_field([flags::IMAGE]));
        }
        errs.also(self.source.validate()).also(self.watch.validate())
    }
}

#[async_trait::async_trait]
impl Executable for ApplicationCreateOptions {
    fn resolve(&mut self, config: &Config) {
        self.resource.resolve(config);
    }

    async fn exec(&self, config: &Config) -> Result<()> {
        let namespace = self.resource.namespace();
        let name = &self.resource.name;

        let mut application = Application::new(
            name,
            ApplicationSpec {
                image: self.image().to_string(),
                cache_size: self.source.cache_size.as_deref().and_then(parsers::quantity),
                source: self.source.source(),
            },
        );
        application.metadata.namespace = Some(namespace.to_string());

        if let Some(local_path) = self.source.local_path() {
            let target = resolve_target_image(config, namespace, self.image(), name).await?;
            build_locally(
                config,
                target,
                local_path,
                APPLICATION_BUILDER.to_string(),
                BTreeMap::new(),
            )
            .await?;
        }

        if self.watch.dry_run {
            dry_run_resource(config, &application)?;
        } else {
            config.api::<Application>(namespace).create(&application).await?;
        }
        config.successf(&format!("Created application {:?}\n", name))?;

        if self.watch.tail {
            config.infof(&format!(
                "Waiting for application {:?} to become ready...\n",
                name
            ))?;
            let since = parsers::duration(TAIL_SINCE_CREATE).unwrap_or_default();
            wait_and_tail::<Application>(config, namespace, name, &self.watch.wait_timeout, since)
                .await?;
            config.successf(&format!("Application {:?} is ready\n", name))?;
        }
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        self.watch.dry_run
    }
}
