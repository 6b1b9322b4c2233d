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
use crate::cli::display::format::{
    format_condition_status, format_empty_string, format_reference, format_timestamp_since,
};
use crate::cli::options::{
    dry_run_resource, run, DeleteOptions, Executable, ListOptions, ResourceOptions, Validatable,
    WatchOptions,
};
use crate::cli::verbs::{
    wait_and_tail, DeleteVerb, ListVerb, Listable, Noun, StatusVerb, TailOptions, TailVerb,
    Tailable,
};
use crate::cli::workload::{InvokeOptions, InvokeVerb, Invokable, WorkloadOptions};
use crate::domain::apis::request::workload_reference;
use crate::domain::apis::{Conditioned, Handler, HandlerSpec};
use crate::domain::parsers;
use crate::domain::validation::FieldError;
use crate::infrastructure::constants::{CONTAINER_NAME_HANDLER, LABEL_HANDLER, TAIL_SINCE_CREATE};
use crate::shared::error::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use comfy_table::Cell;

impl Noun for Handler {
    const SINGULAR: &'static str = "handler";
    const PLURAL: &'static str = "handlers";
    const NOUN: &'static str = "handler";
}

impl Listable for Handler {
    fn list_headers() -> &'static [&'static str] {
        &["Name", "Type", "Ref", "Host", "Status", "Age"]
    }

    fn list_row(&self, now: DateTime<Utc>) -> Vec<Cell> {
        let [kind, reference] =
            format_reference(workload_reference(self.spec.build.as_ref(), self.spec.template.as_ref()));
        let host = self
            .status
            .as_ref()
            .and_then(|s| s.host())
            .unwrap_or_default();
        vec![
            Cell::new(self.metadata.name.clone().unwrap_or_default()),
            kind,
            reference,
            format_empty_string(host),
            format_condition_status(self.ready_condition()),
            format_timestamp_since(self.metadata.creation_timestamp.as_ref(), now),
        ]
    }
}

impl Tailable for Handler {
    const LOG_LABEL: &'static str = LABEL_HANDLER;
    const CONTAINERS: &'static [&'static str] = &[CONTAINER_NAME_HANDLER];
}

impl Invokable for Handler {
    fn invoke_domain(&self) -> Option<String> {
        let status = self.status.as_ref()?;
        if !status.domain.is_empty() {
            return Some(status.domain.clone());
        }
        status.host().map(str::to_string)
    }
}

/// Handlers map HTTP requests to an application, function or image
#[derive(Subcommand, Debug)]
pub enum HandlerCommand {
    /// create a handler to map HTTP requests to a workload
    Create(HandlerCreateOptions),
    /// table listing of handlers
    List(ListOptions),
    /// delete handler(s)
    Delete(DeleteOptions),
    /// show handler readiness
    Status(ResourceOptions),
    /// watch handler logs
    Tail(TailOptions),
    /// invoke a handler
    Invoke(InvokeOptions),
}

impl HandlerCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        match self {
            Self::Create(opts) => run(config, opts).await,
            Self::List(opts) => run(config, ListVerb::<Handler>::new(opts)).await,
            Self::Delete(opts) => run(config, DeleteVerb::<Handler>::new(opts)).await,
            Self::Status(opts) => run(config, StatusVerb::<Handler>::new(opts)).await,
            Self::Tail(opts) => run(config, TailVerb::<Handler>::new(opts)).await,
            Self::Invoke(opts) => run(config, InvokeVerb::<Handler>::new(opts)).await,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct HandlerCreateOptions {
    #[command(flatten)]
    pub resource: ResourceOptions,

    #[command(flatten)]
    pub workload: WorkloadOptions,

    #[command(flatten)]
    pub watch: WatchOptions,
}

impl Validatable for HandlerCreateOptions {
    fn validate(&self) -> FieldError {
        self.resource
            .validate()
            .also(self.workload.validate())
            .also(self.watch.validate())
    }
}

#[async_trait::async_trait]
impl Executable for HandlerCreateOptions {
    fn resolve(&mut self, config: &Config) {
        self.resource.resolve(config);
    }

    async fn exec(&self, config: &Config) -> Result<()> {
        let namespace = self.resource.namespace();
        let name = &self.resource.name;

        let mut handler = Handler::new(
            name,
            HandlerSpec {
                build: self.workload.build(),
                template: Some(self.workload.template()),
            },
        );
        handler.metadata.namespace = Some(namespace.to_string());

        if self.watch.dry_run {
            dry_run_resource(config, &handler)?;
        } else {
            config.api::<Handler>(namespace).create(&handler).await?;
        }
        config.successf(&format!("Created handler {:?}\n", name))?;

        if self.watch.tail {
            config.infof(&format!("Waiting for handler {:?} to become ready...\n", name))?;
            let since = parsers::duration(TAIL_SINCE_CREATE).unwrap_or_default();
            wait_and_tail::<Handler>(config, namespace, name, &self.watch.wait_timeout, since)
                .await?;
            config.successf(&format!("Handler {:?} is ready\n", name))?;
        }
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        self.watch.dry_run
    }
}
