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
use crate::cli::flags;
use crate::cli::options::{
    dry_run_resource, run, DeleteOptions, Executable, ListOptions, ResourceOptions, Validatable,
};
use crate::cli::verbs::{DeleteVerb, ListVerb, Listable, Noun, StatusVerb};
use crate::cli::workload::{InvokeOptions, InvokeVerb, Invokable, WorkloadOptions};
use crate::domain::apis::request::workload_reference;
use crate::domain::apis::{Conditioned, RequestProcessor, RequestProcessorItem, RequestProcessorSpec};
use crate::domain::validation::{validators, FieldError};
use crate::shared::error::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use comfy_table::Cell;

impl Noun for RequestProcessor {
    const SINGULAR: &'static str = "request processor";
    const PLURAL: &'static str = "request processors";
    const NOUN: &'static str = "requestprocessor";
}

impl Listable for RequestProcessor {
    fn list_headers() -> &'static [&'static str] {
        &["Name", "Type", "Ref", "Domain", "Ready", "Age"]
    }

    fn list_row(&self, now: DateTime<Utc>) -> Vec<Cell> {
        let first = self.spec.items.first();
        let [kind, reference] = format_reference(workload_reference(
            first.and_then(|item| item.build.as_ref()),
            first.and_then(|item| item.template.as_ref()),
        ));
        let domain = self.status.as_ref().map(|s| s.domain.as_str()).unwrap_or_default();
        vec![
            Cell::new(self.metadata.name.clone().unwrap_or_default()),
            kind,
            reference,
            format_empty_string(domain),
            format_condition_status(self.ready_condition()),
            format_timestamp_since(self.metadata.creation_timestamp.as_ref(), now),
        ]
    }
}

impl Invokable for RequestProcessor {
    fn invoke_domain(&self) -> Option<String> {
        self.status
            .as_ref()
            .map(|s| s.domain.clone())
            .filter(|domain| !domain.is_empty())
    }
}

/// Request processors serve HTTP requests from a list of workload items
#[derive(Subcommand, Debug)]
pub enum RequestProcessorCommand {
    /// create a request processor
    Create(RequestProcessorCreateOptions),
    /// table listing of request processors
    List(ListOptions),
    /// delete request processor(s)
    Delete(DeleteOptions),
    /// show request processor readiness
    Status(ResourceOptions),
    /// invoke a request processor
    Invoke(InvokeOptions),
}

impl RequestProcessorCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        match self {
            Self::Create(opts) => run(config, opts).await,
            Self::List(opts) => run(config, ListVerb::<RequestProcessor>::new(opts)).await,
            Self::Delete(opts) => run(config, DeleteVerb::<RequestProcessor>::new(opts)).await,
            Self::Status(opts) => run(config, StatusVerb::<RequestProcessor>::new(opts)).await,
            Self::Invoke(opts) => run(config, InvokeVerb::<RequestProcessor>::new(opts)).await,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct RequestProcessorCreateOptions {
    #[command(flatten)]
    pub resource: ResourceOptions,

    /// name of the item within the request processor
    #[arg(long, value_name = "name")]
    pub item: Option<String>,

    #[command(flatten)]
    pub workload: WorkloadOptions,

    /// print kubernetes resources to stdout rather than apply them to the
    /// cluster, messages normally on stdout will be sent to stderr
    #[arg(long)]
    pub dry_run: bool,
}

impl Validatable for RequestProcessorCreateOptions {
    fn validate(&self) -> FieldError {
        let mut errs = self.resource.validate();
        match self.item.as_deref() {
            None | Some("") => errs = errs.also(FieldError::missing_field([flags::ITEM])),
            Some(item) => errs = errs.also(validators::k8s_name(item, flags::ITEM)),
        }
        errs.also(self.workload.validate())
    }
}

#[async_trait::async_trait]
impl Executable for RequestProcessorCreateOptions {
    fn resolve(&mut self, config: &Config) {
        self.resource.resolve(config);
    }

    async fn exec(&self, config: &Config) -> Result<()> {
        let namespace = self.resource.namespace();
        let name = &self.resource.name;

        let mut processor = RequestProcessor::new(
            name,
            RequestProcessorSpec {
                items: vec![RequestProcessorItem {
                    name: self.item.clone().unwrap_or_default(),
                    build: self.workload.build(),
                    template: Some(self.workload.template()),
                }],
            },
        );
        processor.metadata.namespace = Some(namespace.to_string());

        if self.dry_run {
            dry_run_resource(config, &processor)?;
        } else {
            config
                .api::<RequestProcessor>(namespace)
                .create(&processor)
                .await?;
        }
        config.successf(&format!("Created request processor {:?}\n", name))
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_is_required() {
        let opts = RequestProcessorCreateOptions {
            resource: ResourceOptions {
                namespace: Some("default".to_string()),
                name: "my-processor".to_string(),
            },
            workload: WorkloadOptions {
                image: Some("example.com/image".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(opts.validate(), FieldError::missing_field(["--item"]));

        let invalid = RequestProcessorCreateOptions {
            item: Some("my.item".to_string()),
            ..opts
        };
        assert_eq!(invalid.validate(), FieldError::invalid_value("my.item", "--item"));
    }
}
