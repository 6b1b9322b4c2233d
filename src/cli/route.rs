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
};
use crate::cli::verbs::{DeleteVerb, ListVerb, Listable, Noun, StatusVerb};
use crate::cli::workload::{InvokeOptions, InvokeVerb, Invokable, WorkloadOptions};
use crate::domain::apis::request::workload_reference;
use crate::domain::apis::{Conditioned, Route, RouteSpec};
use crate::domain::validation::FieldError;
use crate::shared::error::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use comfy_table::Cell;

impl Noun for Route {
    const SINGULAR: &'static str = "route";
    const PLURAL: &'static str = "routes";
    const NOUN: &'static str = "route";
}

impl Listable for Route {
    fn list_headers() -> &'static [&'static str] {
        &["Name", "Type", "Ref", "Domain", "Ready", "Age"]
    }

    fn list_row(&self, now: DateTime<Utc>) -> Vec<Cell> {
        let [kind, reference] =
            format_reference(workload_reference(self.spec.build.as_ref(), self.spec.template.as_ref()));
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

impl Invokable for Route {
    fn invoke_domain(&self) -> Option<String> {
        self.status
            .as_ref()
            .map(|s| s.domain.clone())
            .filter(|domain| !domain.is_empty())
    }
}

/// Routes expose a workload on a domain through the ingress gateway
#[derive(Subcommand, Debug)]
pub enum RouteCommand {
    /// create a route to a workload
    Create(RouteCreateOptions),
    /// table listing of routes
    List(ListOptions),
    /// delete route(s)
    Delete(DeleteOptions),
    /// show route readiness
    Status(ResourceOptions),
    /// invoke a route
    Invoke(InvokeOptions),
}

impl RouteCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        match self {
            Self::Create(opts) => run(config, opts).await,
            Self::List(opts) => run(config, ListVerb::<Route>::new(opts)).await,
            Self::Delete(opts) => run(config, DeleteVerb::<Route>::new(opts)).await,
            Self::Status(opts) => run(config, StatusVerb::<Route>::new(opts)).await,
            Self::Invoke(opts) => run(config, InvokeVerb::<Route>::new(opts)).await,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct RouteCreateOptions {
    #[command(flatten)]
    pub resource: ResourceOptions,

    #[command(flatten)]
    pub workload: WorkloadOptions,

    /// print kubernetes resources to stdout rather than apply them to the
    /// cluster, messages normally on stdout will be sent to stderr
    #[arg(long)]
    pub dry_run: bool,
}

impl Validatable for RouteCreateOptions {
    fn validate(&self) -> FieldError {
        self.resource.validate().also(self.workload.validate())
    }
}

#[async_trait::async_trait]
impl Executable for RouteCreateOptions {
    fn resolve(&mut self, config: &Config) {
        self.resource.resolve(config);
    }

    async fn exec(&self, config: &Config) -> Result<()> {
        let namespace = self.resource.namespace();
        let name = &self.resource.name;

        let mut route = Route::new(
            name,
            RouteSpec {
                build: self.workload.build(),
                template: Some(self.workload.template()),
            },
        );
        route.metadata.namespace = Some(namespace.to_string());

        if self.dry_run {
            dry_run_resource(config, &route)?;
        } else {
            config.api::<Route>(namespace).create(&route).await?;
        }
        config.successf(&format!("Created route {:?}\n", name))
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}
