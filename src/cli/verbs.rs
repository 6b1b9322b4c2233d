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

//! Verbs shared by every resource noun: list, delete, status and tail.

use crate::cli::config::Config;
use crate::cli::display::format::format_condition_status;
use crate::cli::display::TableRenderer;
use crate::cli::flags;
use crate::cli::options::{DeleteOptions, Executable, ListOptions, ResourceOptions, Validatable};
use crate::domain::apis::Conditioned;
use crate::domain::parsers;
use crate::domain::validation::{validators, FieldError};
use crate::infrastructure::constants::DEFAULT_TAIL_SINCE;
use crate::infrastructure::kubernetes::client::qualified_resource;
use crate::infrastructure::kubernetes::{wait_until_ready, RiffResource};
use crate::infrastructure::logs::TailRequest;
use crate::shared::error::{Result, RiffError};
use crate::shared::tasks::{apply_in_parallel, merge_results};
use chrono::{DateTime, Utc};
use clap::Args;
use comfy_table::Cell;
use kube::core::ApiResource;
use kube::{Resource, ResourceExt};
use std::marker::PhantomData;
use std::time::Duration;

/// How a resource type is named on the command line and in messages.
pub trait Noun: RiffResource {
    /// Singular name used in messages, e.g. `request processor`.
    const SINGULAR: &'static str;
    const PLURAL: &'static str;
    /// Command noun, e.g. `requestprocessor`.
    const NOUN: &'static str;

    /// Selector restricting list and delete-all to resources riff owns.
    fn owned_selector() -> Option<String> {
        None
    }
}

pub trait Listable: Noun {
    fn list_headers() -> &'static [&'static str];

    fn list_row(&self, now: DateTime<Utc>) -> Vec<Cell>;
}

/// Resources whose workloads produce pod logs.
pub trait Tailable: Noun + Conditioned {
    /// Pod label carrying the resource name.
    const LOG_LABEL: &'static str;
    /// Containers to follow; empty follows all of them.
    const CONTAINERS: &'static [&'static str];

    fn tail_request(namespace: &str, name: &str, since: Duration) -> TailRequest {
        TailRequest {
            namespace: namespace.to_string(),
            label_selector: format!("{}={}", Self::LOG_LABEL, name),
            containers: Self::CONTAINERS.iter().map(|c| c.to_string()).collect(),
            since,
        }
    }
}

pub struct ListVerb<K> {
    opts: ListOptions,
    _kind: PhantomData<fn() -> K>,
}

impl<K> ListVerb<K> {
    pub fn new(opts: ListOptions) -> Self {
        Self {
            opts,
            _kind: PhantomData,
        }
    }
}

impl<K> Validatable for ListVerb<K> {
    fn validate(&self) -> FieldError {
        self.opts.validate()
    }
}

#[async_trait::async_trait]
impl<K: Listable> Executable for ListVerb<K> {
    fn resolve(&mut self, config: &Config) {
        self.opts.resolve(config);
    }

    async fn exec(&self, config: &Config) -> Result<()> {
        let api = config.api::<K>(self.opts.namespace());
        let mut items = api.list(K::owned_selector().as_deref()).await?;

        if items.is_empty() {
            config.infof(&format!("No {} found.\n", K::PLURAL))?;
            return Ok(());
        }

        items.sort_by(|a, b| {
            (a.namespace(), a.name_any()).cmp(&(b.namespace(), b.name_any()))
        });

        let mut headers: Vec<&str> = Vec::new();
        if self.opts.all_namespaces {
            headers.push("Namespace");
        }
        headers.extend_from_slice(K::list_headers());

        let now = Utc::now();
        let rows = items
            .iter()
            .map(|item| {
                let mut row = Vec::new();
                if self.opts.all_namespaces {
                    row.push(Cell::new(item.namespace().unwrap_or_default()));
                }
                row.extend(item.list_row(now));
                row
            })
            .collect();

        config.printf(&TableRenderer::new().render(&headers, rows))
    }
}

pub struct DeleteVerb<K> {
    opts: DeleteOptions,
    _kind: PhantomData<fn() -> K>,
}

impl<K> DeleteVerb<K> {
    pub fn new(opts: DeleteOptions) -> Self {
        Self {
            opts,
            _kind: PhantomData,
        }
    }
}

impl<K> Validatable for DeleteVerb<K> {
    fn validate(&self) -> FieldError {
        self.opts.validate()
    }
}

#[async_trait::async_trait]
impl<K: Noun> Executable for DeleteVerb<K> {
    fn resolve(&mut self, config: &Config) {
        self.opts.resolve(config);
    }

    async fn exec(&self, config: &Config) -> Result<()> {
        let namespace = self.opts.namespace();
        let api = config.api::<K>(namespace);

        if self.opts.all {
            api.delete_collection(K::owned_selector().as_deref()).await?;
            config.successf(&format!(
                "Deleted {} in namespace {:?}\n",
                K::PLURAL,
                namespace
            ))?;
            return Ok(());
        }

        let results = apply_in_parallel(self.opts.names.clone(), |name| {
            let api = api.clone();
            async move { api.delete(&name).await }
        })
        .await;

        for result in results.iter().filter(|r| r.error.is_none()) {
            config.successf(&format!("Deleted {} {:?}\n", K::SINGULAR, result.input))?;
        }

        merge_results(&results, |result| {
            format!(
                "Unable to delete {} {}: {}",
                K::SINGULAR,
                result.input,
                result
                    .error
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default()
            )
        })
    }
}

pub struct StatusVerb<K> {
    opts: ResourceOptions,
    _kind: PhantomData<fn() -> K>,
}

impl<K> StatusVerb<K> {
    pub fn new(opts: ResourceOptions) -> Self {
        Self {
            opts,
            _kind: PhantomData,
        }
    }
}

impl<K> Validatable for StatusVerb<K> {
    fn validate(&self) -> FieldError {
        self.opts.validate()
    }
}

#[async_trait::async_trait]
impl<K: Noun + Conditioned> Executable for StatusVerb<K> {
    fn resolve(&mut self, config: &Config) {
        self.opts.resolve(config);
    }

    async fn exec(&self, config: &Config) -> Result<()> {
        let namespace = self.opts.namespace();
        let name = &self.opts.name;

        let resource = match config.api::<K>(namespace).get_opt(name).await? {
            Some(resource) => resource,
            None => {
                config.errorf(&format!(
                    "{} {:?} not found\n",
                    K::kind(&()),
                    format!("{}/{}", namespace, name)
                ))?;
                return Err(RiffError::silent(RiffError::not_found(
                    &qualified_resource(&ApiResource::erase::<K>(&())),
                    name,
                )));
            }
        };

        let ready = resource.ready_condition();
        config.printf(&format!(
            "# {}: {}\n---\n",
            name,
            format_condition_status(ready).content()
        ))?;
        // keys are emitted in sorted order through the JSON map
        let yaml = match ready {
            Some(condition) => serde_yaml::to_string(&serde_json::to_value(condition)?)?,
            None => "{}\n".to_string(),
        };
        config.printf(&yaml)
    }
}

/// Options for tail commands.
#[derive(Args, Debug, Clone)]
pub struct TailOptions {
    #[command(flatten)]
    pub resource: ResourceOptions,

    /// time duration to start reading logs from
    #[arg(long, default_value = DEFAULT_TAIL_SINCE)]
    pub since: String,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            resource: ResourceOptions::default(),
            since: DEFAULT_TAIL_SINCE.to_string(),
        }
    }
}

impl Validatable for TailOptions {
    fn validate(&self) -> FieldError {
        self.resource
            .validate()
            .also(validators::duration(&self.since, flags::SINCE))
    }
}

pub struct TailVerb<K> {
    opts: TailOptions,
    _kind: PhantomData<fn() -> K>,
}

impl<K> TailVerb<K> {
    pub fn new(opts: TailOptions) -> Self {
        Self {
            opts,
            _kind: PhantomData,
        }
    }
}

impl<K> Validatable for TailVerb<K> {
    fn validate(&self) -> FieldError {
        self.opts.validate()
    }
}

#[async_trait::async_trait]
impl<K: Tailable> Executable for TailVerb<K> {
    fn resolve(&mut self, config: &Config) {
        self.opts.resource.resolve(config);
    }

    async fn exec(&self, config: &Config) -> Result<()> {
        let namespace = self.opts.resource.namespace();
        let name = &self.opts.resource.name;

        if config.api::<K>(namespace).get_opt(name).await?.is_none() {
            config.errorf(&format!(
                "{} {:?} not found\n",
                K::kind(&()),
                format!("{}/{}", namespace, name)
            ))?;
            return Err(RiffError::silent(RiffError::not_found(
                &qualified_resource(&ApiResource::erase::<K>(&())),
                name,
            )));
        }

        let since = parsers::duration(&self.opts.since).unwrap_or_default();
        config
            .logs
            .tail(config.stdout.clone(), K::tail_request(namespace, name, since))
            .await
    }
}

/// Streams logs of a freshly created resource until it becomes ready.
///
/// Bounded by `wait_timeout`; on timeout the user is told how to keep
/// watching and a silent error is returned.
pub async fn wait_and_tail<K: Tailable>(
    config: &Config,
    namespace: &str,
    name: &str,
    wait_timeout: &str,
    since: Duration,
) -> Result<()> {
    let timeout = parsers::duration(wait_timeout).unwrap_or_default();
    let api = config.api::<K>(namespace);
    let request = K::tail_request(namespace, name, since);

    let raced = tokio::time::timeout(timeout, async {
        tokio::select! {
            ready = wait_until_ready(&api, name) => ready,
            tailed = config.logs.tail(config.stdout.clone(), request) => tailed,
        }
    })
    .await;

    match raced {
        Ok(result) => result,
        Err(_) => {
            config.errorf(&format!(
                "Timeout after {:?} waiting for {:?} to become ready\n",
                wait_timeout, name
            ))?;
            config.infof(&format!(
                "To view status run: {} {} list {} {}\n",
                config.name,
                K::NOUN,
                flags::NAMESPACE,
                namespace
            ))?;
            config.infof(&format!(
                "To continue watching logs run: {} {} tail {} {} {}\n",
                config.name,
                K::NOUN,
                name,
                flags::NAMESPACE,
                namespace
            ))?;
            Err(RiffError::silent(RiffError::Timeout(format!(
                "{} {:?} did not become ready within {}",
                K::SINGULAR,
                name,
                wait_timeout
            ))))
        }
    }
}
