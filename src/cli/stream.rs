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
};
use crate::cli::verbs::{DeleteVerb, ListVerb, Listable, Noun, StatusVerb};
use crate::domain::apis::{Conditioned, Stream, StreamSpec};
use crate::domain::validation::{validators, FieldError};
use crate::shared::error::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use comfy_table::Cell;

impl Noun for Stream {
    const SINGULAR: &'static str = "stream";
    const PLURAL: &'static str = "streams";
    const NOUN: &'static str = "stream";
}

impl Listable for Stream {
    fn list_headers() -> &'static [&'static str] {
        &["Name", "Topic", "Gateway", "Provider", "Content-Type", "Status", "Age"]
    }

    fn list_row(&self, now: DateTime<Utc>) -> Vec<Cell> {
        let address = self.status.as_ref().map(|s| &s.address);
        vec![
            Cell::new(self.metadata.name.clone().unwrap_or_default()),
            format_empty_string(address.map(|a| a.topic.as_str()).unwrap_or_default()),
            format_empty_string(address.map(|a| a.gateway.as_str()).unwrap_or_default()),
            format_empty_string(&self.spec.provider),
            format_empty_string(&self.spec.content_type),
            format_condition_status(self.ready_condition()),
            format_timestamp_since(self.metadata.creation_timestamp.as_ref(), now),
        ]
    }
}

/// Streams of messages provisioned by a stream provider
#[derive(Subcommand, Debug)]
pub enum StreamCommand {
    /// create a stream of messages
    Create(StreamCreateOptions),
    /// table listing of streams
    List(ListOptions),
    /// delete stream(s)
    Delete(DeleteOptions),
    /// show stream readiness
    Status(ResourceOptions),
}

impl StreamCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        match self {
            Self::Create(opts) => run(config, opts).await,
            Self::List(opts) => run(config, ListVerb::<Stream>::new(opts)).await,
            Self::Delete(opts) => run(config, DeleteVerb::<Stream>::new(opts)).await,
            Self::Status(opts) => run(config, StatusVerb::<Stream>::new(opts)).await,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct StreamCreateOptions {
    #[command(flatten)]
    pub resource: ResourceOptions,

    /// name of stream provider
    #[arg(long, value_name = "name")]
    pub provider: Option<String>,

    /// MIME type for message payloads accepted by the stream
    #[arg(long, value_name = "MIME type")]
    pub content_type: Option<String>,

    /// print kubernetes resources to stdout rather than apply them to the
    /// cluster, messages normally on stdout will be sent to stderr
    #[arg(long)]
    pub dry_run: bool,
}

impl Validatable for StreamCreateOptions {
    fn validate(&self) -> FieldError {
        let mut errs = self.resource.validate();
        if self.provider.as_deref().unwrap_or_default().is_empty() {
            errs = errs.also(FieldError::missing_field([flags::PROVIDER]));
        }
        if let Some(content_type) = self.content_type.as_deref().filter(|c| !c.is_empty()) {
            errs = errs.also(validators::mime_type(content_type, flags::CONTENT_TYPE));
        }
        errs
    }
}

#[async_trait::async_trait]
impl Executable for StreamCreateOptions {
    fn resolve(&mut self, config: &Config) {
        self.resource.resolve(config);
    }

    async fn exec(&self, config: &Config) -> Result<()> {
        let namespace = self.resource.namespace();
        let name = &self.resource.name;

        let mut stream = Stream::new(
            name,
            StreamSpec {
                provider: self.provider.clone().unwrap_or_default(),
                content_type: self.content_type.clone().unwrap_or_default(),
            },
        );
        stream.metadata.namespace = Some(namespace.to_string());

        if self.dry_run {
            dry_run_resource(config, &stream)?;
        } else {
            config.api::<Stream>(namespace).create(&stream).await?;
        }
        config.successf(&format!("Created stream {:?}\n", name))
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}
