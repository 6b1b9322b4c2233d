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
use crate::cli::flags;
use crate::domain::validation::{validators, FieldError};
use crate::infrastructure::constants::DEFAULT_WAIT_TIMEOUT;
use crate::shared::error::{Result, RiffError};
use crate::shared::io::write_shared;
use clap::Args;
use serde::Serialize;
use tracing::debug;

pub trait Validatable {
    fn validate(&self) -> FieldError;
}

#[async_trait::async_trait]
pub trait Executable: Validatable + Send + Sync {
    /// Fills in values derived from the environment, such as the namespace.
    fn resolve(&mut self, _config: &Config) {}

    async fn exec(&self, config: &Config) -> Result<()>;

    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Resolves, validates and executes a command's options.
pub async fn run<O: Executable>(config: &Config, mut opts: O) -> Result<()> {
    opts.resolve(config);

    let errs = opts.validate();
    if !errs.is_empty() {
        debug!(errors = %errs, "invalid options");
        return Err(RiffError::InvalidOptions(errs));
    }

    if opts.is_dry_run() {
        return opts.exec(&config.for_dry_run()).await;
    }
    opts.exec(config).await
}

/// Writes a resource as a YAML document to the dry-run output.
pub fn dry_run_resource<T: Serialize>(config: &Config, resource: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(resource)?;
    write_shared(config.resource_out(), &format!("---\n{}", yaml))?;
    Ok(())
}

fn validate_namespace(namespace: &Option<String>) -> FieldError {
    match namespace.as_deref() {
        None | Some("") => FieldError::missing_field([flags::NAMESPACE]),
        Some(_) => FieldError::empty(),
    }
}

/// Options for commands that act on one named resource.
#[derive(Args, Debug, Clone, Default)]
pub struct ResourceOptions {
    /// kubernetes namespace (defaulted from kube config)
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// resource name
    #[arg(value_name = "name", default_value = "")]
    pub name: String,
}

impl ResourceOptions {
    pub fn resolve(&mut self, config: &Config) {
        if self.namespace.is_none() {
            self.namespace = Some(config.default_namespace());
        }
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or_default()
    }
}

impl Validatable for ResourceOptions {
    fn validate(&self) -> FieldError {
        let mut errs = validate_namespace(&self.namespace);
        if self.name.is_empty() {
            errs = errs.also(FieldError::missing_field([flags::NAME_ARG]));
        } else {
            errs = errs.also(validators::k8s_name(&self.name, flags::NAME_ARG));
        }
        errs
    }
}

/// Options for list commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ListOptions {
    /// kubernetes namespace (defaulted from kube config)
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// use all kubernetes namespaces
    #[arg(long)]
    pub all_namespaces: bool,
}

impl ListOptions {
    pub fn resolve(&mut self, config: &Config) {
        if !self.all_namespaces && self.namespace.is_none() {
            self.namespace = Some(config.default_namespace());
        }
    }

    /// Namespace to query; empty when listing across all namespaces.
    pub fn namespace(&self) -> &str {
        if self.all_namespaces {
            ""
        } else {
            self.namespace.as_deref().unwrap_or_default()
        }
    }
}

impl Validatable for ListOptions {
    fn validate(&self) -> FieldError {
        let has_namespace = self.namespace.as_deref().is_some_and(|ns| !ns.is_empty());
        match (has_namespace, self.all_namespaces) {
            (true, true) => FieldError::multiple_one_of([flags::NAMESPACE, flags::ALL_NAMESPACES]),
            (false, false) => FieldError::missing_one_of([flags::NAMESPACE, flags::ALL_NAMESPACES]),
            _ => FieldError::empty(),
        }
    }
}

/// Options for delete commands.
#[derive(Args, Debug, Clone, Default)]
pub struct DeleteOptions {
    /// kubernetes namespace (defaulted from kube config)
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// delete all resources within the namespace
    #[arg(long)]
    pub all: bool,

    /// resource name(s)
    #[arg(value_name = "name")]
    pub names: Vec<String>,
}

impl DeleteOptions {
    pub fn resolve(&mut self, config: &Config) {
        if self.namespace.is_none() {
            self.namespace = Some(config.default_namespace());
        }
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or_default()
    }
}

impl Validatable for DeleteOptions {
    fn validate(&self) -> FieldError {
        let mut errs = validate_namespace(&self.namespace);
        match (self.all, self.names.is_empty()) {
            (true, false) => {
                errs = errs.also(FieldError::multiple_one_of([flags::ALL, flags::NAMES_ARG]))
            }
            (false, true) => {
                errs = errs.also(FieldError::missing_one_of([flags::ALL, flags::NAMES_ARG]))
            }
            _ => {}
        }
        errs.also(validators::k8s_names(&self.names, flags::NAMES_ARG))
    }
}

/// Progress and dry-run flags shared by create commands.
#[derive(Args, Debug, Clone)]
pub struct WatchOptions {
    /// watch creation progress
    #[arg(long)]
    pub tail: bool,

    /// duration to wait for the resource to become ready when watching progress
    #[arg(long, value_name = "duration", default_value = DEFAULT_WAIT_TIMEOUT)]
    pub wait_timeout: String,

    /// print kubernetes resources to stdout rather than apply them to the
    /// cluster, messages normally on stdout will be sent to stderr
    #[arg(long)]
    pub dry_run: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            tail: false,
            wait_timeout: DEFAULT_WAIT_TIMEOUT.to_string(),
            dry_run: false,
        }
    }
}

impl Validatable for WatchOptions {
    fn validate(&self) -> FieldError {
        let mut errs = FieldError::empty();
        if self.tail {
            errs = errs.also(validators::duration(&self.wait_timeout, flags::WAIT_TIMEOUT));
        }
        if self.dry_run && self.tail {
            errs = errs.also(FieldError::multiple_one_of([flags::DRY_RUN, flags::TAIL]));
        }
        errs
    }
}
