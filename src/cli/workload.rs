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

//! Options and verbs shared by the request workloads: handlers, routes and
//! request processors.

use crate::cli::config::Config;
use crate::cli::flags;
use crate::cli::options::{Executable, ResourceOptions, Validatable};
use crate::cli::verbs::Noun;
use crate::domain::apis::request::single_container_template;
use crate::domain::apis::{Build, Conditioned};
use crate::domain::parsers;
use crate::domain::validation::{validators, FieldError};
use crate::infrastructure::constants::{
    INGRESS_NAMESPACE, INGRESS_PORT_NAMES, INGRESS_SERVICE, SERVICE_TYPE_LOAD_BALANCER,
};
use crate::infrastructure::exec::ProcessIo;
use crate::shared::error::{Result, RiffError};
use clap::Args;
use k8s_openapi::api::core::v1::{PodSpec, Service};
use std::marker::PhantomData;
use tracing::debug;

/// What a workload runs and the environment it runs with.
#[derive(Args, Debug, Clone, Default)]
pub struct WorkloadOptions {
    /// name of application to deploy
    #[arg(long, value_name = "name")]
    pub application_ref: Option<String>,

    /// name of function to deploy
    #[arg(long, value_name = "name")]
    pub function_ref: Option<String>,

    /// container image to deploy
    #[arg(long, value_name = "image")]
    pub image: Option<String>,

    /// environment variable defined as a key value pair separated by an equals sign,
    /// example "--env MY_VAR=my-value" (may be set multiple times)
    #[arg(long, value_name = "variable")]
    pub env: Vec<String>,

    /// environment variable from a config map or secret, example
    /// "--env-from MY_SECRET_VALUE=secretKeyRef:my-secret-name:key-in-secret",
    /// "--env-from MY_CONFIG_MAP_VALUE=configMapKeyRef:my-config-map-name:key-in-config-map"
    /// (may be set multiple times)
    #[arg(long, value_name = "variable")]
    pub env_from: Vec<String>,
}

fn set(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl WorkloadOptions {
    pub fn validate(&self) -> FieldError {
        let mut errs = FieldError::empty();

        let used: Vec<&str> = [
            (flags::APPLICATION_REF, &self.application_ref),
            (flags::FUNCTION_REF, &self.function_ref),
            (flags::IMAGE, &self.image),
        ]
        .into_iter()
        .filter(|(_, value)| set(value).is_some())
        .map(|(flag, _)| flag)
        .collect();
        match used.len() {
            0 => {
                errs = errs.also(FieldError::missing_one_of([
                    flags::APPLICATION_REF,
                    flags::FUNCTION_REF,
                    flags::IMAGE,
                ]))
            }
            1 => {}
            _ => errs = errs.also(FieldError::multiple_one_of(used)),
        }

        errs.also(validators::env_vars(&self.env, flags::ENV))
            .also(validators::env_var_froms(&self.env_from, flags::ENV_FROM))
    }

    /// Build reference, when deploying an application or function.
    pub fn build(&self) -> Option<Build> {
        if let Some(application) = set(&self.application_ref) {
            return Some(Build::application(application));
        }
        set(&self.function_ref).map(Build::function)
    }

    /// Pod template carrying the image and environment.
    pub fn template(&self) -> PodSpec {
        let mut template = single_container_template();
        if let Some(container) = template.containers.first_mut() {
            container.image = set(&self.image).map(str::to_string);
            let env: Vec<_> = self
                .env
                .iter()
                .map(|line| parsers::env_var(line))
                .chain(self.env_from.iter().map(|line| parsers::env_var_from(line)))
                .collect();
            if !env.is_empty() {
                container.env = Some(env);
            }
        }
        template
    }
}

/// Workloads reachable through the ingress gateway.
pub trait Invokable: Noun + Conditioned {
    /// Host name requests are routed by, once known.
    fn invoke_domain(&self) -> Option<String>;
}

#[derive(Args, Debug, Clone, Default)]
pub struct InvokeOptions {
    #[command(flatten)]
    pub resource: ResourceOptions,

    /// path to append to the workload's domain
    #[arg(value_name = "path")]
    pub path: Option<String>,

    /// set the request's content type to 'application/json'
    #[arg(long)]
    pub json: bool,

    /// set the request's content type to 'text/plain'
    #[arg(long)]
    pub text: bool,

    /// additional arguments passed to curl
    #[arg(last = true, value_name = "curl-args")]
    pub curl_args: Vec<String>,
}

impl Validatable for InvokeOptions {
    fn validate(&self) -> FieldError {
        let mut errs = self.resource.validate();
        if self.json && self.text {
            errs = errs.also(FieldError::multiple_one_of([flags::JSON, flags::TEXT]));
        }
        errs
    }
}

impl InvokeOptions {
    fn curl_args(&self, ingress: &str, domain: &str) -> Vec<String> {
        let path = match self.path.as_deref() {
            None | Some("") => "/".to_string(),
            Some(path) if path.starts_with('/') => path.to_string(),
            Some(path) => format!("/{}", path),
        };
        let mut args = vec![
            format!("{}{}", ingress, path),
            "-H".to_string(),
            format!("Host: {}", domain),
        ];
        if self.json {
            args.push("-H".to_string());
            args.push("Content-Type: application/json".to_string());
        } else if self.text {
            args.push("-H".to_string());
            args.push("Content-Type: text/plain".to_string());
        }
        args.extend(self.curl_args.iter().cloned());
        args
    }
}

pub struct InvokeVerb<K> {
    opts: InvokeOptions,
    _kind: PhantomData<fn() -> K>,
}

impl<K> InvokeVerb<K> {
    pub fn new(opts: InvokeOptions) -> Self {
        Self {
            opts,
            _kind: PhantomData,
        }
    }
}

impl<K> Validatable for InvokeVerb<K> {
    fn validate(&self) -> FieldError {
        self.opts.validate()
    }
}

#[async_trait::async_trait]
impl<K: Invokable> Executable for InvokeVerb<K> {
    fn resolve(&mut self, config: &Config) {
        self.opts.resource.resolve(config);
    }

    async fn exec(&self, config: &Config) -> Result<()> {
        let name = &self.opts.resource.name;
        let workload = config
            .api::<K>(self.opts.resource.namespace())
            .get(name)
            .await?;

        let domain = match workload.invoke_domain() {
            Some(domain) if workload.is_ready() => domain,
            _ => {
                return Err(RiffError::command(format!(
                    "{} {:?} is not ready",
                    K::SINGULAR,
                    name
                )))
            }
        };

        let ingress = ingress_url(config).await?;
        let args = self.opts.curl_args(&ingress, &domain);
        debug!(?args, "invoking curl");
        let io = ProcessIo {
            stdout: config.stdout.clone(),
            stderr: config.stderr.clone(),
        };
        config.exec.run("curl", &args, io).await
    }
}

/// Base URL of the ingress gateway.
///
/// A `LoadBalancer` service is reached through its first ingress address.
/// Otherwise the API server host is used with the gateway's node port.
pub async fn ingress_url(config: &Config) -> Result<String> {
    let service = config
        .api::<Service>(INGRESS_NAMESPACE)
        .get_opt(INGRESS_SERVICE)
        .await?
        .ok_or_else(|| RiffError::command("ingress not available"))?;

    let is_load_balancer = service
        .spec
        .as_ref()
        .and_then(|s| s.type_.as_deref())
        == Some(SERVICE_TYPE_LOAD_BALANCER);
    let load_balancer = service
        .status
        .as_ref()
        .and_then(|s| s.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .and_then(|ingress| ingress.first())
        .filter(|_| is_load_balancer);
    if let Some(ingress) = load_balancer {
        if let Some(address) = ingress
            .ip
            .as_deref()
            .filter(|ip| !ip.is_empty())
            .or_else(|| ingress.hostname.as_deref().filter(|h| !h.is_empty()))
        {
            return Ok(format!("http://{}", address));
        }
    }

    let node_port = service
        .spec
        .as_ref()
        .and_then(|s| s.ports.as_ref())
        .and_then(|ports| {
            ports.iter().find(|port| {
                port.name
                    .as_deref()
                    .is_some_and(|name| INGRESS_PORT_NAMES.contains(&name))
            })
        })
        .and_then(|port| port.node_port);
    let cluster_url = config.client.cluster_url();
    match (cluster_url.host().filter(|h| !h.is_empty()), node_port) {
        (Some(host), Some(port)) => Ok(format!("http://{}:{}", host, port)),
        _ => Err(RiffError::command("ingress not available")),
    }
}
