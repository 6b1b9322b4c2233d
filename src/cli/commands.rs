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

// CLI command definitions

use super::application::ApplicationCommand;
use super::completion::CompletionOptions;
use super::config::{Config, GlobalOptions};
use super::credential::CredentialCommand;
use super::doctor::DoctorOptions;
use super::function::FunctionCommand;
use super::handler::HandlerCommand;
use super::processor::ProcessorCommand;
use super::request_processor::RequestProcessorCommand;
use super::route::RouteCommand;
use super::options::run;
use super::stream::StreamCommand;
use crate::shared::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "riff",
    version,
    about = "riff is for functions",
    long_about = "The riff CLI combines with the projectriff system CRDs to build, run and wire \
                  workloads (applications and functions). The CRDs provide the riff API of which \
                  this CLI is a client."
)]
pub struct CliArgs {
    /// config file (default is $HOME/.riff.yaml)
    #[arg(long, global = true, value_name = "file")]
    pub config: Option<PathBuf>,

    /// kubectl config file (default is $HOME/.kube/config)
    #[arg(long, global = true, value_name = "file")]
    pub kubeconfig: Option<String>,

    /// disable color output in terminals
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl CliArgs {
    pub fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            config_file: self.config.clone(),
            kubeconfig: self.kubeconfig.clone(),
            no_color: self.no_color,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Applications built from source using application buildpacks
    Application {
        #[command(subcommand)]
        command: ApplicationCommand,
    },

    /// generate shell completion script
    Completion(CompletionOptions),

    /// Credentials for container registries
    Credential {
        #[command(subcommand)]
        command: CredentialCommand,
    },

    /// check riff's permissions
    #[command(visible_alias = "doc")]
    Doctor(DoctorOptions),

    /// Functions built from source using function buildpacks
    Function {
        #[command(subcommand)]
        command: FunctionCommand,
    },

    /// Handlers map HTTP requests to applications, functions or images
    Handler {
        #[command(subcommand)]
        command: HandlerCommand,
    },

    /// Processors apply functions to messages on streams
    Processor {
        #[command(subcommand)]
        command: ProcessorCommand,
    },

    /// Request processors serve HTTP requests with a list of workloads
    #[command(name = "requestprocessor")]
    RequestProcessor {
        #[command(subcommand)]
        command: RequestProcessorCommand,
    },

    /// Routes expose workloads through the ingress gateway
    Route {
        #[command(subcommand)]
        command: RouteCommand,
    },

    /// Streams of messages
    Stream {
        #[command(subcommand)]
        command: StreamCommand,
    },
}

impl Commands {
    pub async fn execute(self, config: &Config) -> Result<()> {
        match self {
            Commands::Application { command } => command.execute(config).await,
            Commands::Completion(opts) => run(config, opts).await,
            Commands::Credential { command } => command.execute(config).await,
            Commands::Doctor(opts) => run(config, opts).await,
            Commands::Function { command } => command.execute(config).await,
            Commands::Handler { command } => command.execute(config).await,
            Commands::Processor { command } => command.execute(config).await,
            Commands::RequestProcessor { command } => command.execute(config).await,
            Commands::Route { command } => command.execute(config).await,
            Commands::Stream { command } => command.execute(config).await,
        }
    }
}
