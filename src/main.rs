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

use clap::Parser;
use riff::cli::{CliArgs, Config};
use riff::RiffError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    if let Err(err) = run(args).await {
        let silent = err
            .downcast_ref::<RiffError>()
            .is_some_and(RiffError::is_silent);
        if !silent {
            eprintln!("Error executing command:\n{}", indent(&format!("{:#}", err)));
        }
        std::process::exit(1);
    }
}

async fn run(args: CliArgs) -> anyhow::Result<()> {
    let config = Config::init(&args.global_options()).await?;
    args.command.execute(&config).await?;
    Ok(())
}

fn indent(message: &str) -> String {
    message
        .lines()
        .map(|line| format!("  {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
