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

use crate::cli::commands::CliArgs;
use crate::cli::config::Config;
use crate::cli::flags;
use crate::cli::options::{Executable, Validatable};
use crate::domain::validation::FieldError;
use crate::shared::error::Result;
use crate::shared::io::write_shared_bytes;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

/// Shells a completion script can be generated for.
const SHELLS: [&str; 2] = ["bash", "zsh"];

/// generate shell completion script
///
/// The script is printed to stdout and needs to be placed in the appropriate
/// directory on your system.
#[derive(Args, Debug, Clone)]
pub struct CompletionOptions {
    /// shell to generate completion for: bash or zsh
    #[arg(long, value_name = "shell", default_value = "bash")]
    pub shell: String,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            shell: "bash".to_string(),
        }
    }
}

impl Validatable for CompletionOptions {
    fn validate(&self) -> FieldError {
        if self.shell.is_empty() {
            FieldError::missing_field([flags::SHELL])
        } else if !SHELLS.contains(&self.shell.as_str()) {
            FieldError::invalid_value(&self.shell, flags::SHELL)
        } else {
            FieldError::empty()
        }
    }
}

impl CompletionOptions {
    fn script(&self, name: &str) -> Vec<u8> {
        let shell = match self.shell.as_str() {
            "zsh" => Shell::Zsh,
            _ => Shell::Bash,
        };
        let mut script = Vec::new();
        generate(shell, &mut CliArgs::command(), name, &mut script);
        script
    }
}

#[async_trait::async_trait]
impl Executable for CompletionOptions {
    async fn exec(&self, config: &Config) -> Result<()> {
        write_shared_bytes(&config.stdout, &self.script(&config.name))?;
        Ok(())
    }
}
