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

use crate::shared::error::{Result, RiffError};
use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Request for a local buildpack build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOptions {
    pub image: String,
    pub app_dir: String,
    pub builder: String,
    pub env: BTreeMap<String, String>,
    pub publish: bool,
}

impl BuildOptions {
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "build".to_string(),
            self.image.clone(),
            "--path".to_string(),
            self.app_dir.clone(),
            "--builder".to_string(),
            self.builder.clone(),
        ];
        for (key, value) in &self.env {
            args.push("--env".to_string());
            args.push(format!("{}={}", key, value));
        }
        if self.publish {
            args.push("--publish".to_string());
        }
        args
    }
}

#[async_trait::async_trait]
pub trait PackClient: Send + Sync {
    async fn build(&self, options: BuildOptions) -> Result<()>;
}

/// Runs the `pack` binary found on the `PATH`.
#[derive(Debug, Clone)]
pub struct PackCli {
    binary: String,
}

impl Default for PackCli {
    fn default() -> Self {
        Self {
            binary: "pack".to_string(),
        }
    }
}

#[async_trait::async_trait]
impl PackClient for PackCli {
    async fn build(&self, options: BuildOptions) -> Result<()> {
        let args = options.to_args();
        debug!(binary = %self.binary, ?args, "running buildpack build");

        let status = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| RiffError::Process(format!("unable to run {}: {}", self.binary, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(RiffError::Process(format!(
                "{} build failed: {}",
                self.binary, status
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args() {
        let mut env = BTreeMap::new();
        env.insert("RIFF".to_string(), "true".to_string());
        env.insert("RIFF_HANDLER".to_string(), "functions.Upper".to_string());
        let options = BuildOptions {
            image: "example.com/repo".to_string(),
            app_dir: "/tmp/app".to_string(),
            builder: "projectriff/builder".to_string(),
            env,
            publish: true,
        };
        assert_eq!(
            options.to_args(),
            vec![
                "build",
                "example.com/repo",
                "--path",
                "/tmp/app",
                "--builder",
                "projectriff/builder",
                "--env",
                "RIFF=true",
                "--env",
                "RIFF_HANDLER=functions.Upper",
                "--publish",
            ]
        );
    }
}
