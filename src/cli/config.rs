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

use crate::cli::display::ColorTheme;
use crate::infrastructure::constants::{CLI_NAME, DEFAULT_NAMESPACE, ENV_PREFIX};
use crate::infrastructure::exec::{ProcessRunner, TokioProcessRunner};
use crate::infrastructure::kubernetes::{RiffKubeClient, RiffKubeClientImpl, RiffResource, TypedApi};
use crate::infrastructure::logs::{KubeLogTailer, LogTailer};
use crate::infrastructure::pack::{PackCli, PackClient};
use crate::shared::error::{Result, RiffError};
use crate::shared::io::{shared_reader, shared_writer, write_shared, SharedReader, SharedWriter};
use comfy_table::Color as TableColor;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const CONFIG_FILE_NAMES: [&str; 3] = [".riff.yaml", ".riff.yml", ".riff.toml"];

/// Persistent settings read from the riff config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub kubeconfig: Option<String>,
    pub no_color: bool,
}

impl Settings {
    /// Parses a config file, choosing TOML or YAML by extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RiffError::config_error(format!("unable to read {}: {}", path.display(), e))
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&contents)?),
            _ => Ok(serde_yaml::from_str(&contents)?),
        }
    }

    /// Finds the config file to load: the explicit path, or the first
    /// `.riff.*` file in the home directory.
    pub fn locate(explicit: Option<&Path>, home: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(RiffError::config_error(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
            return Ok(Some(path.to_path_buf()));
        }
        Ok(home.and_then(|home| {
            CONFIG_FILE_NAMES
                .iter()
                .map(|name| home.join(name))
                .find(|candidate| candidate.is_file())
        }))
    }

    /// Overlays `RIFF_*` environment variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kubeconfig) = lookup(&format!("{}KUBECONFIG", ENV_PREFIX)) {
            if !kubeconfig.is_empty() {
                self.kubeconfig = Some(kubeconfig);
            }
        }
        if let Some(no_color) = lookup(&format!("{}NO_COLOR", ENV_PREFIX)) {
            self.no_color = matches!(no_color.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }
}

/// Global flags accepted by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config_file: Option<PathBuf>,
    pub kubeconfig: Option<String>,
    pub no_color: bool,
}

/// Everything a command needs to talk to the outside world.
#[derive(Clone)]
pub struct Config {
    pub name: String,
    pub client: Arc<dyn RiffKubeClient>,
    pub pack: Arc<dyn PackClient>,
    pub logs: Arc<dyn LogTailer>,
    pub exec: Arc<dyn ProcessRunner>,
    pub stdin: SharedReader,
    pub stdout: SharedWriter,
    pub stderr: SharedWriter,
    dry_run_out: Option<SharedWriter>,
    theme: ColorTheme,
}

impl Config {
    pub fn new(
        client: Arc<dyn RiffKubeClient>,
        pack: Arc<dyn PackClient>,
        logs: Arc<dyn LogTailer>,
        exec: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            name: CLI_NAME.to_string(),
            client,
            pack,
            logs,
            exec,
            stdin: shared_reader(std::io::stdin()),
            stdout: shared_writer(std::io::stdout()),
            stderr: shared_writer(std::io::stderr()),
            dry_run_out: None,
            theme: ColorTheme::default(),
        }
    }

    /// Builds a config backed by the real cluster and local tools.
    pub async fn init(global: &GlobalOptions) -> Result<Self> {
        let home = home::home_dir();
        let mut settings = Settings::default();
        let located = Settings::locate(global.config_file.as_deref(), home.as_deref())?;
        if let Some(path) = &located {
            settings = Settings::from_file(path)?;
        }
        settings.apply_env(|key| std::env::var(key).ok());

        if global.no_color || settings.no_color {
            colored::control::set_override(false);
        }

        let kubeconfig = global.kubeconfig.clone().or(settings.kubeconfig.clone());
        let client = RiffKubeClientImpl::new_with_config(kubeconfig, None).await?;
        let logs = KubeLogTailer::new(client.get_client());

        let config = Self::new(
            Arc::new(client),
            Arc::new(PackCli::default()),
            Arc::new(logs),
            Arc::new(TokioProcessRunner),
        );
        if let Some(path) = located {
            config.einfof(&format!("Using config file: {}\n", path.display()))?;
        }
        Ok(config)
    }

    pub fn with_io(
        mut self,
        stdin: SharedReader,
        stdout: SharedWriter,
        stderr: SharedWriter,
    ) -> Self {
        self.stdin = stdin;
        self.stdout = stdout;
        self.stderr = stderr;
        self
    }

    /// Copy of this config whose messages go to stderr, leaving stdout for
    /// the dry-run resources.
    pub fn for_dry_run(&self) -> Self {
        let mut config = self.clone();
        config.dry_run_out = Some(self.stdout.clone());
        config.stdout = self.stderr.clone();
        config
    }

    /// Where dry-run resources are written.
    pub fn resource_out(&self) -> &SharedWriter {
        self.dry_run_out.as_ref().unwrap_or(&self.stdout)
    }

    pub fn api<K: RiffResource>(&self, namespace: &str) -> TypedApi<K> {
        TypedApi::new(self.client.clone(), namespace)
    }

    pub fn default_namespace(&self) -> String {
        let namespace = self.client.default_namespace();
        if namespace.is_empty() {
            DEFAULT_NAMESPACE.to_string()
        } else {
            namespace
        }
    }

    pub fn read_stdin(&self) -> Result<String> {
        let mut buf = String::new();
        self.stdin
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .read_to_string(&mut buf)?;
        Ok(buf)
    }

    fn write_colored(&self, writer: &SharedWriter, text: &str, color: Option<TableColor>) -> Result<()> {
        let rendered = match color {
            Some(color) => self.theme.paint(text, color).to_string(),
            None => text.to_string(),
        };
        Ok(write_shared(writer, &rendered)?)
    }

    pub fn printf(&self, text: &str) -> Result<()> {
        self.write_colored(&self.stdout, text, None)
    }

    pub fn successf(&self, text: &str) -> Result<()> {
        self.write_colored(&self.stdout, text, Some(self.theme.success))
    }

    pub fn infof(&self, text: &str) -> Result<()> {
        self.write_colored(&self.stdout, text, Some(self.theme.info))
    }

    pub fn errorf(&self, text: &str) -> Result<()> {
        self.write_colored(&self.stdout, text, Some(self.theme.error))
    }

    pub fn eprintf(&self, text: &str) -> Result<()> {
        self.write_colored(&self.stderr, text, None)
    }

    pub fn esuccessf(&self, text: &str) -> Result<()> {
        self.write_colored(&self.stderr, text, Some(self.theme.success))
    }

    pub fn einfof(&self, text: &str) -> Result<()> {
        self.write_colored(&self.stderr, text, Some(self.theme.info))
    }

    pub fn eerrorf(&self, text: &str) -> Result<()> {
        self.write_colored(&self.stderr, text, Some(self.theme.error))
    }
}
