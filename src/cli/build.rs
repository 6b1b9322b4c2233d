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

//! Source options and local builds shared by applications and functions.

use crate::cli::config::Config;
use crate::cli::flags;
use crate::domain::apis::build::resolve_default_image;
use crate::domain::apis::{GitSource, Source};
use crate::domain::validation::{validators, FieldError};
use crate::infrastructure::constants::{
    BUILDERS_CONFIG_MAP, BUILD_CONFIG_MAP, DEFAULT_GIT_REVISION, DEFAULT_IMAGE_PREFIX_KEY,
    SYSTEM_NAMESPACE,
};
use crate::infrastructure::pack::BuildOptions;
use crate::shared::error::{Result, RiffError};
use clap::Args;
use k8s_openapi::api::core::v1::ConfigMap;
use std::collections::BTreeMap;
use tracing::debug;

/// Where the source to build comes from.
#[derive(Args, Debug, Clone)]
pub struct SourceOptions {
    /// size of the build cache (e.g. 1Gi)
    #[arg(long, value_name = "size")]
    pub cache_size: Option<String>,

    /// git url to remote source code
    #[arg(long, value_name = "url")]
    pub git_repo: Option<String>,

    /// git ref to checkout
    #[arg(long, value_name = "ref", default_value = DEFAULT_GIT_REVISION)]
    pub git_revision: String,

    /// path to a directory within the git repo to checkout
    #[arg(long, value_name = "directory")]
    pub sub_path: Option<String>,

    /// path to local source code
    #[arg(long, value_name = "directory")]
    pub local_path: Option<String>,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            cache_size: None,
            git_repo: None,
            git_revision: DEFAULT_GIT_REVISION.to_string(),
            sub_path: None,
            local_path: None,
        }
    }
}

fn set(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl SourceOptions {
    pub fn validate(&self) -> FieldError {
        let mut errs = FieldError::empty();

        if let Some(cache_size) = set(&self.cache_size) {
            errs = errs.also(validators::quantity(cache_size, flags::CACHE_SIZE));
        }

        match (set(&self.git_repo), set(&self.local_path)) {
            (None, None) => {
                errs = errs.also(FieldError::missing_one_of([flags::GIT_REPO, flags::LOCAL_PATH]))
            }
            (Some(_), Some(_)) => {
                errs = errs.also(FieldError::multiple_one_of([flags::GIT_REPO, flags::LOCAL_PATH]))
            }
            _ => {}
        }

        if set(&self.git_repo).is_some() && self.git_revision.is_empty() {
            errs = errs.also(FieldError::missing_field([flags::GIT_REVISION]));
        }

        if set(&self.local_path).is_some() {
            if set(&self.sub_path).is_some() {
                errs = errs.also(FieldError::disallowed_fields([flags::SUB_PATH]));
            }
            if set(&self.cache_size).is_some() {
                errs = errs.also(FieldError::disallowed_fields([flags::CACHE_SIZE]));
            }
        }

        errs
    }

    /// Git source for in-cluster builds.
    pub fn source(&self) -> Option<Source> {
        set(&self.git_repo).map(|url| Source {
            git: Some(GitSource {
                url: url.to_string(),
                revision: self.git_revision.clone(),
            }),
            sub_path: set(&self.sub_path).map(str::to_string),
        })
    }

    pub fn local_path(&self) -> Option<&str> {
        set(&self.local_path)
    }
}

/// Expands `_` image placeholders against the namespace's `riff-build`
/// config map.
pub async fn resolve_target_image(
    config: &Config,
    namespace: &str,
    image: &str,
    name: &str,
) -> Result<String> {
    if !image.starts_with('_') {
        return Ok(image.to_string());
    }
    let build_config = config
        .api::<ConfigMap>(namespace)
        .get_opt(BUILD_CONFIG_MAP)
        .await?
        .ok_or_else(|| {
            RiffError::command(format!(
                "default image prefix requires initialized credentials, run `{} help credential`",
                config.name
            ))
        })?;
    let prefix = build_config
        .data
        .as_ref()
        .and_then(|data| data.get(DEFAULT_IMAGE_PREFIX_KEY))
        .cloned()
        .unwrap_or_default();
    resolve_default_image(image, name, &prefix)
}

/// Looks up a builder image registered in `riff-system/builders`.
pub async fn registered_builder(config: &Config, key: &str) -> Result<String> {
    let builders = config
        .api::<ConfigMap>(SYSTEM_NAMESPACE)
        .get(BUILDERS_CONFIG_MAP)
        .await?;
    builders
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .filter(|builder| !builder.is_empty())
        .cloned()
        .ok_or_else(|| RiffError::command(format!("unknown builder for {:?}", key)))
}

pub async fn build_locally(
    config: &Config,
    image: String,
    app_dir: &str,
    builder: String,
    env: BTreeMap<String, String>,
) -> Result<()> {
    debug!(%image, %app_dir, %builder, "building from local source");
    config
        .pack
        .build(BuildOptions {
            image,
            app_dir: app_dir.to_string(),
            builder,
            env,
            publish: true,
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_options_validation() {
        let git = SourceOptions {
            git_repo: Some("https://example.com/repo.git".to_string()),
            ..Default::default()
        };
        assert!(git.validate().is_empty());
        assert_eq!(
            git.source().and_then(|s| s.git).map(|g| g.revision),
            Some("master".to_string())
        );

        assert_eq!(
            SourceOptions::default().validate(),
            FieldError::missing_one_of(["--git-repo", "--local-path"])
        );

        let local = SourceOptions {
            local_path: Some(".".to_string()),
            sub_path: Some("sub".to_string()),
            cache_size: Some("8Gi".to_string()),
            ..Default::default()
        };
        assert_eq!(
            local.validate(),
            FieldError::disallowed_fields(["--sub-path", "--cache-size"])
        );
        assert!(local.source().is_none());

        let bad_cache = SourceOptions {
            git_repo: Some("https://example.com/repo.git".to_string()),
            cache_size: Some("X".to_string()),
            git_revision: String::new(),
            ..Default::default()
        };
        assert_eq!(
            bad_cache.validate(),
            FieldError::invalid_value("X", "--cache-size")
                .also(FieldError::missing_field(["--git-revision"]))
        );
    }
}
