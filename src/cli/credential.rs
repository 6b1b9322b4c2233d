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

//! Registry credentials stored as basic-auth secrets for the build system.

use crate::cli::config::Config;
use crate::cli::display::format::{format_empty_string, format_timestamp_since};
use crate::cli::flags;
use crate::cli::options::{
    dry_run_resource, run, DeleteOptions, Executable, ListOptions, ResourceOptions, Validatable,
};
use crate::cli::verbs::{DeleteVerb, ListVerb, Listable, Noun};
use crate::domain::validation::FieldError;
use crate::infrastructure::constants::{
    ANNOTATION_DOCKER_PREFIX, BUILD_CONFIG_MAP, CREDENTIAL_BASIC_AUTH,
    CREDENTIAL_DOCKER_HUB, CREDENTIAL_GCR, DEFAULT_IMAGE_PREFIX_KEY, DOCKER_HUB_REGISTRY,
    GCR_REGISTRIES, GCR_USERNAME, LABEL_CREDENTIAL, SECRET_TYPE_BASIC_AUTH,
};
use crate::shared::error::{Result, RiffError};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use comfy_table::Cell;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

const DOCKER_HUB_PASSWORD: &str = "<docker-hub-password>";

impl Noun for Secret {
    const SINGULAR: &'static str = "credential";
    const PLURAL: &'static str = "credentials";
    const NOUN: &'static str = "credential";

    fn owned_selector() -> Option<String> {
        Some(LABEL_CREDENTIAL.to_string())
    }
}

impl Listable for Secret {
    fn list_headers() -> &'static [&'static str] {
        &["Name", "Type", "Registry", "Age"]
    }

    fn list_row(&self, now: DateTime<Utc>) -> Vec<Cell> {
        let kind = self.labels().get(LABEL_CREDENTIAL).cloned().unwrap_or_default();
        let registry = self
            .annotations()
            .get(&format!("{}0", ANNOTATION_DOCKER_PREFIX))
            .cloned()
            .unwrap_or_default();
        vec![
            Cell::new(self.name_any()),
            format_empty_string(&kind),
            format_empty_string(&registry),
            format_timestamp_since(self.metadata.creation_timestamp.as_ref(), now),
        ]
    }
}

/// Credentials allow builds to push images to container registries
#[derive(Subcommand, Debug)]
pub enum CredentialCommand {
    /// create or update credentials for a container registry
    Apply(CredentialApplyOptions),
    /// table listing of credentials
    List(ListOptions),
    /// delete credential(s)
    Delete(DeleteOptions),
}

impl CredentialCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        match self {
            Self::Apply(opts) => run(config, opts).await,
            Self::List(opts) => run(config, ListVerb::<Secret>::new(opts)).await,
            Self::Delete(opts) => run(config, DeleteVerb::<Secret>::new(opts)).await,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct CredentialApplyOptions {
    #[command(flatten)]
    pub resource: ResourceOptions,

    /// Docker Hub username, the password is read from stdin
    #[arg(long, value_name = "username")]
    pub docker_hub: Option<String>,

    /// path to a file containing a Google Container Registry JSON service account token
    #[arg(long, value_name = "file")]
    pub gcr: Option<String>,

    /// registry url
    #[arg(long, value_name = "url")]
    pub registry: Option<String>,

    /// username for a registry, the password is read from stdin
    #[arg(long, value_name = "username")]
    pub registry_user: Option<String>,

    /// default image prefix to use for builds in the namespace
    #[arg(long, value_name = "prefix")]
    pub default_image_prefix: Option<String>,

    /// use this registry as the default for built images
    #[arg(long)]
    pub set_default_image_prefix: bool,

    /// print kubernetes resources to stdout rather than apply them to the
    /// cluster, messages normally on stdout will be sent to stderr
    #[arg(long)]
    pub dry_run: bool,

    #[arg(skip)]
    pub password: Option<String>,
}

fn set(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Deserialize)]
struct GcrToken {
    project_id: String,
}

/// Secret contents and the image prefix implied by a registry.
struct RegistryCredential {
    kind: &'static str,
    registries: Vec<String>,
    /// Username and password; anonymous registries carry none.
    auth: Option<(String, String)>,
    image_prefix: Option<String>,
}

impl RegistryCredential {
    fn secret(&self, namespace: &str, name: &str) -> Secret {
        let annotations: BTreeMap<String, String> = self
            .registries
            .iter()
            .enumerate()
            .map(|(i, registry)| (format!("{}{}", ANNOTATION_DOCKER_PREFIX, i), registry.clone()))
            .collect();
        Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                labels: Some(BTreeMap::from([(
                    LABEL_CREDENTIAL.to_string(),
                    self.kind.to_string(),
                )])),
                annotations: Some(annotations),
                ..Default::default()
            },
            type_: Some(SECRET_TYPE_BASIC_AUTH.to_string()),
            string_data: self.auth.as_ref().map(|(username, password)| {
                BTreeMap::from([
                    ("username".to_string(), username.clone()),
                    ("password".to_string(), password.clone()),
                ])
            }),
            ..Default::default()
        }
    }
}

impl Validatable for CredentialApplyOptions {
    fn validate(&self) -> FieldError {
        let mut errs = self.resource.validate();

        let used: Vec<&str> = [
            (flags::DOCKER_HUB, &self.docker_hub),
            (flags::GCR, &self.gcr),
            (flags::REGISTRY, &self.registry),
        ]
        .into_iter()
        .filter(|(_, value)| set(value).is_some())
        .map(|(flag, _)| flag)
        .collect();
        match used.len() {
            0 => {
                errs = errs.also(FieldError::missing_one_of([
                    flags::DOCKER_HUB,
                    flags::GCR,
                    flags::REGISTRY,
                ]))
            }
            1 => {}
            _ => errs = errs.also(FieldError::multiple_one_of(used)),
        }

        if set(&self.docker_hub).is_some() && set(&self.password).is_none() {
            errs = errs.also(FieldError::missing_field([DOCKER_HUB_PASSWORD]));
        }

        if set(&self.registry).is_some() {
            if set(&self.password).is_some() && set(&self.registry_user).is_none() {
                errs = errs.also(FieldError::missing_field([flags::REGISTRY_USER]));
            }
            if self.set_default_image_prefix && set(&self.default_image_prefix).is_none() {
                errs = errs.also(FieldError::invalid_value(
                    format!(
                        "cannot be used with {}, without {}",
                        flags::REGISTRY,
                        flags::DEFAULT_IMAGE_PREFIX
                    ),
                    flags::SET_DEFAULT_IMAGE_PREFIX,
                ));
            }
        }

        errs
    }
}

impl CredentialApplyOptions {
    async fn credential(&self) -> Result<RegistryCredential> {
        if let Some(id) = set(&self.docker_hub) {
            return Ok(RegistryCredential {
                kind: CREDENTIAL_DOCKER_HUB,
                registries: vec![DOCKER_HUB_REGISTRY.to_string()],
                auth: Some((id.to_string(), self.password.clone().unwrap_or_default())),
                image_prefix: Some(format!("docker.io/{}", id)),
            });
        }

        if let Some(path) = set(&self.gcr) {
            let token = tokio::fs::read_to_string(path).await.map_err(|e| {
                RiffError::command(format!("unable to read gcr token {:?}: {}", path, e))
            })?;
            let parsed: GcrToken = serde_json::from_str(&token).map_err(|e| {
                RiffError::command(format!("unable to parse gcr token {:?}: {}", path, e))
            })?;
            return Ok(RegistryCredential {
                kind: CREDENTIAL_GCR,
                registries: GCR_REGISTRIES.iter().map(|r| r.to_string()).collect(),
                auth: Some((GCR_USERNAME.to_string(), token)),
                image_prefix: Some(format!("gcr.io/{}", parsed.project_id)),
            });
        }

        Ok(RegistryCredential {
            kind: CREDENTIAL_BASIC_AUTH,
            registries: vec![self.registry.clone().unwrap_or_default()],
            auth: set(&self.registry_user).map(|user| {
                (user.to_string(), self.password.clone().unwrap_or_default())
            }),
            image_prefix: None,
        })
    }

    async fn apply_secret(&self, config: &Config, desired: Secret) -> Result<()> {
        let namespace = self.resource.namespace();
        let name = &self.resource.name;
        let api = config.api::<Secret>(namespace);

        match api.get_opt(name).await? {
            None => {
                api.create(&desired).await?;
            }
            Some(existing) => {
                if !existing.labels().contains_key(LABEL_CREDENTIAL) {
                    return Err(RiffError::command(format!(
                        "credential {:?} exists, but is not owned by {}",
                        name, config.name
                    )));
                }
                let mut updated = existing;
                let kind = desired
                    .labels()
                    .get(LABEL_CREDENTIAL)
                    .cloned()
                    .unwrap_or_default();
                updated
                    .labels_mut()
                    .insert(LABEL_CREDENTIAL.to_string(), kind);
                updated.metadata.annotations = desired.metadata.annotations;
                updated.type_ = desired.type_;
                updated.string_data = desired.string_data;
                updated.data = desired.data;
                api.update(&updated).await?;
            }
        }
        Ok(())
    }

    async fn apply_image_prefix(&self, config: &Config, prefix: &str) -> Result<()> {
        let namespace = self.resource.namespace();
        let api = config.api::<ConfigMap>(namespace);

        match api.get_opt(BUILD_CONFIG_MAP).await? {
            None => {
                api.create(&build_config_map(namespace, prefix)).await?;
            }
            Some(mut existing) => {
                existing
                    .data
                    .get_or_insert_with(BTreeMap::new)
                    .insert(DEFAULT_IMAGE_PREFIX_KEY.to_string(), prefix.to_string());
                api.update(&existing).await?;
            }
        }
        Ok(())
    }
}

fn build_config_map(namespace: &str, prefix: &str) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(BUILD_CONFIG_MAP.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            DEFAULT_IMAGE_PREFIX_KEY.to_string(),
            prefix.to_string(),
        )])),
        ..Default::default()
    }
}

#[async_trait::async_trait]
impl Executable for CredentialApplyOptions {
    fn resolve(&mut self, config: &Config) {
        self.resource.resolve(config);
        let needs_password = set(&self.docker_hub).is_some()
            || (set(&self.registry).is_some() && set(&self.registry_user).is_some());
        if self.password.is_none() && needs_password {
            self.password = match config.read_stdin() {
                Ok(password) => Some(password.trim_end_matches(['\r', '\n']).to_string()),
                Err(e) => {
                    debug!(error = %e, "unable to read password from stdin");
                    None
                }
            };
        }
    }

    async fn exec(&self, config: &Config) -> Result<()> {
        let namespace = self.resource.namespace();
        let name = &self.resource.name;

        let credential = self.credential().await?;
        let secret = credential.secret(namespace, name);
        if self.dry_run {
            dry_run_resource(config, &secret)?;
        } else {
            self.apply_secret(config, secret).await?;
        }
        config.successf(&format!("Apply credentials {:?}\n", name))?;

        let prefix = match set(&self.default_image_prefix) {
            Some(explicit) => Some(explicit.to_string()),
            None if self.set_default_image_prefix => credential.image_prefix,
            None => None,
        };
        if let Some(prefix) = prefix {
            if self.dry_run {
                dry_run_resource(config, &build_config_map(namespace, &prefix))?;
            } else {
                self.apply_image_prefix(config, &prefix).await?;
            }
            config.successf(&format!("Set default image prefix to {:?}\n", prefix))?;
        }
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_resource() -> ResourceOptions {
        ResourceOptions {
            namespace: Some("default".to_string()),
            name: "my-credential".to_string(),
        }
    }

    #[test]
    fn test_apply_requires_one_registry() {
        let opts = CredentialApplyOptions {
            resource: valid_resource(),
            ..Default::default()
        };
        assert_eq!(
            opts.validate(),
            FieldError::missing_one_of(["--docker-hub", "--gcr", "--registry"])
        );

        let opts = CredentialApplyOptions {
            resource: valid_resource(),
            docker_hub: Some("projectriff".to_string()),
            gcr: Some("token.json".to_string()),
            password: Some("1password".to_string()),
            ..Default::default()
        };
        assert_eq!(
            opts.validate(),
            FieldError::multiple_one_of(["--docker-hub", "--gcr"])
        );
    }

    #[test]
    fn test_apply_password_and_user() {
        let docker_hub = CredentialApplyOptions {
            resource: valid_resource(),
            docker_hub: Some("projectriff".to_string()),
            ..Default::default()
        };
        assert_eq!(
            docker_hub.validate(),
            FieldError::missing_field(["<docker-hub-password>"])
        );

        let anonymous = CredentialApplyOptions {
            resource: valid_resource(),
            registry: Some("https://example.com".to_string()),
            ..Default::default()
        };
        assert!(anonymous.validate().is_empty());

        let password_only = CredentialApplyOptions {
            password: Some("1password".to_string()),
            ..anonymous.clone()
        };
        assert_eq!(
            password_only.validate(),
            FieldError::missing_field(["--registry-user"])
        );

        let registry = CredentialApplyOptions {
            registry_user: Some("projectriff".to_string()),
            set_default_image_prefix: true,
            ..anonymous
        };
        assert_eq!(
            registry.validate(),
            FieldError::invalid_value(
                "cannot be used with --registry, without --default-image-prefix",
                "--set-default-image-prefix"
            )
        );
    }

    #[test]
    fn test_secret_annotations() {
        let credential = RegistryCredential {
            kind: CREDENTIAL_GCR,
            registries: GCR_REGISTRIES.iter().map(|r| r.to_string()).collect(),
            auth: Some((GCR_USERNAME.to_string(), "{}".to_string())),
            image_prefix: None,
        };
        let secret = credential.secret("default", "my-credential");
        let annotations = secret.metadata.annotations.unwrap();
        assert_eq!(annotations.len(), 4);
        assert_eq!(annotations["build.knative.dev/docker-0"], "https://gcr.io");
        assert_eq!(annotations["build.knative.dev/docker-3"], "https://asia.gcr.io");
        assert_eq!(secret.type_.as_deref(), Some("kubernetes.io/basic-auth"));
        assert!(secret.string_data.is_some());
    }

    #[test]
    fn test_anonymous_registry_secret() {
        let credential = RegistryCredential {
            kind: CREDENTIAL_BASIC_AUTH,
            registries: vec!["https://registry.example.com".to_string()],
            auth: None,
            image_prefix: None,
        };
        let secret = credential.secret("default", "my-credential");
        assert_eq!(
            secret.labels().get(LABEL_CREDENTIAL).map(String::as_str),
            Some("basic-auth")
        );
        assert!(secret.string_data.is_none());
    }
}
