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

//! Checks that the current user can reach the namespaces and resources riff
//! works with. It does not monitor the health of the cluster or the riff
//! install.

use crate::cli::config::Config;
use crate::cli::display::{ColorTheme, TableRenderer};
use crate::cli::flags;
use crate::cli::options::{Executable, Validatable};
use crate::domain::apis::{
    Application, Function, Handler, Processor, RequestProcessor, Route, Stream,
};
use crate::domain::validation::FieldError;
use crate::infrastructure::constants::{BUILDERS_CONFIG_MAP, SYSTEM_NAMESPACE};
use crate::infrastructure::kubernetes::RiffResource;
use crate::shared::error::{Result, RiffError};
use clap::Args;
use comfy_table::Cell;
use k8s_openapi::api::authorization::v1::{
    ResourceAttributes, SelfSubjectAccessReview, SelfSubjectAccessReviewSpec,
};
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::core::ApiResource;
use tracing::debug;

const READ_VERBS: &[&str] = &["get", "list", "watch"];
const ALL_VERBS: &[&str] = &["get", "list", "create", "update", "delete", "patch", "watch"];

/// Outcome of the access reviews for one group of verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStatus {
    Undefined,
    Allowed,
    Denied,
    /// Some verbs are allowed, others denied.
    Mixed,
    /// The resource's CRD is not installed.
    Missing,
    /// A review was neither allowed nor denied.
    Unknown,
}

impl AccessStatus {
    pub fn combine(self, next: AccessStatus) -> AccessStatus {
        use AccessStatus::*;
        match (self, next) {
            (Undefined, next) => next,
            (Unknown, _) | (_, Unknown) => Unknown,
            (current, next) if current != next => Mixed,
            (Allowed, _) => Allowed,
            _ => Denied,
        }
    }

    fn cell(self, theme: &ColorTheme) -> Cell {
        let (text, color) = match self {
            AccessStatus::Allowed => ("allowed", theme.success),
            AccessStatus::Mixed => ("mixed", theme.warning),
            AccessStatus::Denied => ("denied", theme.warning),
            AccessStatus::Missing => ("missing", theme.error),
            AccessStatus::Unknown => ("unknown", theme.error),
            AccessStatus::Undefined => ("n/a", theme.muted),
        };
        Cell::new(text).fg(color)
    }
}

/// Verbs to review against one resource.
#[derive(Debug, Clone)]
pub struct AccessCheck {
    pub group: String,
    pub resource: String,
    pub subresource: String,
    pub namespace: String,
    pub name: String,
    pub verbs: &'static [&'static str],
    pub read: AccessStatus,
    pub write: AccessStatus,
}

impl AccessCheck {
    fn new(group: &str, resource: &str, namespace: &str, verbs: &'static [&'static str]) -> Self {
        Self {
            group: group.to_string(),
            resource: resource.to_string(),
            subresource: String::new(),
            namespace: namespace.to_string(),
            name: String::new(),
            verbs,
            read: AccessStatus::Undefined,
            write: AccessStatus::Undefined,
        }
    }

    fn custom<K: RiffResource>(namespace: &str) -> Self {
        let resource = ApiResource::erase::<K>(&());
        Self::new(&resource.group, &resource.plural, namespace, ALL_VERBS)
    }

    fn subresource(mut self, subresource: &str) -> Self {
        self.subresource = subresource.to_string();
        self
    }

    fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// `resource.group/subresource`, the group omitted for core resources.
    pub fn display_resource(&self) -> String {
        let mut resource = self.resource.clone();
        if !self.group.is_empty() {
            resource = format!("{}.{}", resource, self.group);
        }
        if !self.subresource.is_empty() {
            resource = format!("{}/{}", resource, self.subresource);
        }
        resource
    }

    fn is_custom(&self) -> bool {
        self.group.contains('.')
    }

    pub fn review(&self, verb: &str) -> SelfSubjectAccessReview {
        let set = |value: &str| Some(value.to_string()).filter(|v| !v.is_empty());
        SelfSubjectAccessReview {
            spec: SelfSubjectAccessReviewSpec {
                resource_attributes: Some(ResourceAttributes {
                    group: Some(self.group.clone()),
                    resource: set(&self.resource),
                    subresource: set(&self.subresource),
                    namespace: set(&self.namespace),
                    name: set(&self.name),
                    verb: Some(verb.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn resolve(&mut self, config: &Config) -> Result<()> {
        if self.is_custom() {
            let crd = format!("{}.{}", self.resource, self.group);
            let found = config
                .api::<CustomResourceDefinition>("")
                .get_opt(&crd)
                .await?;
            if found.is_none() {
                debug!(%crd, "custom resource definition not installed");
                self.read = AccessStatus::Missing;
                self.write = AccessStatus::Missing;
                return Ok(());
            }
        }

        let reviews = config.api::<SelfSubjectAccessReview>("");
        for verb in self.verbs {
            let review = reviews.create(&self.review(verb)).await?;
            let status = review.status.unwrap_or_default();
            if let Some(err) = status.evaluation_error.filter(|e| !e.is_empty()) {
                return Err(RiffError::command(err));
            }
            let outcome = if status.allowed {
                AccessStatus::Allowed
            } else if status.denied.unwrap_or_default() {
                AccessStatus::Denied
            } else {
                AccessStatus::Unknown
            };
            if READ_VERBS.contains(verb) {
                self.read = self.read.combine(outcome);
            } else {
                self.write = self.write.combine(outcome);
            }
        }
        Ok(())
    }
}

/// Resources riff reads and writes in `namespace`.
pub fn access_checks(namespace: &str) -> Vec<AccessCheck> {
    vec![
        AccessCheck::new("", "configmaps", SYSTEM_NAMESPACE, READ_VERBS).named(BUILDERS_CONFIG_MAP),
        AccessCheck::new("", "configmaps", namespace, ALL_VERBS),
        AccessCheck::new("", "secrets", namespace, ALL_VERBS),
        AccessCheck::new("", "pods", namespace, READ_VERBS),
        AccessCheck::new("", "pods", namespace, READ_VERBS).subresource("log"),
        AccessCheck::custom::<Application>(namespace),
        AccessCheck::custom::<Function>(namespace),
        AccessCheck::custom::<Handler>(namespace),
        AccessCheck::custom::<Route>(namespace),
        AccessCheck::custom::<RequestProcessor>(namespace),
        AccessCheck::custom::<Stream>(namespace),
        AccessCheck::custom::<Processor>(namespace),
    ]
}

/// check riff's permissions
#[derive(Args, Debug, Clone, Default)]
pub struct DoctorOptions {
    /// kubernetes namespace (defaulted from kube config)
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,
}

impl DoctorOptions {
    fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or_default()
    }

    async fn check_namespaces(&self, config: &Config, theme: &ColorTheme) -> Result<()> {
        let mut rows = Vec::new();
        for namespace in [self.namespace(), SYSTEM_NAMESPACE] {
            let status = match config.api::<Namespace>("").get_opt(namespace).await? {
                Some(_) => Cell::new("ok").fg(theme.success),
                None => Cell::new("missing").fg(theme.error),
            };
            rows.push(vec![Cell::new(namespace), status]);
        }
        config.printf(&TableRenderer::new().render(&["Namespace", "Status"], rows))
    }

    async fn check_access(&self, config: &Config, theme: &ColorTheme) -> Result<()> {
        let mut checks = access_checks(self.namespace());
        for check in checks.iter_mut() {
            check.resolve(config).await?;
        }

        let rows = checks
            .iter()
            .map(|check| {
                let name = if check.name.is_empty() { "*" } else { &check.name };
                vec![
                    Cell::new(check.display_resource()),
                    Cell::new(&check.namespace),
                    Cell::new(name),
                    check.read.cell(theme),
                    check.write.cell(theme),
                ]
            })
            .collect();
        config.printf("\n")?;
        config.printf(&TableRenderer::new().render(
            &["Resource", "Namespace", "Name", "Read", "Write"],
            rows,
        ))
    }
}

impl Validatable for DoctorOptions {
    fn validate(&self) -> FieldError {
        if self.namespace().is_empty() {
            FieldError::missing_field([flags::NAMESPACE])
        } else {
            FieldError::empty()
        }
    }
}

#[async_trait::async_trait]
impl Executable for DoctorOptions {
    fn resolve(&mut self, config: &Config) {
        if self.namespace.is_none() {
            self.namespace = Some(config.default_namespace());
        }
    }

    async fn exec(&self, config: &Config) -> Result<()> {
        let theme = ColorTheme::default();
        self.check_namespaces(config, &theme).await?;
        self.check_access(config, &theme).await
    }
}
