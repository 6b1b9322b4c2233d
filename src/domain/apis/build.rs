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

//! build.projectriff.io/v1alpha1

use super::conditions::{Conditioned, Status};
use crate::shared::error::{Result, RiffError};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GitSource {
    pub url: String,
    pub revision: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "build.projectriff.io",
    version = "v1alpha1",
    kind = "Application",
    plural = "applications",
    status = "ApplicationStatus",
    derive = "PartialEq",
    schema = "disabled",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_size: Option<Quantity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatus {
    #[serde(flatten)]
    pub status: Status,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub latest_image: String,
}

impl Conditioned for Application {
    fn status_conditions(&self) -> Option<&Status> {
        self.status.as_ref().map(|s| &s.status)
    }
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "build.projectriff.io",
    version = "v1alpha1",
    kind = "Function",
    plural = "functions",
    status = "FunctionStatus",
    derive = "PartialEq",
    schema = "disabled",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSpec {
    pub image: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub artifact: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub handler: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub invoker: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_size: Option<Quantity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionStatus {
    #[serde(flatten)]
    pub status: Status,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub latest_image: String,
}

impl Conditioned for Function {
    fn status_conditions(&self) -> Option<&Status> {
        self.status.as_ref().map(|s| &s.status)
    }
}

/// Expands an image placeholder against the namespace's default prefix.
///
/// `_` becomes `<prefix>/<name>` and `_/suffix` becomes `<prefix>/suffix`.
/// Any other image is returned unchanged.
pub fn resolve_default_image(image: &str, name: &str, default_prefix: &str) -> Result<String> {
    if !image.starts_with('_') {
        return Ok(image.to_string());
    }
    if default_prefix.is_empty() {
        return Err(RiffError::command(
            "missing default image prefix, set one with `riff credential apply --set-default-image-prefix`",
        ));
    }
    let prefix = default_prefix.trim_end_matches('/');
    if image == "_" {
        Ok(format!("{}/{}", prefix, name))
    } else if let Some(suffix) = image.strip_prefix("_/") {
        Ok(format!("{}/{}", prefix, suffix))
    } else {
        Err(RiffError::command(format!(
            "unable to resolve image {:?}, expected \"_\" or \"_/<repository>\"",
            image
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::apis::conditions::{Condition, CONDITION_READY, CONDITION_TRUE};
    use kube::Resource;

    #[test]
    fn test_resource_metadata() {
        assert_eq!(Application::api_version(&()), "build.projectriff.io/v1alpha1");
        assert_eq!(Application::plural(&()), "applications");
        assert_eq!(Function::kind(&()), "Function");
    }

    #[test]
    fn test_application_serialization() {
        let mut app = Application::new(
            "my-app",
            ApplicationSpec {
                image: "example.com/image".to_string(),
                source: Some(Source {
                    git: Some(GitSource {
                        url: "https://example.com/repo.git".to_string(),
                        revision: "master".to_string(),
                    }),
                    sub_path: None,
                }),
                ..Default::default()
            },
        );
        app.status = Some(ApplicationStatus {
            status: Status {
                observed_generation: None,
                conditions: vec![Condition::new(CONDITION_READY, CONDITION_TRUE)],
            },
            latest_image: "example.com/image@sha256:abc".to_string(),
        });

        let value = serde_json::to_value(&app).unwrap();
        assert_eq!(value["apiVersion"], "build.projectriff.io/v1alpha1");
        assert_eq!(value["kind"], "Application");
        assert_eq!(value["spec"]["source"]["git"]["revision"], "master");
        assert_eq!(value["status"]["conditions"][0]["type"], "Ready");
        assert_eq!(value["status"]["latestImage"], "example.com/image@sha256:abc");
        assert!(app.is_ready());

        let parsed: Application = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, app);
    }

    #[test]
    fn test_resolve_default_image() {
        assert_eq!(
            resolve_default_image("_", "my-func", "docker.io/me").unwrap(),
            "docker.io/me/my-func"
        );
        assert_eq!(
            resolve_default_image("_/other", "my-func", "docker.io/me/").unwrap(),
            "docker.io/me/other"
        );
        assert_eq!(
            resolve_default_image("example.com/image", "my-func", "").unwrap(),
            "example.com/image"
        );
        assert!(resolve_default_image("_", "my-func", "").is_err());
        assert!(resolve_default_image("_bogus", "my-func", "docker.io/me").is_err());
    }
}
