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

//! request.projectriff.io/v1alpha1

use super::conditions::{Conditioned, Status};
use k8s_openapi::api::core::v1::{Container, PodSpec};
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Reference to the build producing the image to run.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub application_ref: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function_ref: String,
}

impl Build {
    pub fn application(name: impl Into<String>) -> Self {
        Self {
            application_ref: name.into(),
            ..Default::default()
        }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self {
            function_ref: name.into(),
            ..Default::default()
        }
    }
}

/// What a workload runs, as shown in list output: `(type, ref)`.
pub fn workload_reference(build: Option<&Build>, template: Option<&PodSpec>) -> Option<(&'static str, String)> {
    if let Some(build) = build {
        if !build.application_ref.is_empty() {
            return Some(("application", build.application_ref.clone()));
        }
        if !build.function_ref.is_empty() {
            return Some(("function", build.function_ref.clone()));
        }
    }
    template
        .and_then(|t| t.containers.first())
        .and_then(|c| c.image.clone())
        .filter(|image| !image.is_empty())
        .map(|image| ("image", image))
}

/// Pod template with the single, empty container every workload starts from.
pub fn single_container_template() -> PodSpec {
    PodSpec {
        containers: vec![Container::default()],
        ..Default::default()
    }
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "request.projectriff.io",
    version = "v1alpha1",
    kind = "Handler",
    plural = "handlers",
    status = "HandlerStatus",
    derive = "PartialEq",
    schema = "disabled",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct HandlerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<Build>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PodSpec>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HandlerStatus {
    #[serde(flatten)]
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
}

impl HandlerStatus {
    /// Host portion of the status URL.
    pub fn host(&self) -> Option<&str> {
        let url = self.url.as_deref()?;
        let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
        without_scheme.split(['/', '?', '#']).next().filter(|h| !h.is_empty())
    }
}

impl Conditioned for Handler {
    fn status_conditions(&self) -> Option<&Status> {
        self.status.as_ref().map(|s| &s.status)
    }
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "request.projectriff.io",
    version = "v1alpha1",
    kind = "Route",
    plural = "routes",
    status = "RouteStatus",
    derive = "PartialEq",
    schema = "disabled",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<Build>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PodSpec>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteStatus {
    #[serde(flatten)]
    pub status: Status,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
}

impl Conditioned for Route {
    fn status_conditions(&self) -> Option<&Status> {
        self.status.as_ref().map(|s| &s.status)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestProcessorItem {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<Build>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PodSpec>,
}

/// The spec is serialized as a bare list of items.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "request.projectriff.io",
    version = "v1alpha1",
    kind = "RequestProcessor",
    plural = "requestprocessors",
    status = "RequestProcessorStatus",
    derive = "PartialEq",
    schema = "disabled",
    namespaced
)]
#[serde(transparent)]
pub struct RequestProcessorSpec {
    pub items: Vec<RequestProcessorItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestProcessorStatus {
    #[serde(flatten)]
    pub status: Status,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
}

impl Conditioned for RequestProcessor {
    fn status_conditions(&self) -> Option<&Status> {
        self.status.as_ref().map(|s| &s.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_host() {
        let status = HandlerStatus {
            url: Some("http://my-handler.default.example.com/path".to_string()),
            ..Default::default()
        };
        assert_eq!(status.host(), Some("my-handler.default.example.com"));
        assert_eq!(HandlerStatus::default().host(), None);
    }

    #[test]
    fn test_workload_reference() {
        let template = PodSpec {
            containers: vec![Container {
                image: Some("example.com/image".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(
            workload_reference(Some(&Build::application("my-app")), Some(&template)),
            Some(("application", "my-app".to_string()))
        );
        assert_eq!(
            workload_reference(Some(&Build::function("my-func")), None),
            Some(("function", "my-func".to_string()))
        );
        assert_eq!(
            workload_reference(None, Some(&template)),
            Some(("image", "example.com/image".to_string()))
        );
        assert_eq!(workload_reference(None, Some(&single_container_template())), None);
    }

    #[test]
    fn test_request_processor_spec_is_a_list() {
        let processor = RequestProcessor::new(
            "my-processor",
            RequestProcessorSpec {
                items: vec![RequestProcessorItem {
                    name: "item".to_string(),
                    build: Some(Build::function("my-func")),
                    template: None,
                }],
            },
        );
        let value = serde_json::to_value(&processor).unwrap();
        assert_eq!(value["spec"][0]["name"], "item");
        assert_eq!(value["spec"][0]["build"]["functionRef"], "my-func");
    }
}
