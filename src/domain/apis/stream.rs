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

//! stream.projectriff.io/v1alpha1

use super::conditions::{Conditioned, Status};
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "stream.projectriff.io",
    version = "v1alpha1",
    kind = "Stream",
    plural = "streams",
    status = "StreamStatus",
    derive = "PartialEq",
    schema = "disabled",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct StreamSpec {
    pub provider: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_type: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StreamAddress {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub topic: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gateway: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StreamStatus {
    #[serde(flatten)]
    pub status: Status,

    #[serde(default)]
    pub address: StreamAddress,
}

impl Conditioned for Stream {
    fn status_conditions(&self) -> Option<&Status> {
        self.status.as_ref().map(|s| &s.status)
    }
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "stream.projectriff.io",
    version = "v1alpha1",
    kind = "Processor",
    plural = "processors",
    status = "ProcessorStatus",
    derive = "PartialEq",
    schema = "disabled",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorSpec {
    pub function_ref: String,

    #[serde(default)]
    pub inputs: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorStatus {
    #[serde(flatten)]
    pub status: Status,
}

impl Conditioned for Processor {
    fn status_conditions(&self) -> Option<&Status> {
        self.status.as_ref().map(|s| &s.status)
    }
}
