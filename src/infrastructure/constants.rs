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

/// CLI identity
pub const CLI_NAME: &str = "riff";
pub const ENV_PREFIX: &str = "RIFF_";

/// Resource labels
pub const LABEL_CREDENTIAL: &str = "build.projectriff.io/credential";
pub const LABEL_APPLICATION: &str = "build.projectriff.io/application";
pub const LABEL_FUNCTION: &str = "build.projectriff.io/function";
pub const LABEL_HANDLER: &str = "request.projectriff.io/handler";
pub const LABEL_PROCESSOR: &str = "streaming.projectriff.io/processor";

/// Credential label values
pub const CREDENTIAL_DOCKER_HUB: &str = "docker-hub";
pub const CREDENTIAL_GCR: &str = "gcr";
pub const CREDENTIAL_BASIC_AUTH: &str = "basic-auth";

/// Registry annotations understood by the build system
pub const ANNOTATION_DOCKER_PREFIX: &str = "build.knative.dev/docker-";
pub const DOCKER_HUB_REGISTRY: &str = "https://index.docker.io/v1/";
pub const GCR_REGISTRIES: [&str; 4] = [
    "https://gcr.io",
    "https://us.gcr.io",
    "https://eu.gcr.io",
    "https://asia.gcr.io",
];

/// Secret settings
pub const SECRET_TYPE_BASIC_AUTH: &str = "kubernetes.io/basic-auth";
pub const GCR_USERNAME: &str = "_json_key";

/// Build configuration
pub const BUILD_CONFIG_MAP: &str = "riff-build";
pub const DEFAULT_IMAGE_PREFIX_KEY: &str = "default-image-prefix";
pub const SYSTEM_NAMESPACE: &str = "riff-system";
pub const BUILDERS_CONFIG_MAP: &str = "builders";
pub const FUNCTION_BUILDER_KEY: &str = "riff-function";
pub const APPLICATION_BUILDER: &str = "cloudfoundry/cnb:bionic";

/// Ingress
pub const INGRESS_NAMESPACE: &str = "istio-system";
pub const INGRESS_SERVICE: &str = "istio-ingressgateway";
pub const INGRESS_PORT_NAMES: [&str; 2] = ["http", "http2"];
pub const SERVICE_TYPE_LOAD_BALANCER: &str = "LoadBalancer";

/// Container names
pub const CONTAINER_NAME_HANDLER: &str = "user-container";
pub const CONTAINER_NAME_FUNCTION: &str = "function";
pub const CONTAINER_NAME_PROCESSOR: &str = "processor";

/// Defaults
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_GIT_REVISION: &str = "master";
pub const DEFAULT_WAIT_TIMEOUT: &str = "10m";
pub const DEFAULT_TAIL_SINCE: &str = "1m";
/// Log window used when tailing right after a create
pub const TAIL_SINCE_CREATE: &str = "1s";

/// Polling intervals
pub const READY_POLL_INTERVAL_MS: u64 = 1000;
pub const POD_DISCOVERY_INTERVAL_MS: u64 = 2000;
