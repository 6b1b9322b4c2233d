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

// Flag names as they appear in validation errors

pub const ALL: &str = "--all";
pub const ALL_NAMESPACES: &str = "--all-namespaces";
pub const APPLICATION_REF: &str = "--application-ref";
pub const ARTIFACT: &str = "--artifact";
pub const CACHE_SIZE: &str = "--cache-size";
pub const CONTENT_TYPE: &str = "--content-type";
pub const DEFAULT_IMAGE_PREFIX: &str = "--default-image-prefix";
pub const DOCKER_HUB: &str = "--docker-hub";
pub const DRY_RUN: &str = "--dry-run";
pub const ENV: &str = "--env";
pub const ENV_FROM: &str = "--env-from";
pub const FUNCTION_REF: &str = "--function-ref";
pub const GCR: &str = "--gcr";
pub const GIT_REPO: &str = "--git-repo";
pub const GIT_REVISION: &str = "--git-revision";
pub const HANDLER: &str = "--handler";
pub const IMAGE: &str = "--image";
pub const INPUT: &str = "--input";
pub const INVOKER: &str = "--invoker";
pub const ITEM: &str = "--item";
pub const JSON: &str = "--json";
pub const LOCAL_PATH: &str = "--local-path";
pub const NAMESPACE: &str = "--namespace";
pub const OUTPUT: &str = "--output";
pub const PROVIDER: &str = "--provider";
pub const REGISTRY: &str = "--registry";
pub const REGISTRY_USER: &str = "--registry-user";
pub const SET_DEFAULT_IMAGE_PREFIX: &str = "--set-default-image-prefix";
pub const SHELL: &str = "--shell";
pub const SINCE: &str = "--since";
pub const SUB_PATH: &str = "--sub-path";
pub const TAIL: &str = "--tail";
pub const TEXT: &str = "--text";
pub const WAIT_TIMEOUT: &str = "--wait-timeout";

/// Positional argument names
pub const NAME_ARG: &str = "name";
pub const NAMES_ARG: &str = "name(s)";
