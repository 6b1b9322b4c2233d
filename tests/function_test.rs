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

mod common;

use common::{become_ready, ready_status, NAMESPACE};
use k8s_openapi::api::core::v1::ConfigMap;
use riff::domain::apis::{Function, FunctionSpec, FunctionStatus, GitSource, Source};
use riff::testing::{
    args, given, json, CommandTable, CommandTableRecord, DeleteAction, Reactor,
};
use std::collections::BTreeMap;

const FUNCTION_NAME: &str = "square";
const GIT_REPO: &str = "https://example.com/square.git";

fn function(name: &str, image: &str) -> Function {
    let mut function = Function::new(
        name,
        FunctionSpec {
            image: image.to_string(),
            ..Default::default()
        },
    );
    function.metadata.namespace = Some(NAMESPACE.to_string());
    function
}

fn git_function(image: &str) -> Function {
    let mut function = function(FUNCTION_NAME, image);
    function.spec.source = Some(Source {
        git: Some(GitSource {
            url: GIT_REPO.to_string(),
            revision: "master".to_string(),
        }),
        sub_path: None,
    });
    function
}

fn config_map(namespace: &str, name: &str, data: &[(&str, &str)]) -> ConfigMap {
    let mut config_map = ConfigMap::default();
    config_map.metadata.name = Some(name.to_string());
    config_map.metadata.namespace = Some(namespace.to_string());
    config_map.data = Some(
        data.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    );
    config_map
}

fn build_config() -> ConfigMap {
    config_map(
        NAMESPACE,
        "riff-build",
        &[("default-image-prefix", "registry.example.com/team")],
    )
}

fn builders() -> ConfigMap {
    config_map(
        "riff-system",
        "builders",
        &[("riff-function", "projectriff/builder:latest")],
    )
}

#[tokio::test]
async fn test_function_create() {
    CommandTable::new(
        "function",
        "create",
        vec![
            CommandTableRecord {
                name: "missing source",
                args: args(&[FUNCTION_NAME, "--image", "example.com/square"]),
                expect_error: Some("expected exactly one, got neither: --git-repo, --local-path"),
                ..Default::default()
            },
            CommandTableRecord {
                name: "git source with explicit image",
                args: args(&[
                    FUNCTION_NAME,
                    "--image",
                    "example.com/square",
                    "--git-repo",
                    GIT_REPO,
                ]),
                expect_creates: vec![json(&git_function("example.com/square"))],
                expect_output: Some(
                    r#"
Created function "square"
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "git source keeps default image placeholder",
                args: args(&[
                    FUNCTION_NAME,
                    "--git-repo",
                    GIT_REPO,
                    "--artifact",
                    "square.js",
                    "--handler",
                    "square",
                    "--invoker",
                    "node",
                ]),
                expect_creates: vec![json(&{
                    let mut function = git_function("_");
                    function.spec.artifact = "square.js".to_string();
                    function.spec.handler = "square".to_string();
                    function.spec.invoker = "node".to_string();
                    function
                })],
                expect_output: Some(
                    r#"
Created function "square"
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "local build resolves default image",
                args: args(&[
                    FUNCTION_NAME,
                    "--local-path",
                    "./square",
                    "--artifact",
                    "square.js",
                ]),
                given_objects: vec![given(&build_config()), given(&builders())],
                expect_creates: vec![json(&{
                    let mut function = function(FUNCTION_NAME, "_");
                    function.spec.artifact = "square.js".to_string();
                    function
                })],
                expect_output: Some(
                    r#"
Created function "square"
"#,
                ),
                verify: Some(Box::new(|fixture, _, _| {
                    let builds = fixture.pack.builds();
                    assert_eq!(builds.len(), 1);
                    assert_eq!(builds[0].image, "registry.example.com/team/square");
                    assert_eq!(builds[0].app_dir, "./square");
                    assert_eq!(builds[0].builder, "projectriff/builder:latest");
                    assert_eq!(builds[0].env["RIFF"], "true");
                    assert_eq!(builds[0].env["RIFF_ARTIFACT"], "square.js");
                    assert_eq!(builds[0].env["RIFF_HANDLER"], "");
                    assert_eq!(builds[0].env["RIFF_OVERRIDE"], "");
                })),
                ..Default::default()
            },
            CommandTableRecord {
                name: "local build with image suffix",
                args: args(&[FUNCTION_NAME, "--local-path", ".", "--image", "_/fns/square"]),
                given_objects: vec![given(&build_config()), given(&builders())],
                expect_creates: vec![json(&function(FUNCTION_NAME, "_/fns/square"))],
                verify: Some(Box::new(|fixture, _, _| {
                    assert_eq!(
                        fixture.pack.builds()[0].image,
                        "registry.example.com/team/fns/square"
                    );
                })),
                ..Default::default()
            },
            CommandTableRecord {
                name: "local build without registered builder",
                args: args(&[FUNCTION_NAME, "--local-path", ".", "--image", "example.com/square"]),
                given_objects: vec![given(&config_map("riff-system", "builders", &[]))],
                expect_error: Some("unknown builder for \"riff-function\""),
                ..Default::default()
            },
            CommandTableRecord {
                name: "local build with cache size",
                args: args(&[FUNCTION_NAME, "--local-path", ".", "--cache-size", "1Gi"]),
                expect_error: Some("must not set the field(s): --cache-size"),
                ..Default::default()
            },
            CommandTableRecord {
                name: "tail until ready",
                args: args(&[
                    FUNCTION_NAME,
                    "--image",
                    "example.com/square",
                    "--git-repo",
                    GIT_REPO,
                    "--tail",
                ]),
                with_reactors: vec![become_ready("functions")],
                expect_creates: vec![json(&git_function("example.com/square"))],
                expect_output: Some(
                    r#"
Created function "square"
Waiting for function "square" to become ready...
Function "square" is ready
"#,
                ),
                verify: Some(Box::new(|fixture, _, _| {
                    for request in fixture.logs.requests() {
                        assert_eq!(request.label_selector, "build.projectriff.io/function=square");
                    }
                })),
                ..Default::default()
            },
            CommandTableRecord {
                name: "invalid wait timeout",
                args: args(&[
                    FUNCTION_NAME,
                    "--git-repo",
                    GIT_REPO,
                    "--tail",
                    "--wait-timeout",
                    "soon",
                ]),
                expect_error: Some("invalid value: soon: --wait-timeout"),
                ..Default::default()
            },
            CommandTableRecord {
                name: "tail timeout",
                args: args(&[
                    FUNCTION_NAME,
                    "--image",
                    "example.com/square",
                    "--git-repo",
                    GIT_REPO,
                    "--tail",
                    "--wait-timeout",
                    "5ms",
                ]),
                expect_creates: vec![json(&git_function("example.com/square"))],
                should_error: true,
                verify: Some(Box::new(|_, output, err| {
                    assert!(err.is_some_and(|e| e.is_silent()));
                    assert!(output.contains(
                        "Timeout after \"5ms\" waiting for \"square\" to become ready\n"
                    ));
                    assert!(output.contains(
                        "To view status run: riff function list --namespace default\n"
                    ));
                    assert!(output.contains(
                        "To continue watching logs run: riff function tail square --namespace default\n"
                    ));
                })),
                ..Default::default()
            },
        ],
    )
    .run()
    .await;
}

#[tokio::test]
async fn test_function_list() {
    let mut ready = function("ready-fn", "example.com/ready");
    ready.spec.artifact = "fn.js".to_string();
    ready.spec.invoker = "node".to_string();
    ready.status = Some(FunctionStatus {
        status: ready_status(),
        latest_image: "example.com/ready@sha256:123".to_string(),
    });

    CommandTable::new(
        "function",
        "list",
        vec![
            CommandTableRecord {
                name: "empty",
                args: args(&[]),
                expect_output: Some(
                    r#"
No functions found.
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "table",
                args: args(&[]),
                given_objects: vec![given(&ready), given(&function("plain-fn", "_"))],
                expect_table: Some(
                    r#"
NAME       LATEST IMAGE                   ARTIFACT   HANDLER   INVOKER   STATUS      AGE
plain-fn   <empty>                        <empty>    <empty>   <empty>   <unknown>   <unknown>
ready-fn   example.com/ready@sha256:123   fn.js      <empty>   node      Ready       <unknown>
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "list error",
                args: args(&[]),
                with_reactors: vec![Reactor::induce_failure("list", "functions")],
                expect_error: Some(
                    "inducing failure for list functions",
                ),
                ..Default::default()
            },
        ],
    )
    .run()
    .await;
}

#[tokio::test]
async fn test_function_delete() {
    CommandTable::new(
        "function",
        "delete",
        vec![
            CommandTableRecord {
                name: "delete one",
                args: args(&[FUNCTION_NAME]),
                given_objects: vec![given(&function(FUNCTION_NAME, "_"))],
                expect_deletes: vec![DeleteAction::new(
                    "functions.build.projectriff.io",
                    NAMESPACE,
                    FUNCTION_NAME,
                )],
                expect_output: Some(
                    r#"
Deleted function "square"
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "delete missing",
                args: args(&[FUNCTION_NAME]),
                expect_deletes: vec![DeleteAction::new(
                    "functions.build.projectriff.io",
                    NAMESPACE,
                    FUNCTION_NAME,
                )],
                expect_error: Some(
                    "Unable to delete function square: functions.build.projectriff.io \"square\" not found",
                ),
                ..Default::default()
            },
        ],
    )
    .run()
    .await;
}

#[tokio::test]
async fn test_function_tail() {
    CommandTable::new(
        "function",
        "tail",
        vec![
            CommandTableRecord {
                name: "tail logs",
                args: args(&[FUNCTION_NAME]),
                given_objects: vec![given(&function(FUNCTION_NAME, "_"))],
                prepare: Some(Box::new(|fixture| fixture.logs.finish_after_emit())),
                verify: Some(Box::new(|fixture, output, _| {
                    assert_eq!(output, "");
                    let requests = fixture.logs.requests();
                    assert_eq!(requests.len(), 1);
                    assert_eq!(requests[0].since.as_secs(), 60);
                })),
                ..Default::default()
            },
            CommandTableRecord {
                name: "since out of range",
                args: args(&[FUNCTION_NAME, "--since", "99999999999999999999h"]),
                given_objects: vec![given(&function(FUNCTION_NAME, "_"))],
                expect_error: Some("invalid value: 99999999999999999999h: --since"),
                verify: Some(Box::new(|fixture, _, _| {
                    assert!(fixture.logs.requests().is_empty());
                })),
                ..Default::default()
            },
        ],
    )
    .run()
    .await;
}
