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

use assert_json_diff::assert_json_include;
use common::{NAMESPACE, OTHER_NAMESPACE};
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use riff::testing::{
    args, given, json, CommandTable, CommandTableRecord, DeleteAction, DeleteCollectionAction,
};
use serde_json::json as json_value;
use std::collections::BTreeMap;
use std::io::Write;

const CREDENTIAL_NAME: &str = "my-credential";
const LABEL: &str = "build.projectriff.io/credential";

fn map(entries: &[(&str, &str)]) -> Option<BTreeMap<String, String>> {
    Some(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

fn secret(
    name: &str,
    kind: &str,
    registries: &[&str],
    username: &str,
    password: &str,
) -> Secret {
    let annotations: BTreeMap<String, String> = registries
        .iter()
        .enumerate()
        .map(|(i, r)| (format!("build.knative.dev/docker-{}", i), r.to_string()))
        .collect();

    let mut secret = Secret::default();
    secret.metadata.name = Some(name.to_string());
    secret.metadata.namespace = Some(NAMESPACE.to_string());
    secret.metadata.labels = map(&[(LABEL, kind)]);
    secret.metadata.annotations = Some(annotations);
    secret.type_ = Some("kubernetes.io/basic-auth".to_string());
    secret.string_data = map(&[("username", username), ("password", password)]);
    secret
}

fn docker_hub_secret() -> Secret {
    secret(
        CREDENTIAL_NAME,
        "docker-hub",
        &["https://index.docker.io/v1/"],
        "projectriff",
        "1password",
    )
}

fn build_config(prefix: &str) -> ConfigMap {
    let mut config_map = ConfigMap::default();
    config_map.metadata.name = Some("riff-build".to_string());
    config_map.metadata.namespace = Some(NAMESPACE.to_string());
    config_map.data = map(&[("default-image-prefix", prefix)]);
    config_map
}

fn gcr_token() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, r#"{{"project_id":"my-gcp-project"}}"#).expect("write token");
    file
}

#[tokio::test]
async fn test_credential_apply() {
    let token = gcr_token();
    let token_path = token.path().to_string_lossy().into_owned();

    CommandTable::new(
        "credential",
        "apply",
        vec![
            CommandTableRecord {
                name: "no registry",
                args: args(&[CREDENTIAL_NAME]),
                expect_error: Some(
                    "expected exactly one, got neither: --docker-hub, --gcr, --registry",
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "docker hub without password",
                args: args(&[CREDENTIAL_NAME, "--docker-hub", "projectriff"]),
                expect_error: Some("missing field(s): <docker-hub-password>"),
                ..Default::default()
            },
            CommandTableRecord {
                name: "docker hub",
                args: args(&[CREDENTIAL_NAME, "--docker-hub", "projectriff"]),
                stdin: Some("1password\n".to_string()),
                expect_creates: vec![json(&docker_hub_secret())],
                expect_output: Some(
                    r#"
Apply credentials "my-credential"
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "docker hub sets default image prefix",
                args: args(&[
                    CREDENTIAL_NAME,
                    "--docker-hub",
                    "projectriff",
                    "--set-default-image-prefix",
                ]),
                stdin: Some("1password".to_string()),
                expect_creates: vec![
                    json(&docker_hub_secret()),
                    json(&build_config("docker.io/projectriff")),
                ],
                expect_output: Some(
                    r#"
Apply credentials "my-credential"
Set default image prefix to "docker.io/projectriff"
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "updates existing prefix, keeping other settings",
                args: args(&[
                    CREDENTIAL_NAME,
                    "--docker-hub",
                    "projectriff",
                    "--default-image-prefix",
                    "registry.example.com/riff",
                ]),
                stdin: Some("1password".to_string()),
                given_objects: vec![given(&{
                    let mut config_map = build_config("docker.io/old");
                    config_map.data = map(&[
                        ("default-image-prefix", "docker.io/old"),
                        ("other", "kept"),
                    ]);
                    config_map
                })],
                expect_creates: vec![json(&docker_hub_secret())],
                expect_updates: vec![json(&{
                    let mut config_map = build_config("registry.example.com/riff");
                    config_map.data = map(&[
                        ("default-image-prefix", "registry.example.com/riff"),
                        ("other", "kept"),
                    ]);
                    config_map
                })],
                expect_output: Some(
                    r#"
Apply credentials "my-credential"
Set default image prefix to "registry.example.com/riff"
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "gcr",
                args: args(&[CREDENTIAL_NAME, "--gcr", token_path.as_str(), "--set-default-image-prefix"]),
                expect_creates: vec![
                    json(&secret(
                        CREDENTIAL_NAME,
                        "gcr",
                        &[
                            "https://gcr.io",
                            "https://us.gcr.io",
                            "https://eu.gcr.io",
                            "https://asia.gcr.io",
                        ],
                        "_json_key",
                        r#"{"project_id":"my-gcp-project"}"#,
                    )),
                    json(&build_config("gcr.io/my-gcp-project")),
                ],
                expect_output: Some(
                    r#"
Apply credentials "my-credential"
Set default image prefix to "gcr.io/my-gcp-project"
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "gcr token missing",
                args: args(&[CREDENTIAL_NAME, "--gcr", "/does/not/exist.json"]),
                should_error: true,
                verify: Some(Box::new(|_, _, err| {
                    let message = err.map(ToString::to_string).unwrap_or_default();
                    assert!(message.starts_with("unable to read gcr token \"/does/not/exist.json\""));
                })),
                ..Default::default()
            },
            CommandTableRecord {
                name: "registry",
                args: args(&[
                    CREDENTIAL_NAME,
                    "--registry",
                    "https://registry.example.com",
                    "--registry-user",
                    "builder",
                ]),
                stdin: Some("s3cret\n".to_string()),
                expect_creates: vec![json(&secret(
                    CREDENTIAL_NAME,
                    "basic-auth",
                    &["https://registry.example.com"],
                    "builder",
                    "s3cret",
                ))],
                expect_output: Some(
                    r#"
Apply credentials "my-credential"
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "anonymous registry",
                args: args(&[CREDENTIAL_NAME, "--registry", "https://registry.example.com"]),
                stdin: Some("ignored\n".to_string()),
                expect_creates: vec![json(&{
                    let mut anonymous = secret(
                        CREDENTIAL_NAME,
                        "basic-auth",
                        &["https://registry.example.com"],
                        "",
                        "",
                    );
                    anonymous.string_data = None;
                    anonymous
                })],
                expect_output: Some(
                    r#"
Apply credentials "my-credential"
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "registry cannot imply a prefix",
                args: args(&[
                    CREDENTIAL_NAME,
                    "--registry",
                    "https://registry.example.com",
                    "--registry-user",
                    "builder",
                    "--set-default-image-prefix",
                ]),
                stdin: Some("s3cret".to_string()),
                expect_error: Some(
                    "invalid value: cannot be used with --registry, without --default-image-prefix: --set-default-image-prefix",
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "updates owned credential",
                args: args(&[CREDENTIAL_NAME, "--docker-hub", "projectriff"]),
                stdin: Some("2password".to_string()),
                given_objects: vec![given(&{
                    let mut existing = docker_hub_secret();
                    existing.metadata.resource_version = Some("7".to_string());
                    existing
                })],
                verify: Some(Box::new(|fixture, output, _| {
                    assert!(fixture.client.creates().is_empty());
                    let updates = fixture.client.updates();
                    assert_eq!(updates.len(), 1);
                    assert_json_include!(
                        actual: json(&updates[0]),
                        expected: json_value!({
                            "metadata": {"name": "my-credential", "resourceVersion": "7"},
                            "stringData": {"username": "projectriff", "password": "2password"},
                        })
                    );
                    assert_eq!(output, "Apply credentials \"my-credential\"\n");
                })),
                ..Default::default()
            },
            CommandTableRecord {
                name: "update keeps unrelated labels and drops stale data",
                args: args(&[CREDENTIAL_NAME, "--docker-hub", "projectriff"]),
                stdin: Some("2password".to_string()),
                given_objects: vec![given(&{
                    let mut existing = secret(
                        CREDENTIAL_NAME,
                        "basic-auth",
                        &["https://registry.example.com"],
                        "builder",
                        "s3cret",
                    );
                    existing.string_data = None;
                    existing.metadata.labels =
                        map(&[(LABEL, "basic-auth"), ("team", "blue")]);
                    existing.data = Some(BTreeMap::from([(
                        "password".to_string(),
                        k8s_openapi::ByteString(b"stale".to_vec()),
                    )]));
                    existing
                })],
                verify: Some(Box::new(|fixture, _, _| {
                    let updates = fixture.client.updates();
                    assert_eq!(updates.len(), 1);
                    let updated = json(&updates[0]);
                    assert_eq!(
                        updated["metadata"]["labels"],
                        json_value!({LABEL: "docker-hub", "team": "blue"})
                    );
                    assert_eq!(
                        updated["metadata"]["annotations"],
                        json_value!({"build.knative.dev/docker-0": "https://index.docker.io/v1/"})
                    );
                    assert!(updated.get("data").is_none());
                    assert_eq!(
                        updated["stringData"],
                        json_value!({"username": "projectriff", "password": "2password"})
                    );
                })),
                ..Default::default()
            },
            CommandTableRecord {
                name: "refuses to overwrite foreign secret",
                args: args(&[CREDENTIAL_NAME, "--docker-hub", "projectriff"]),
                stdin: Some("1password".to_string()),
                given_objects: vec![given(&{
                    let mut foreign = Secret::default();
                    foreign.metadata.name = Some(CREDENTIAL_NAME.to_string());
                    foreign.metadata.namespace = Some(NAMESPACE.to_string());
                    foreign
                })],
                expect_error: Some(
                    "credential \"my-credential\" exists, but is not owned by riff",
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "dry run",
                args: args(&[
                    CREDENTIAL_NAME,
                    "--docker-hub",
                    "projectriff",
                    "--set-default-image-prefix",
                    "--dry-run",
                ]),
                stdin: Some("1password".to_string()),
                verify: Some(Box::new(|fixture, output, _| {
                    assert!(fixture.client.creates().is_empty());
                    assert!(fixture.client.updates().is_empty());
                    assert!(output.contains("kind: Secret\n"));
                    assert!(output.contains("kind: ConfigMap\n"));
                    assert!(output.contains("default-image-prefix: docker.io/projectriff\n"));
                    assert!(output.ends_with(
                        "Set default image prefix to \"docker.io/projectriff\"\n"
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
async fn test_credential_list() {
    let mut unowned = Secret::default();
    unowned.metadata.name = Some("default-token".to_string());
    unowned.metadata.namespace = Some(NAMESPACE.to_string());

    CommandTable::new(
        "credential",
        "list",
        vec![
            CommandTableRecord {
                name: "only owned secrets",
                args: args(&[]),
                given_objects: vec![given(&unowned)],
                expect_output: Some(
                    r#"
No credentials found.
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "table",
                args: args(&["--all-namespaces"]),
                given_objects: vec![given(&docker_hub_secret()), given(&unowned), given(&{
                    let mut other = secret(
                        "registry",
                        "basic-auth",
                        &["https://registry.example.com"],
                        "builder",
                        "s3cret",
                    );
                    other.metadata.namespace = Some(OTHER_NAMESPACE.to_string());
                    other
                })],
                expect_table: Some(
                    r#"
NAMESPACE         NAME            TYPE         REGISTRY                       AGE
default           my-credential   docker-hub   https://index.docker.io/v1/    <unknown>
other-namespace   registry        basic-auth   https://registry.example.com   <unknown>
"#,
                ),
                ..Default::default()
            },
        ],
    )
    .run()
    .await;
}

#[tokio::test]
async fn test_credential_delete() {
    CommandTable::new(
        "credential",
        "delete",
        vec![
            CommandTableRecord {
                name: "delete",
                args: args(&[CREDENTIAL_NAME]),
                given_objects: vec![given(&docker_hub_secret())],
                expect_deletes: vec![DeleteAction::new("secrets", NAMESPACE, CREDENTIAL_NAME)],
                expect_output: Some(
                    r#"
Deleted credential "my-credential"
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "delete all owned",
                args: args(&["--all"]),
                expect_delete_collections: vec![DeleteCollectionAction::new(
                    "secrets",
                    NAMESPACE,
                    LABEL,
                )],
                expect_output: Some(
                    r#"
Deleted credentials in namespace "default"
"#,
                ),
                ..Default::default()
            },
        ],
    )
    .run()
    .await;
}
