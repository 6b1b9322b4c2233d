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

use common::{ready_status, NAMESPACE};
use riff::domain::apis::{Stream, StreamAddress, StreamSpec, StreamStatus};
use riff::testing::{args, given, json, CommandTable, CommandTableRecord, DeleteAction, Reactor};

const STREAM_NAME: &str = "letters";
const PROVIDER: &str = "kafka";

fn stream(name: &str, content_type: &str) -> Stream {
    let mut stream = Stream::new(
        name,
        StreamSpec {
            provider: PROVIDER.to_string(),
            content_type: content_type.to_string(),
        },
    );
    stream.metadata.namespace = Some(NAMESPACE.to_string());
    stream
}

#[tokio::test]
async fn test_stream_create() {
    CommandTable::new(
        "stream",
        "create",
        vec![
            CommandTableRecord {
                name: "missing provider",
                args: args(&[STREAM_NAME]),
                expect_error: Some("missing field(s): --provider"),
                ..Default::default()
            },
            CommandTableRecord {
                name: "invalid content type",
                args: args(&[STREAM_NAME, "--provider", PROVIDER, "--content-type", "json"]),
                expect_error: Some("invalid value: json: --content-type"),
                ..Default::default()
            },
            CommandTableRecord {
                name: "create",
                args: args(&[STREAM_NAME, "--provider", PROVIDER]),
                expect_creates: vec![json(&stream(STREAM_NAME, ""))],
                expect_output: Some(
                    r#"
Created stream "letters"
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "with content type",
                args: args(&[
                    STREAM_NAME,
                    "--provider",
                    PROVIDER,
                    "--content-type",
                    "application/json",
                ]),
                expect_creates: vec![json(&stream(STREAM_NAME, "application/json"))],
                expect_output: Some(
                    r#"
Created stream "letters"
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "create error",
                args: args(&[STREAM_NAME, "--provider", PROVIDER]),
                with_reactors: vec![Reactor::induce_failure("create", "streams")],
                expect_creates: vec![json(&stream(STREAM_NAME, ""))],
                expect_error: Some("inducing failure for create streams"),
                ..Default::default()
            },
            CommandTableRecord {
                name: "dry run",
                args: args(&[STREAM_NAME, "--provider", PROVIDER, "--dry-run"]),
                verify: Some(Box::new(|fixture, output, _| {
                    assert!(fixture.client.creates().is_empty());
                    assert!(output.contains("kind: Stream\n"));
                    assert!(output.contains("  provider: kafka\n"));
                })),
                ..Default::default()
            },
        ],
    )
    .run()
    .await;
}

#[tokio::test]
async fn test_stream_list() {
    let mut ready = stream(STREAM_NAME, "text/plain");
    ready.status = Some(StreamStatus {
        status: ready_status(),
        address: StreamAddress {
            topic: "default_letters".to_string(),
            gateway: "kafka-gateway:6565".to_string(),
        },
    });

    CommandTable::new(
        "stream",
        "list",
        vec![
            CommandTableRecord {
                name: "empty",
                args: args(&[]),
                expect_output: Some(
                    r#"
No streams found.
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "table",
                args: args(&[]),
                given_objects: vec![given(&ready), given(&stream("numbers", ""))],
                expect_table: Some(
                    r#"
NAME      TOPIC             GATEWAY              PROVIDER   CONTENT-TYPE   STATUS      AGE
letters   default_letters   kafka-gateway:6565   kafka      text/plain     Ready       <unknown>
numbers   <empty>           <empty>              kafka      <empty>        <unknown>   <unknown>
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
async fn test_stream_delete() {
    CommandTable::new(
        "stream",
        "delete",
        vec![CommandTableRecord {
            name: "delete",
            args: args(&[STREAM_NAME]),
            given_objects: vec![given(&stream(STREAM_NAME, ""))],
            expect_deletes: vec![DeleteAction::new(
                "streams.stream.projectriff.io",
                NAMESPACE,
                STREAM_NAME,
            )],
            expect_output: Some(
                r#"
Deleted stream "letters"
"#,
            ),
            ..Default::default()
        }],
    )
    .run()
    .await;
}

#[tokio::test]
async fn test_stream_status() {
    CommandTable::new(
        "stream",
        "status",
        vec![CommandTableRecord {
            name: "no conditions",
            args: args(&[STREAM_NAME]),
            given_objects: vec![given(&stream(STREAM_NAME, ""))],
            expect_output: Some(
                r#"
# letters: <unknown>
---
{}
"#,
            ),
            ..Default::default()
        }],
    )
    .run()
    .await;
}
