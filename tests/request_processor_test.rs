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
use riff::domain::apis::request::single_container_template;
use riff::domain::apis::{
    Build, RequestProcessor, RequestProcessorItem, RequestProcessorSpec, RequestProcessorStatus,
};
use riff::testing::{
    args, given, json, CommandTable, CommandTableRecord, DeleteAction, DeleteCollectionAction,
};

const PROCESSOR_NAME: &str = "my-processor";

fn request_processor(name: &str, item: &str, build: Option<Build>, image: Option<&str>) -> RequestProcessor {
    let mut template = single_container_template();
    template.containers[0].image = image.map(str::to_string);
    let mut processor = RequestProcessor::new(
        name,
        RequestProcessorSpec {
            items: vec![RequestProcessorItem {
                name: item.to_string(),
                build,
                template: Some(template),
            }],
        },
    );
    processor.metadata.namespace = Some(NAMESPACE.to_string());
    processor
}

#[tokio::test]
async fn test_request_processor_create() {
    CommandTable::new(
        "requestprocessor",
        "create",
        vec![
            CommandTableRecord {
                name: "missing item",
                args: args(&[PROCESSOR_NAME, "--image", "example.com/image"]),
                expect_error: Some("missing field(s): --item"),
                ..Default::default()
            },
            CommandTableRecord {
                name: "from image",
                args: args(&[PROCESSOR_NAME, "--item", "v1", "--image", "example.com/image"]),
                expect_creates: vec![json(&request_processor(
                    PROCESSOR_NAME,
                    "v1",
                    None,
                    Some("example.com/image"),
                ))],
                expect_output: Some(
                    r#"
Created request processor "my-processor"
"#,
                ),
                verify: Some(Box::new(|fixture, _, _| {
                    let created = &fixture.client.creates()[0];
                    assert_json_diff::assert_json_include!(
                        actual: created.data.clone(),
                        expected: serde_json::json!({
                            "spec": [{"name": "v1"}]
                        })
                    );
                })),
                ..Default::default()
            },
            CommandTableRecord {
                name: "from function",
                args: args(&[PROCESSOR_NAME, "--item", "v2", "--function-ref", "square"]),
                expect_creates: vec![json(&request_processor(
                    PROCESSOR_NAME,
                    "v2",
                    Some(Build::function("square")),
                    None,
                ))],
                expect_output: Some(
                    r#"
Created request processor "my-processor"
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
async fn test_request_processor_list() {
    let mut ready = request_processor(PROCESSOR_NAME, "v1", Some(Build::application("my-app")), None);
    ready.status = Some(RequestProcessorStatus {
        status: ready_status(),
        domain: "my-processor.default.example.com".to_string(),
    });

    CommandTable::new(
        "requestprocessor",
        "list",
        vec![
            CommandTableRecord {
                name: "empty",
                args: args(&[]),
                expect_output: Some(
                    r#"
No request processors found.
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "table shows the first item",
                args: args(&[]),
                given_objects: vec![given(&ready)],
                expect_table: Some(
                    r#"
NAME           TYPE          REF      DOMAIN                             READY   AGE
my-processor   application   my-app   my-processor.default.example.com   Ready   <unknown>
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
async fn test_request_processor_delete() {
    CommandTable::new(
        "requestprocessor",
        "delete",
        vec![
            CommandTableRecord {
                name: "delete",
                args: args(&[PROCESSOR_NAME]),
                given_objects: vec![given(&request_processor(PROCESSOR_NAME, "v1", None, None))],
                expect_deletes: vec![DeleteAction::new(
                    "requestprocessors.request.projectriff.io",
                    NAMESPACE,
                    PROCESSOR_NAME,
                )],
                expect_output: Some(
                    r#"
Deleted request processor "my-processor"
"#,
                ),
                ..Default::default()
            },
            CommandTableRecord {
                name: "delete all",
                args: args(&["--all"]),
                expect_delete_collections: vec![DeleteCollectionAction::new(
                    "requestprocessors.request.projectriff.io",
                    NAMESPACE,
                    "",
                )],
                expect_output: Some(
                    r#"
Deleted request processors in namespace "default"
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
async fn test_request_processor_status() {
    CommandTable::new(
        "requestprocessor",
        "status",
        vec![CommandTableRecord {
            name: "not found",
            args: args(&[PROCESSOR_NAME]),
            expect_output: Some(
                r#"
RequestProcessor "default/my-processor" not found
"#,
            ),
            should_error: true,
            ..Default::default()
        }],
    )
    .run()
    .await;
}
