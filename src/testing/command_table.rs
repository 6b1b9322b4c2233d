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

//! Table driven harness running full command lines against fakes.

use super::fake_kube::{DeleteAction, DeleteCollectionAction, FakeKubeClient, Reactor};
use super::fakes::{FakeLogTailer, FakePackClient, FakeProcessRunner};
use crate::cli::commands::CliArgs;
use crate::cli::config::Config;
use crate::infrastructure::kubernetes::client::to_dynamic;
use crate::shared::error::RiffError;
use crate::shared::io::{shared_reader, shared_writer, Buffer};
use clap::Parser;
use kube::core::{ApiResource, DynamicObject};
use kube::Resource;
use serde::Serialize;
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;

/// An object seeded into the fake cluster before a command runs.
pub struct GivenObject {
    resource: ApiResource,
    object: DynamicObject,
}

pub fn given<K>(object: &K) -> GivenObject
where
    K: Resource<DynamicType = ()> + Serialize,
{
    GivenObject {
        resource: ApiResource::erase::<K>(&()),
        object: to_dynamic(object).unwrap_or_else(|e| panic!("unable to convert object: {e}")),
    }
}

/// JSON form used to compare recorded creates and updates.
pub fn json<T: Serialize>(object: &T) -> Value {
    serde_json::to_value(object).unwrap_or_else(|e| panic!("unable to serialize object: {e}"))
}

pub fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Fakes handed to a command, available to `prepare` and `verify` hooks.
pub struct Fixture {
    pub client: FakeKubeClient,
    pub pack: Arc<FakePackClient>,
    pub logs: Arc<FakeLogTailer>,
    pub exec: Arc<FakeProcessRunner>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            client: FakeKubeClient::new(),
            pack: Arc::new(FakePackClient::default()),
            logs: Arc::new(FakeLogTailer::default()),
            exec: Arc::new(FakeProcessRunner::default()),
        }
    }
}

type Prepare = Box<dyn Fn(&Fixture)>;
type Verify = Box<dyn Fn(&Fixture, &str, Option<&RiffError>)>;

#[derive(Default)]
pub struct CommandTableRecord {
    pub name: &'static str,
    pub skip: bool,

    pub args: Vec<String>,
    pub stdin: Option<String>,
    pub given_objects: Vec<GivenObject>,
    pub with_reactors: Vec<Reactor>,
    pub prepare: Option<Prepare>,

    pub expect_creates: Vec<Value>,
    pub expect_updates: Vec<Value>,
    pub expect_deletes: Vec<DeleteAction>,
    pub expect_delete_collections: Vec<DeleteCollectionAction>,

    /// Exact combined stdout and stderr.
    pub expect_output: Option<&'static str>,
    /// Output compared line by line with runs of whitespace collapsed.
    pub expect_table: Option<&'static str>,
    pub should_error: bool,
    /// Exact error message; implies `should_error`.
    pub expect_error: Option<&'static str>,
    pub verify: Option<Verify>,
}

/// Records for one `riff <noun> <verb>` command. An empty verb runs a
/// top level command such as `riff doctor`.
pub struct CommandTable {
    noun: &'static str,
    verb: &'static str,
    records: Vec<CommandTableRecord>,
}

fn normalize_table(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

fn assert_actions<T: Serialize>(record: &str, kind: &str, expected: &[T], actual: &[T]) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "{record}: expected {} {kind}, got {}: {}",
        expected.len(),
        actual.len(),
        json(&actual)
    );
    for (expected, actual) in expected.iter().zip(actual) {
        let (expected, actual) = (json(expected), json(actual));
        assert_eq!(
            actual,
            expected,
            "{record}: unexpected {kind}\nexpected: {expected:#}\nactual: {actual:#}"
        );
    }
}

impl CommandTable {
    pub fn new(noun: &'static str, verb: &'static str, records: Vec<CommandTableRecord>) -> Self {
        Self {
            noun,
            verb,
            records,
        }
    }

    pub async fn run(self) {
        colored::control::set_override(false);
        let Self {
            noun,
            verb,
            records,
        } = self;
        for record in records {
            if record.skip {
                continue;
            }
            run_record(noun, verb, record).await;
        }
    }
}

async fn run_record(noun: &str, verb: &str, record: CommandTableRecord) {
    let name = record.name;
    let fixture = Fixture::new();
    for given in &record.given_objects {
        fixture
            .client
            .add_dynamic(&given.resource, given.object.clone());
    }
    for reactor in &record.with_reactors {
        fixture.client.add_reactor(reactor.clone());
    }
    if let Some(prepare) = &record.prepare {
        prepare(&fixture);
    }

    let output = Buffer::new();
    let stdin = record.stdin.clone().unwrap_or_default();
    let config = Config::new(
        Arc::new(fixture.client.clone()),
        fixture.pack.clone(),
        fixture.logs.clone(),
        fixture.exec.clone(),
    )
    .with_io(
        shared_reader(Cursor::new(stdin.into_bytes())),
        shared_writer(output.clone()),
        shared_writer(output.clone()),
    );

    let mut argv: Vec<String> = ["riff", noun, verb]
        .iter()
        .filter(|word| !word.is_empty())
        .map(|word| word.to_string())
        .collect();
    argv.extend(record.args.iter().cloned());

    let expect_error = record.should_error || record.expect_error.is_some();
    let result = match CliArgs::try_parse_from(&argv) {
        Ok(cli) => cli.command.execute(&config).await,
        Err(e) => {
            assert!(expect_error, "{name}: unable to parse {argv:?}: {e}");
            return;
        }
    };

    match (&result, expect_error) {
        (Err(e), false) => panic!("{name}: unexpected error: {e}"),
        (Ok(()), true) => panic!("{name}: expected an error"),
        _ => {}
    }
    if let (Some(expected), Err(e)) = (record.expect_error, &result) {
        let actual = match e {
            RiffError::Silent(inner) => inner.to_string(),
            other => other.to_string(),
        };
        assert_eq!(actual, expected, "{name}: unexpected error message");
    }

    let creates: Vec<Value> = fixture.client.creates().iter().map(json).collect();
    let updates: Vec<Value> = fixture.client.updates().iter().map(json).collect();
    assert_actions(name, "creates", &record.expect_creates, &creates);
    assert_actions(name, "updates", &record.expect_updates, &updates);
    assert_actions(name, "deletes", &record.expect_deletes, &fixture.client.deletes());
    assert_actions(
        name,
        "delete collections",
        &record.expect_delete_collections,
        &fixture.client.delete_collections(),
    );

    let actual_output = output.contents();
    if let Some(expected) = record.expect_output {
        assert_eq!(
            actual_output,
            expected.trim_start_matches('\n'),
            "{name}: unexpected output"
        );
    }
    if let Some(expected) = record.expect_table {
        assert_eq!(
            normalize_table(&actual_output),
            normalize_table(expected),
            "{name}: unexpected table output:\n{actual_output}"
        );
    }

    if let Some(verify) = &record.verify {
        verify(&fixture, &actual_output, result.as_ref().err());
    }
}
