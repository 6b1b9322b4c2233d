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

// Fakes and the command table harness used by the test suites

pub mod command_table;
pub mod fake_kube;
pub mod fakes;

pub use command_table::{
    args, given, json, CommandTable, CommandTableRecord, Fixture, GivenObject,
};
pub use fake_kube::{DeleteAction, DeleteCollectionAction, FakeKubeClient, Reactor};
pub use fakes::{FakeLogTailer, FakePackClient, FakeProcessRunner, ProcessCall};
