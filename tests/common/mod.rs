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

// Fixture helpers shared by the command tests

#![allow(dead_code)]

use riff::domain::apis::{Condition, Status, CONDITION_READY};
use riff::testing::Reactor;
use serde_json::json;

pub const NAMESPACE: &str = "default";
pub const OTHER_NAMESPACE: &str = "other-namespace";

pub fn ready_status() -> Status {
    Status {
        observed_generation: Some(1),
        conditions: vec![Condition::new(CONDITION_READY, "True")],
    }
}

pub fn failed_status(reason: &str) -> Status {
    let mut condition = Condition::new(CONDITION_READY, "False");
    condition.reason = Some(reason.to_string());
    condition.message = Some(format!("{} happened", reason));
    Status {
        observed_generation: Some(1),
        conditions: vec![condition],
    }
}

/// Reports every fetched `resource` as ready, so `--tail` returns promptly.
pub fn become_ready(resource: &str) -> Reactor {
    Reactor::mutate("get", resource, |object| {
        object.data["status"] = json!({
            "conditions": [{"type": "Ready", "status": "True"}]
        });
    })
}

/// Reports every fetched `resource` as failed.
pub fn become_failed(resource: &str, message: &str) -> Reactor {
    let message = message.to_string();
    Reactor::mutate("get", resource, move |object| {
        object.data["status"] = json!({
            "conditions": [{
                "type": "Ready",
                "status": "False",
                "reason": "Failed",
                "message": message,
            }]
        });
    })
}
