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

use super::client::{RiffResource, TypedApi};
use crate::domain::apis::Conditioned;
use crate::infrastructure::constants::READY_POLL_INTERVAL_MS;
use crate::shared::error::{Result, RiffError};
use backon::{ConstantBuilder, Retryable};
use std::time::Duration;
use tracing::debug;

enum Readiness {
    Pending,
    Failed(RiffError),
}

/// Polls a resource until its `Ready` condition is `True`.
///
/// A `False` condition ends the wait with the condition message. Errors
/// reading the resource end the wait as well. The caller bounds the total
/// time with a timeout.
pub async fn wait_until_ready<K>(api: &TypedApi<K>, name: &str) -> Result<()>
where
    K: RiffResource + Conditioned,
{
    wait_with_interval(api, name, Duration::from_millis(READY_POLL_INTERVAL_MS)).await
}

pub(crate) async fn wait_with_interval<K>(
    api: &TypedApi<K>,
    name: &str,
    interval: Duration,
) -> Result<()>
where
    K: RiffResource + Conditioned,
{
    let check = || async {
        let resource = api.get(name).await.map_err(Readiness::Failed)?;
        match resource.ready_condition() {
            Some(ready) if ready.is_true() => Ok(()),
            Some(ready) if ready.is_false() => Err(Readiness::Failed(RiffError::command(
                format!(
                    "failed to become ready: {}",
                    ready.message.clone().unwrap_or_default()
                ),
            ))),
            _ => {
                debug!(%name, "waiting for resource to become ready");
                Err(Readiness::Pending)
            }
        }
    };

    let result = check
        .retry(
            ConstantBuilder::default()
                .with_delay(interval)
                .with_max_times(usize::MAX),
        )
        .when(|e| matches!(e, Readiness::Pending))
        .await;

    match result {
        Ok(()) => Ok(()),
        Err(Readiness::Failed(e)) => Err(e),
        Err(Readiness::Pending) => Err(RiffError::Timeout(format!(
            "{} did not become ready",
            name
        ))),
    }
}
