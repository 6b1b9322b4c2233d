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

use crate::infrastructure::constants::POD_DISCOVERY_INTERVAL_MS;
use crate::shared::error::Result;
use crate::shared::io::{write_shared, SharedWriter};
use futures::{AsyncBufReadExt, TryStreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{ListParams, LogParams};
use kube::{Api, Client};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Which pod logs to follow.
#[derive(Debug, Clone, PartialEq)]
pub struct TailRequest {
    pub namespace: String,
    pub label_selector: String,
    /// Containers to follow; empty follows every container.
    pub containers: Vec<String>,
    pub since: Duration,
}

#[async_trait::async_trait]
pub trait LogTailer: Send + Sync {
    /// Streams matching logs to `out` until the returned future is dropped.
    async fn tail(&self, out: SharedWriter, request: TailRequest) -> Result<()>;
}

pub fn format_log_line(namespace: &str, pod: &str, container: &str, line: &str) -> String {
    format!("{}/{}[{}]: {}\n", namespace, pod, container, line)
}

/// A container instance: pod, container and restart count.
type ContainerKey = (String, String, i32);

/// Tracks which container streams are open and when closed ones ended.
#[derive(Debug, Default)]
struct FollowState {
    following: HashSet<ContainerKey>,
    ended: HashMap<ContainerKey, Instant>,
}

impl FollowState {
    /// How far back a new stream for `key` should read, or `None` when the
    /// container is already followed or has terminated after being read.
    fn start(
        &mut self,
        key: &ContainerKey,
        terminated: bool,
        since: Duration,
        now: Instant,
    ) -> Option<Duration> {
        if self.following.contains(key) {
            return None;
        }
        let window = match self.ended.get(key) {
            None => since,
            Some(_) if terminated => return None,
            // resume a dropped stream, overlapping by a second at most
            Some(ended) => now.saturating_duration_since(*ended) + Duration::from_secs(1),
        };
        self.ended.remove(key);
        self.following.insert(key.clone());
        Some(window)
    }

    fn finish(&mut self, key: ContainerKey, now: Instant) {
        self.following.remove(&key);
        self.ended.insert(key, now);
    }
}

/// Restart count and whether the current instance has terminated.
fn container_state(pod: &Pod, container: &str) -> (i32, bool) {
    pod.status
        .as_ref()
        .and_then(|status| status.container_statuses.as_ref())
        .and_then(|statuses| statuses.iter().find(|s| s.name == container))
        .map(|status| {
            let terminated = status
                .state
                .as_ref()
                .is_some_and(|state| state.terminated.is_some());
            (status.restart_count, terminated)
        })
        .unwrap_or((0, false))
}

/// Follows pod logs through the Kubernetes API, picking up new pods as
/// they are scheduled.
#[derive(Clone)]
pub struct KubeLogTailer {
    client: Client,
}

impl KubeLogTailer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

async fn follow_container(
    pods: Api<Pod>,
    out: SharedWriter,
    namespace: String,
    key: ContainerKey,
    since: Duration,
) -> ContainerKey {
    let (pod, container, _) = &key;
    let params = LogParams {
        container: Some(container.clone()),
        follow: true,
        since_seconds: Some((since.as_secs_f64().ceil() as i64).max(1)),
        ..LogParams::default()
    };

    let result: std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> = async {
        let mut lines = pods.log_stream(pod, &params).await?.lines();
        while let Some(line) = lines.try_next().await? {
            write_shared(&out, &format_log_line(&namespace, pod, container, &line))?;
        }
        Ok(())
    }
    .await;

    if let Err(e) = result {
        warn!(%pod, %container, error = %e, "log stream ended");
    }
    key
}

#[async_trait::async_trait]
impl LogTailer for KubeLogTailer {
    async fn tail(&self, out: SharedWriter, request: TailRequest) -> Result<()> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &request.namespace);
        let params = ListParams::default().labels(&request.label_selector);
        let mut state = FollowState::default();
        let mut streams = JoinSet::new();
        let mut discovery = tokio::time::interval(Duration::from_millis(POD_DISCOVERY_INTERVAL_MS));

        loop {
            tokio::select! {
                _ = discovery.tick() => {
                    let list = match pods.list(&params).await {
                        Ok(list) => list,
                        Err(e) => {
                            warn!(selector = %request.label_selector, error = %e, "unable to list pods");
                            continue;
                        }
                    };
                    for pod in list.items {
                        let Some(pod_name) = pod.metadata.name.clone() else {
                            continue;
                        };
                        let containers = pod
                            .spec
                            .as_ref()
                            .map(|spec| spec.containers.iter().map(|c| c.name.clone()).collect::<Vec<_>>())
                            .unwrap_or_default()
                            .into_iter()
                            .filter(|name| {
                                request.containers.is_empty() || request.containers.contains(name)
                            });
                        for container in containers {
                            let (restarts, terminated) = container_state(&pod, &container);
                            let key = (pod_name.clone(), container, restarts);
                            let Some(window) =
                                state.start(&key, terminated, request.since, Instant::now())
                            else {
                                continue;
                            };
                            debug!(pod = %key.0, container = %key.1, ?window, "following logs");
                            streams.spawn(follow_container(
                                pods.clone(),
                                out.clone(),
                                request.namespace.clone(),
                                key,
                                window,
                            ));
                        }
                    }
                }
                Some(done) = streams.join_next() => {
                    if let Ok(key) = done {
                        state.finish(key, Instant::now());
                    }
                }
            }
        }
    }
}
