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

//! Fan-out helpers for batches of independent API calls.

use crate::shared::error::{Result, RiffError};
use futures::future::join_all;
use std::future::Future;

/// Outcome of a single task, paired with the input that produced it.
#[derive(Debug)]
pub struct CorrelatedResult<I> {
    pub input: I,
    pub error: Option<RiffError>,
}

/// Runs `task` once per input concurrently and waits for all of them.
///
/// Results are reported in input order regardless of completion order.
pub async fn apply_in_parallel<I, F, Fut>(inputs: Vec<I>, task: F) -> Vec<CorrelatedResult<I>>
where
    I: Clone,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let outcomes = join_all(inputs.iter().cloned().map(&task)).await;
    inputs
        .into_iter()
        .zip(outcomes)
        .map(|(input, outcome)| CorrelatedResult {
            input,
            error: outcome.err(),
        })
        .collect()
}

/// Collapses failed results into a single error, one line per failure.
pub fn merge_results<I, F>(results: &[CorrelatedResult<I>], describe: F) -> Result<()>
where
    F: Fn(&CorrelatedResult<I>) -> String,
{
    let messages: Vec<String> = results
        .iter()
        .filter(|result| result.error.is_some())
        .map(describe)
        .collect();

    if messages.is_empty() {
        Ok(())
    } else {
        Err(RiffError::command(messages.join("\n")))
    }
}
