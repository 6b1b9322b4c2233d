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

use crate::infrastructure::exec::{ProcessIo, ProcessRunner};
use crate::infrastructure::logs::{LogTailer, TailRequest};
use crate::infrastructure::pack::{BuildOptions, PackClient};
use crate::shared::error::{Result, RiffError};
use crate::shared::io::{write_shared, write_shared_bytes, SharedWriter};
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub struct FakePackClient {
    builds: Mutex<Vec<BuildOptions>>,
    failure: Mutex<Option<String>>,
}

impl FakePackClient {
    pub fn fail_with(&self, message: &str) {
        *lock(&self.failure) = Some(message.to_string());
    }

    pub fn builds(&self) -> Vec<BuildOptions> {
        lock(&self.builds).clone()
    }
}

#[async_trait::async_trait]
impl PackClient for FakePackClient {
    async fn build(&self, options: BuildOptions) -> Result<()> {
        lock(&self.builds).push(options);
        match lock(&self.failure).clone() {
            Some(message) => Err(RiffError::Process(message)),
            None => Ok(()),
        }
    }
}

/// Writes canned log lines, then either returns or keeps the stream open.
#[derive(Default)]
pub struct FakeLogTailer {
    requests: Mutex<Vec<TailRequest>>,
    lines: Mutex<Vec<String>>,
    finish: Mutex<bool>,
    failure: Mutex<Option<String>>,
}

impl FakeLogTailer {
    pub fn emit(&self, line: &str) {
        lock(&self.lines).push(line.to_string());
    }

    /// Return after emitting instead of following forever.
    pub fn finish_after_emit(&self) {
        *lock(&self.finish) = true;
    }

    pub fn fail_with(&self, message: &str) {
        *lock(&self.failure) = Some(message.to_string());
    }

    pub fn requests(&self) -> Vec<TailRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait::async_trait]
impl LogTailer for FakeLogTailer {
    async fn tail(&self, out: SharedWriter, request: TailRequest) -> Result<()> {
        lock(&self.requests).push(request);
        if let Some(message) = lock(&self.failure).clone() {
            return Err(RiffError::Kube(message));
        }
        let lines = lock(&self.lines).clone();
        for line in lines {
            write_shared(&out, &format!("{}\n", line))?;
        }
        if *lock(&self.finish) {
            return Ok(());
        }
        futures::future::pending::<()>().await;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessCall {
    pub program: String,
    pub args: Vec<String>,
}

/// Writes canned output, then exits successfully unless told to fail.
#[derive(Default)]
pub struct FakeProcessRunner {
    calls: Mutex<Vec<ProcessCall>>,
    stdout: Mutex<Vec<u8>>,
    stderr: Mutex<Vec<u8>>,
    failure: Mutex<Option<String>>,
}

impl FakeProcessRunner {
    pub fn respond_with(&self, stdout: &str) {
        *lock(&self.stdout) = stdout.as_bytes().to_vec();
    }

    pub fn respond_with_stderr(&self, stderr: &str) {
        *lock(&self.stderr) = stderr.as_bytes().to_vec();
    }

    pub fn fail_with(&self, message: &str) {
        *lock(&self.failure) = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<ProcessCall> {
        lock(&self.calls).clone()
    }
}

#[async_trait::async_trait]
impl ProcessRunner for FakeProcessRunner {
    async fn run(&self, program: &str, args: &[String], io: ProcessIo) -> Result<()> {
        lock(&self.calls).push(ProcessCall {
            program: program.to_string(),
            args: args.to_vec(),
        });
        let stdout = lock(&self.stdout).clone();
        let stderr = lock(&self.stderr).clone();
        write_shared_bytes(&io.stdout, &stdout)?;
        write_shared_bytes(&io.stderr, &stderr)?;
        match lock(&self.failure).clone() {
            Some(message) => Err(RiffError::Process(message)),
            None => Ok(()),
        }
    }
}
