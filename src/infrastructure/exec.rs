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

use crate::shared::error::{Result, RiffError};
use crate::shared::io::{write_shared_bytes, SharedWriter};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

/// Writers a child process streams its output into.
#[derive(Clone)]
pub struct ProcessIo {
    pub stdout: SharedWriter,
    pub stderr: SharedWriter,
}

#[async_trait::async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `program` to completion, forwarding its output as it arrives.
    /// The child reads this process's stdin directly. A non-zero exit is an
    /// error.
    async fn run(&self, program: &str, args: &[String], io: ProcessIo) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner;

async fn forward<R: AsyncRead + Unpin>(source: Option<R>, sink: SharedWriter) -> Result<()> {
    let Some(mut source) = source else {
        return Ok(());
    };
    let mut buf = vec![0u8; 8 * 1024];
    loop {
        let read = source.read(&mut buf).await?;
        if read == 0 {
            return Ok(());
        }
        write_shared_bytes(&sink, &buf[..read])?;
    }
}

#[async_trait::async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, program: &str, args: &[String], io: ProcessIo) -> Result<()> {
        debug!(%program, ?args, "running process");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RiffError::Process(format!("unable to run {}: {}", program, e)))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (out, err, status) = tokio::join!(
            forward(stdout, io.stdout),
            forward(stderr, io.stderr),
            child.wait()
        );
        out?;
        err?;
        let status = status
            .map_err(|e| RiffError::Process(format!("unable to wait for {}: {}", program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(RiffError::Process(format!("{} exited with {}", program, status)))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::shared::io::{shared_writer, Buffer};

    fn io() -> (Buffer, Buffer, ProcessIo) {
        let (stdout, stderr) = (Buffer::new(), Buffer::new());
        let io = ProcessIo {
            stdout: shared_writer(stdout.clone()),
            stderr: shared_writer(stderr.clone()),
        };
        (stdout, stderr, io)
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_forwards_stdout_and_stderr() {
        let (stdout, stderr, io) = io();
        TokioProcessRunner
            .run("sh", &sh("echo out; echo err >&2"), io)
            .await
            .unwrap();
        assert_eq!(stdout.contents(), "out\n");
        assert_eq!(stderr.contents(), "err\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit_keeps_output() {
        let (stdout, stderr, io) = io();
        let err = TokioProcessRunner
            .run("sh", &sh("echo partial; echo failed >&2; exit 7"), io)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("sh exited with"), "{err}");
        assert_eq!(stdout.contents(), "partial\n");
        assert_eq!(stderr.contents(), "failed\n");
    }
}
