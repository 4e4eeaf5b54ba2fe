//! Async client for the executor child process.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use super::error::{WorkerError, WorkerResult};
use super::protocol::{ExecutorReply, ExecutorRequest};
use crate::config::Settings;

/// Requests written to the executor and still waiting for their reply.
#[derive(Clone, Default)]
struct Inflight(Arc<Mutex<HashMap<String, oneshot::Sender<ExecutorReply>>>>);

impl Inflight {
    async fn register(&self, id: &str) -> oneshot::Receiver<ExecutorReply> {
        let (tx, rx) = oneshot::channel();
        self.0.lock().await.insert(id.to_string(), tx);
        rx
    }

    async fn forget(&self, id: &str) {
        self.0.lock().await.remove(id);
    }

    async fn complete(&self, reply: ExecutorReply) {
        match self.0.lock().await.remove(&reply.id) {
            Some(tx) => {
                // The caller may have timed out and dropped its receiver
                let _ = tx.send(reply);
            }
            None => tracing::debug!(id = %reply.id, "reply for unknown request"),
        }
    }

    async fn fail_all(&self) {
        for (id, tx) in self.0.lock().await.drain() {
            let _ = tx.send(ExecutorReply::exited(id));
        }
    }
}

/// Talks to the executor over its stdin/stdout, one JSON line per message.
///
/// Calls may be issued concurrently from any task; each carries a fresh
/// uuid and a single reader task routes replies back to their caller.
pub struct WorkerClient {
    writer: Mutex<BufWriter<ChildStdin>>,
    inflight: Inflight,
    reader: JoinHandle<()>,
    timeout: Duration,
    _child: Child,
}

impl WorkerClient {
    /// Start the executor described by the `[executor]` settings.
    pub async fn spawn_with_settings(settings: &Settings) -> WorkerResult<Self> {
        let path = match settings.executor_path() {
            Ok(Some(path)) => path,
            Ok(None) => return Err(WorkerError::NotConfigured),
            Err(e) => {
                tracing::error!(error = %e, "executor path does not expand");
                return Err(WorkerError::NotConfigured);
            }
        };
        Self::spawn(
            &path,
            &settings.executor.args,
            Duration::from_secs(settings.executor.timeout_secs),
        )
        .await
    }

    pub async fn spawn(
        program: impl AsRef<Path>,
        args: &[String],
        timeout: Duration,
    ) -> WorkerResult<Self> {
        let program = program.as_ref();
        let mut child = Command::new(program)
            .args(args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(WorkerError::Spawn)?;

        let stdin = child.stdin.take().ok_or(WorkerError::MissingPipe("stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or(WorkerError::MissingPipe("stdout"))?;

        let inflight = Inflight::default();
        let reader = tokio::spawn(route_replies(stdout, inflight.clone()));
        tracing::info!(program = %program.display(), "executor started");

        Ok(Self {
            writer: Mutex::new(BufWriter::new(stdin)),
            inflight,
            reader,
            timeout,
            _child: child,
        })
    }

    /// Send one request and wait for its reply.
    ///
    /// A fault reported by the executor comes back as
    /// [`WorkerError::Rejected`] with the executor's message untouched.
    pub async fn call<P, R>(&self, method: &str, params: &P) -> WorkerResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let id = uuid::Uuid::new_v4().to_string();
        let encode = |source| WorkerError::Encode {
            method: method.to_string(),
            source,
        };
        let request = ExecutorRequest {
            id: &id,
            method,
            params: serde_json::to_value(params).map_err(encode)?,
        };
        let mut line = serde_json::to_string(&request).map_err(encode)?;
        line.push('\n');

        let reply = self.inflight.register(&id).await;
        if let Err(e) = self.write_line(&line).await {
            self.inflight.forget(&id).await;
            return Err(e);
        }
        tracing::debug!(%id, method, "request sent");

        let reply = match tokio::time::timeout(self.timeout, reply).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => return Err(WorkerError::Exited),
            Err(_) => {
                self.inflight.forget(&id).await;
                tracing::warn!(%id, method, "executor did not answer in time");
                return Err(WorkerError::TimedOut {
                    method: method.to_string(),
                    after: self.timeout,
                });
            }
        };

        let value = reply.into_outcome()?;
        serde_json::from_value(value).map_err(|source| WorkerError::Decode {
            method: method.to_string(),
            source,
        })
    }

    async fn write_line(&self, line: &str) -> WorkerResult<()> {
        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(WorkerError::Write)?;
        writer.flush().await.map_err(WorkerError::Write)
    }

    /// `false` once the executor has closed its stdout.
    pub fn is_alive(&self) -> bool {
        !self.reader.is_finished()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Drop for WorkerClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Read reply lines until the executor closes stdout, then fail whatever
/// is still waiting.
async fn route_replies(stdout: ChildStdout, inflight: Inflight) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => {}
            Ok(Some(line)) => match serde_json::from_str::<ExecutorReply>(&line) {
                Ok(reply) => inflight.complete(reply).await,
                Err(e) => tracing::warn!(error = %e, "unparseable executor line"),
            },
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "executor read failed");
                break;
            }
        }
    }
    tracing::warn!("executor stdout closed");
    inflight.fail_all().await;
}
