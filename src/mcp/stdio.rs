// ABOUTME: Protocol server that spawns one child MCP server per session and pipes JSON-RPC over stdio
// ABOUTME: Inbound messages become stdin lines; stdout lines become outbound SSE frames
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::connector::ProtocolServer;
use crate::errors::{AppError, AppResult};
use crate::sse::{McpChannel, SessionId, SseTransport};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

/// Command line of the child MCP server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdioCommand {
    /// Executable to run
    pub program: String,
    /// Arguments passed to the executable
    pub args: Vec<String>,
    /// Working directory, inherited when `None`
    pub working_dir: Option<PathBuf>,
}

impl StdioCommand {
    /// Command with no arguments
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Append arguments
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the child in `dir`
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Build the first entry of a `program args..` list
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the list is empty
    pub fn from_argv(argv: &[String]) -> AppResult<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| AppError::config("No MCP server command given"))?;
        Ok(Self::new(program.clone()).with_args(args.iter().cloned()))
    }
}

/// Spawns `command` once per session
#[derive(Debug, Clone)]
pub struct StdioProcessServer {
    command: StdioCommand,
}

impl StdioProcessServer {
    /// Create a server that runs `command` for every session
    #[must_use]
    pub const fn new(command: StdioCommand) -> Self {
        Self { command }
    }

    /// The command spawned per session
    #[must_use]
    pub const fn command(&self) -> &StdioCommand {
        &self.command
    }

    fn spawn(&self) -> AppResult<Child> {
        let mut command = Command::new(&self.command.program);
        command
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &self.command.working_dir {
            command.current_dir(dir);
        }

        command.spawn().map_err(|e| {
            AppError::external_service(&self.command.program, format!("failed to spawn: {e}"))
                .with_source(e)
        })
    }
}

#[async_trait]
impl ProtocolServer for StdioProcessServer {
    async fn connect(&self, channel: McpChannel) -> AppResult<()> {
        let mut child = self.spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AppError::internal("Child stdin is not piped"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AppError::internal("Child stdout is not piped"))?;

        info!(
            session_id = %channel.session_id(),
            program = %self.command.program,
            pid = child.id(),
            "Spawned MCP server process"
        );
        tokio::spawn(pump_session(child, stdin, stdout, channel));
        Ok(())
    }
}

/// Relay between the channel and the child until either side goes away
async fn pump_session(
    mut child: Child,
    mut stdin: ChildStdin,
    stdout: ChildStdout,
    mut channel: McpChannel,
) {
    let session_id = channel.session_id().clone();
    let transport = Arc::clone(channel.transport());
    let mut lines = LinesStream::new(BufReader::new(stdout).lines());

    loop {
        tokio::select! {
            biased;
            line = lines.next() => match line {
                Some(Ok(line)) => {
                    if let Err(e) = forward_line(&transport, &session_id, &line).await {
                        debug!(session_id = %session_id, error = %e, "Client stream gone");
                        break;
                    }
                }
                Some(Err(e)) => {
                    warn!(session_id = %session_id, error = %e, "Failed to read child stdout");
                    break;
                }
                None => {
                    debug!(session_id = %session_id, "Child stdout closed");
                    break;
                }
            },
            inbound = channel.recv() => match inbound {
                Some(message) => {
                    if let Err(e) = write_message(&mut stdin, &message).await {
                        warn!(session_id = %session_id, error = %e, "Failed to write to child stdin");
                        break;
                    }
                }
                None => {
                    debug!(session_id = %session_id, "Transport closed");
                    break;
                }
            },
            status = child.wait() => {
                info!(session_id = %session_id, status = ?status, "MCP server process exited");
                break;
            }
        }
    }

    transport.close();
    if let Err(e) = child.kill().await {
        debug!(session_id = %session_id, error = %e, "Child already gone");
    }
}

async fn forward_line(transport: &SseTransport, session_id: &SessionId, line: &str) -> AppResult<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }
    match serde_json::from_str::<Value>(line) {
        Ok(frame) => transport.send(&frame).await,
        Err(e) => {
            debug!(session_id = %session_id, error = %e, "Skipping non-JSON stdout line");
            Ok(())
        }
    }
}

async fn write_message(stdin: &mut ChildStdin, message: &Value) -> AppResult<()> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    stdin.write_all(&line).await?;
    stdin.flush().await?;
    Ok(())
}
