//! MCP backend sessions over stdio
//!
//! Each session is one child process speaking newline-delimited JSON-RPC
//! on its stdin/stdout. The child is spawned with kill-on-drop, so a
//! session dropped mid-call (cancellation, timeout) never outlives its
//! owner.

use super::protocol::{
    InitializeParams, InitializeResult, JsonRpcError, JsonRpcMessage, JsonRpcRequest,
    ServerInfo, ToolCallResult, ToolsListResult,
};
use super::{BackendSession, GatewayError, Row, SessionConnector};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Variables every backend inherits so it can locate its own runtime.
const INHERITED_ENV: &[&str] = &[
    "HOME", "LOGNAME", "PATH", "SHELL", "TERM", "USER", "LANG", "SYSTEMROOT", "APPDATA",
    "TEMP", "TMP", "USERPROFILE",
];

/// How long a closing backend gets to exit after stdin is closed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Upper bound on `tools/list` pages fetched in one listing.
const MAX_TOOL_PAGES: usize = 64;

/// Executable, arguments and environment for one backend process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl LaunchSpec {
    /// Build a launch spec from a command line and resolved environment.
    ///
    /// Returns `None` for an empty command.
    pub fn new(command: &[String], env: BTreeMap<String, String>) -> Option<Self> {
        let (program, args) = command.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            env,
        })
    }

    /// Resolve the child environment: a small inherited base, then the
    /// passthrough names present in `lookup`, then literal values.
    ///
    /// Literal values win over passthrough values only when the
    /// passthrough variable is unset, so a configured default such as
    /// `AWS_REGION = "us-east-1"` yields to the caller's real setting.
    pub fn resolve_env<F>(
        literal: &BTreeMap<String, String>,
        passthrough: &[String],
        lookup: F,
    ) -> BTreeMap<String, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env = BTreeMap::new();
        for name in INHERITED_ENV {
            if let Some(value) = lookup(name) {
                env.insert(name.to_string(), value);
            }
        }
        for (name, value) in literal {
            env.insert(name.clone(), value.clone());
        }
        for name in passthrough {
            if let Some(value) = lookup(name) {
                env.insert(name.clone(), value);
            }
        }
        env
    }

    /// Command line for logs and CLI output.
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Opens a fresh MCP stdio session per call.
#[derive(Debug, Clone)]
pub struct McpConnector {
    spec: LaunchSpec,
}

impl McpConnector {
    pub fn new(spec: LaunchSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &LaunchSpec {
        &self.spec
    }
}

#[async_trait]
impl SessionConnector for McpConnector {
    async fn open(&self) -> Result<Box<dyn BackendSession>, GatewayError> {
        let session = McpSession::spawn(&self.spec)?;
        Ok(Box::new(session))
    }

    fn describe(&self) -> String {
        self.spec.display_command()
    }
}

/// A live MCP session with one backend process.
pub struct McpSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    server: Option<ServerInfo>,
}

impl McpSession {
    /// Start the backend process. No protocol traffic happens yet.
    pub fn spawn(spec: &LaunchSpec) -> Result<Self, GatewayError> {
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .env_clear()
            .envs(&spec.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                GatewayError::Connectivity(format!("failed to start '{}': {}", spec.program, e))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GatewayError::Connectivity("backend stdin not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GatewayError::Connectivity("backend stdout not captured".into()))?;

        tracing::debug!(command = %spec.display_command(), pid = ?child.id(), "Spawned backend process");

        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout).lines(),
            next_id: 0,
            server: None,
        })
    }

    async fn send(&mut self, request: &JsonRpcRequest<'_>) -> Result<(), GatewayError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| GatewayError::Connectivity("session already closed".into()))?;
        let mut line =
            serde_json::to_string(request).map_err(|e| GatewayError::Protocol(e.to_string()))?;
        line.push('\n');
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Send a request and wait for the response with the same id,
    /// skipping backend notifications and non-JSON output.
    async fn request(&mut self, method: &str, params: Value) -> Result<Value, GatewayError> {
        self.next_id += 1;
        let id = self.next_id;
        self.send(&JsonRpcRequest::call(id, method, params)).await?;

        loop {
            let line = self.stdout.next_line().await?.ok_or_else(|| {
                GatewayError::Connectivity(format!(
                    "backend closed its output while awaiting '{}'",
                    method
                ))
            })?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let message: JsonRpcMessage = match serde_json::from_str(line) {
                Ok(m) => m,
                Err(_) => {
                    tracing::trace!(method, "Skipping non-JSON backend output");
                    continue;
                }
            };
            if !message.answers(id) {
                continue;
            }

            if let Some(error) = message.error {
                return Err(rpc_failure(method, error));
            }
            return Ok(message.result.unwrap_or(Value::Null));
        }
    }
}

fn rpc_failure(method: &str, error: JsonRpcError) -> GatewayError {
    GatewayError::Protocol(format!(
        "'{}' failed with code {}: {}",
        method, error.code, error.message
    ))
}

fn decode<T: serde::de::DeserializeOwned>(method: &str, value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value)
        .map_err(|e| GatewayError::Protocol(format!("malformed '{}' result: {}", method, e)))
}

#[async_trait]
impl BackendSession for McpSession {
    async fn initialize(&mut self) -> Result<(), GatewayError> {
        let params = serde_json::to_value(InitializeParams::default())
            .map_err(|e| GatewayError::Protocol(e.to_string()))?;
        let result: InitializeResult = decode("initialize", self.request("initialize", params).await?)?;

        tracing::debug!(
            protocol_version = %result.protocol_version,
            server = ?result.server_info.as_ref().map(|s| s.name.as_str()),
            "Backend handshake complete"
        );
        self.server = result.server_info;

        self.send(&JsonRpcRequest::notification("notifications/initialized"))
            .await
    }

    async fn list_operations(&mut self) -> Result<Vec<String>, GatewayError> {
        let mut names = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();

        for _ in 0..MAX_TOOL_PAGES {
            let params = match &cursor {
                Some(c) => json!({ "cursor": c }),
                None => json!({}),
            };
            let page: ToolsListResult = decode("tools/list", self.request("tools/list", params).await?)?;
            names.extend(page.tools.into_iter().map(|t| t.name));

            match page.next_cursor {
                Some(next) if !next.is_empty() => {
                    if !seen.insert(next.clone()) {
                        return Err(GatewayError::Protocol(format!(
                            "'tools/list' repeated cursor '{}'",
                            next
                        )));
                    }
                    cursor = Some(next);
                }
                _ => return Ok(names),
            }
        }

        Err(GatewayError::Protocol(format!(
            "'tools/list' returned more than {} pages",
            MAX_TOOL_PAGES
        )))
    }

    async fn invoke(&mut self, operation: &str, arguments: Value) -> Result<Vec<Row>, GatewayError> {
        let params = json!({ "name": operation, "arguments": arguments });
        let value = self
            .request("tools/call", params)
            .await
            .map_err(|e| match e {
                GatewayError::Protocol(message) => GatewayError::Invocation {
                    operation: operation.to_string(),
                    message,
                },
                other => other,
            })?;
        let result: ToolCallResult = decode("tools/call", value)?;

        if result.is_error.unwrap_or(false) {
            return Err(GatewayError::Invocation {
                operation: operation.to_string(),
                message: result.text(),
            });
        }
        Ok(result.into_rows())
    }

    async fn close(&mut self) {
        // EOF on stdin asks a well-behaved server to exit
        self.stdin.take();

        match tokio::time::timeout(SHUTDOWN_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => tracing::debug!(%status, "Backend process exited"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed waiting for backend process"),
            Err(_) => {
                tracing::debug!("Backend process did not exit in time, killing");
                if let Err(e) = self.child.kill().await {
                    tracing::warn!(error = %e, "Failed to kill backend process");
                }
            }
        }
    }

    fn server_name(&self) -> Option<&str> {
        self.server.as_ref().map(|s| s.name.as_str())
    }
}
