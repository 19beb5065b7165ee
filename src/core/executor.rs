//! Running the analysis tool.
//!
//! Provides a trait-based abstraction so the job runner can drive the real
//! external tool or a stand-in. The external implementation spawns the
//! configured command with the parameter file, streams its output line by
//! line and kills it when shutdown is signaled.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::{mpsc, watch};
use tracing::debug;

use super::cli_check::{CommandResolution, resolve_tool_command};
use super::config::ToolProperties;
use crate::fs::ToolSettings;

/// Environment variable the JVM reads extra options from.
pub const JAVA_TOOL_OPTIONS: &str = "JAVA_TOOL_OPTIONS";

/// Output line from the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    /// Line from stdout.
    Stdout(String),
    /// Line from stderr.
    Stderr(String),
}

/// Something that can run an analysis from a parameter file.
#[async_trait]
pub trait AnalysisTool: Send + Sync {
    /// Runs the tool on `param_file`, streaming its output.
    ///
    /// Returns the tool's exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool cannot be started or shutdown is signaled.
    async fn run(
        &self,
        param_file: &Path,
        properties: &ToolProperties,
        output_tx: mpsc::Sender<ToolOutput>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Result<i32>;

    /// Returns the display name for this tool.
    fn name(&self) -> &str;
}

/// The external analysis tool, launched as a child process.
///
/// Executes: `<command> <args...> -param_file <param_file>`
#[derive(Debug, Clone)]
pub struct ExternalTool {
    settings: ToolSettings,
}

impl ExternalTool {
    #[must_use]
    pub fn new(settings: ToolSettings) -> Self {
        Self { settings }
    }

    /// Arguments passed to the command.
    #[must_use]
    pub fn arguments(&self, param_file: &Path) -> Vec<String> {
        let mut args = self.settings.args.clone();
        args.push("-param_file".to_string());
        args.push(param_file.to_string_lossy().into_owned());
        args
    }
}

#[async_trait]
impl AnalysisTool for ExternalTool {
    async fn run(
        &self,
        param_file: &Path,
        properties: &ToolProperties,
        output_tx: mpsc::Sender<ToolOutput>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Result<i32> {
        let java_options =
            properties.java_options(std::env::var(JAVA_TOOL_OPTIONS).ok().as_deref());
        let process = spawn_tool_process(
            &self.settings.command,
            &self.arguments(param_file),
            &java_options,
        )?;
        run_process_with_output(&self.settings.command, process, output_tx, shutdown_rx).await
    }

    fn name(&self) -> &str {
        &self.settings.command
    }
}

/// A spawned tool process with captured stdout and stderr.
struct SpawnedProcess {
    child: Child,
    stdout: ChildStdout,
    stderr: ChildStderr,
}

/// Spawns the tool with stdout and stderr captured.
///
/// On Linux, configures the child to be killed when the parent dies via `PR_SET_PDEATHSIG`.
///
/// # Errors
///
/// Returns an error if the command cannot be resolved or if spawning fails.
fn spawn_tool_process(command: &str, args: &[String], java_options: &str) -> Result<SpawnedProcess> {
    let CommandResolution::PathExecutable(path) = resolve_tool_command(command) else {
        anyhow::bail!(
            "Tool command '{command}' not found. Ensure it is installed and available in PATH, \
            or set its full path in the tool settings."
        );
    };
    debug!("Launching {} {}", path.display(), args.join(" "));

    let mut cmd = Command::new(&path);
    cmd.args(args)
        .env(JAVA_TOOL_OPTIONS, java_options)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // On Linux, set up the child to be killed when the parent dies.
    #[cfg(target_os = "linux")]
    unsafe {
        cmd.pre_exec(|| {
            // PR_SET_PDEATHSIG = 1, SIGKILL = 9
            if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGKILL) == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to spawn {command}"))?;

    let stdout = child.stdout.take().context("Failed to capture stdout")?;
    let stderr = child.stderr.take().context("Failed to capture stderr")?;

    Ok(SpawnedProcess {
        child,
        stdout,
        stderr,
    })
}

/// Waits for the process while forwarding its output.
///
/// If shutdown is signaled, the child is killed and an error returned.
async fn run_process_with_output(
    command: &str,
    process: SpawnedProcess,
    output_tx: mpsc::Sender<ToolOutput>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<i32> {
    let SpawnedProcess {
        mut child,
        stdout,
        stderr,
    } = process;

    let stdout_handle = tokio::spawn(forward_lines(stdout, output_tx.clone(), ToolOutput::Stdout));
    let stderr_handle = tokio::spawn(forward_lines(stderr, output_tx, ToolOutput::Stderr));

    let status = tokio::select! {
        result = child.wait() => {
            result.with_context(|| format!("Failed to wait for {command}"))?
        }
        () = wait_for_shutdown(&mut shutdown_rx) => {
            let _ = child.kill().await;
            stdout_handle.abort();
            stderr_handle.abort();
            anyhow::bail!("Shutdown signaled - {command} process killed");
        }
    };

    // Wait for output readers to finish
    let _ = stdout_handle.await;
    let _ = stderr_handle.await;

    // Killed by a signal: report a plain failure.
    Ok(status.code().unwrap_or(1))
}

async fn forward_lines<R>(reader: R, tx: mpsc::Sender<ToolOutput>, wrap: fn(String) -> ToolOutput)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    // Keep draining to EOF; a closed pipe would kill the tool on its next write.
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                let _ = tx.send(wrap(line.to_string())).await;
            }
        }
    }
}

/// Waits for a shutdown signal on the watch channel.
///
/// Loops until the value becomes true; a closed channel means the job
/// finished normally and never resolves.
async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Prints tool output to this process's own stdout and stderr.
///
/// Runs until every sender is dropped.
pub async fn print_output(mut rx: mpsc::Receiver<ToolOutput>) {
    while let Some(output) = rx.recv().await {
        match output {
            ToolOutput::Stdout(line) => println!("{line}"),
            ToolOutput::Stderr(line) => eprintln!("{line}"),
        }
    }
}
