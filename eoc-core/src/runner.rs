//! Spawning external tools.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::process::Command;
use tracing::{debug, error};

use crate::error::CoreError;
use crate::flags::strip_empty;
use crate::progress::ProgressSession;

/// Interpreter forced on Windows so that arguments survive escaping.
pub const WINDOWS_SHELL: &str = "C:\\Windows\\SysWOW64\\WindowsPowerShell\\v1.0\\powershell.exe";

/// One external process call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Directory to watch for progress; `None` disables the overlay.
    pub target: Option<PathBuf>,
    pub phase: String,
    pub batch: bool,
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, args: impl IntoIterator<Item = String>) -> Self {
        let args = strip_empty(args);
        let phase = args.first().cloned().unwrap_or_default();
        Self {
            program: program.into(),
            args,
            cwd: None,
            target: None,
            phase,
            batch: true,
            timeout: None,
        }
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn watching(mut self, target: impl Into<PathBuf>, batch: bool) -> Self {
        self.target = Some(target.into());
        self.batch = batch;
        self
    }

    pub fn phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The command line as a human would type it.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Outcome of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub exit_code: i32,
    pub args: Vec<String>,
}

/// Executes invocations; the seam that tests replace.
pub trait Runner: Send + Sync {
    fn run(&self, invocation: Invocation) -> BoxFuture<'_, Result<InvocationResult, CoreError>>;
}

/// Program and arguments actually handed to the OS.
///
/// On Windows the call goes through PowerShell with every token quoted.
pub fn shell_wrap(program: &str, args: &[String], windows: bool) -> (String, Vec<String>) {
    if !windows {
        return (program.to_string(), args.to_vec());
    }
    let mut wrapped = vec!["-Command".to_string(), "&".to_string(), quote(program)];
    wrapped.extend(args.iter().map(|arg| quote(arg)));
    (WINDOWS_SHELL.to_string(), wrapped)
}

fn quote(token: &str) -> String {
    format!("\"{token}\"")
}

/// Runs real child processes with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    async fn spawn(&self, invocation: Invocation) -> Result<InvocationResult, CoreError> {
        let line = invocation.command_line();
        debug!("+ {line}");
        let (program, args) = shell_wrap(
            &invocation.program.display().to_string(),
            &invocation.args,
            cfg!(windows),
        );
        let mut command = Command::new(&program);
        command
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }
        let mut child = command.spawn().map_err(|source| CoreError::Spawn {
            program: program.clone(),
            source,
        })?;

        let session = match (&invocation.target, invocation.batch) {
            (Some(target), false) => Some(ProgressSession::start(&invocation.phase, target)?),
            _ => None,
        };

        let status = match invocation.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    drop(session);
                    let _ = child.kill().await;
                    return Err(CoreError::Timeout {
                        command: line,
                        seconds: limit.as_secs(),
                    });
                }
            },
            None => child.wait().await,
        };
        if let Some(session) = session {
            session.stop();
        }
        let status = status?;

        if !status.success() {
            let code = status.code().unwrap_or(1);
            error!("The command \"{line}\" exited with #{code} code");
            return Err(CoreError::ProcessFailed {
                command: line,
                code,
            });
        }
        Ok(InvocationResult {
            exit_code: 0,
            args: invocation.args,
        })
    }
}

impl Runner for ProcessRunner {
    fn run(&self, invocation: Invocation) -> BoxFuture<'_, Result<InvocationResult, CoreError>> {
        Box::pin(self.spawn(invocation))
    }
}
