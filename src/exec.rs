//! External process execution.
//!
//! All git and tar invocations go through the [`Executor`] trait so that
//! source materialization can be exercised in tests without touching a real
//! repository.
use anyhow::{Context, Result, bail};
use std::io::Read as _;
use std::process::{Child, Command, Output, Stdio};
use std::thread::JoinHandle;

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, when the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// A program name plus its arguments.
pub type Invocation<'a> = (&'a str, &'a [&'a str]);

/// Abstraction over process execution.
///
/// [`SystemExecutor`] runs real commands; tests substitute a scripted mock.
pub trait Executor: std::fmt::Debug {
    /// Run a command and return its output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run `producer | consumer`, failing if either side exits non-zero.
    ///
    /// The returned result carries the consumer's output. When both sides
    /// fail, the consumer's failure is reported: a producer that dies early
    /// usually does so because the consumer stopped reading.
    ///
    /// # Errors
    ///
    /// Returns an error if either program cannot be spawned or exits non-zero.
    fn pipe(&self, producer: Invocation<'_>, consumer: Invocation<'_>) -> Result<ExecResult>;

    /// Check if a program is available on PATH.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

/// Turn a finished process into an [`ExecResult`], bailing on non-zero exit.
fn checked(result: ExecResult, label: &str) -> Result<ExecResult> {
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        );
    }
    Ok(result)
}

/// Read all of `child`'s stderr on a separate thread so that a chatty
/// producer cannot block on a full pipe while the consumer is still running.
fn drain_stderr(child: &mut Child) -> Option<JoinHandle<String>> {
    let mut pipe = child.stderr.take()?;
    Some(std::thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf).ok();
        String::from_utf8_lossy(&buf).into_owned()
    }))
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        checked(ExecResult::from(output), program)
    }

    fn pipe(&self, producer: Invocation<'_>, consumer: Invocation<'_>) -> Result<ExecResult> {
        let (first_program, first_args) = producer;
        let (second_program, second_args) = consumer;

        let mut first = Command::new(first_program)
            .args(first_args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to execute: {first_program}"))?;
        let first_stderr = drain_stderr(&mut first);
        let stdout = first
            .stdout
            .take()
            .with_context(|| format!("no stdout captured from {first_program}"))?;

        let second = match Command::new(second_program)
            .args(second_args)
            .stdin(Stdio::from(stdout))
            .output()
        {
            Ok(output) => output,
            Err(err) => {
                first.kill().ok();
                first.wait().ok();
                return Err(err).with_context(|| format!("failed to execute: {second_program}"));
            }
        };

        let status = first
            .wait()
            .with_context(|| format!("waiting for {first_program}"))?;
        let stderr = first_stderr
            .map(|handle| handle.join().unwrap_or_default())
            .unwrap_or_default();

        let result = checked(ExecResult::from(second), second_program)?;
        checked(
            ExecResult {
                stdout: String::new(),
                stderr,
                success: status.success(),
                code: status.code(),
            },
            first_program,
        )?;
        Ok(result)
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
