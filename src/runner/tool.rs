use async_trait::async_trait;
#[cfg(unix)]
use nix::sys::signal::{Signal, killpg};
#[cfg(unix)]
use nix::unistd::Pid;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tokio::time::{Duration, Instant, sleep_until};

use crate::core::constants::tool;
use crate::core::error::{Result, VitalsUpError};
use crate::reporting::logging;

/// One execution of the testing tool for a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Folder the tool is told to write into
    pub output_dir: PathBuf,
}

impl ToolInvocation {
    /// Build an invocation from an argument template.
    ///
    /// `{url}` and `{output}` are replaced wherever they appear in an
    /// argument, so `--outputFolder={output}` works as well.
    pub fn from_template(program: &str, template: &[String], url: &str, output_dir: &Path) -> Self {
        let output = output_dir.to_string_lossy();
        let args = template
            .iter()
            .map(|arg| {
                arg.replace(tool::URL_PLACEHOLDER, url)
                    .replace(tool::OUTPUT_PLACEHOLDER, &output)
            })
            .collect();

        Self {
            program: program.to_string(),
            args,
            output_dir: output_dir.to_path_buf(),
        }
    }
}

/// Result of a successful tool run
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub elapsed: Duration,
    /// Captured stderr, truncated
    pub stderr: String,
}

/// Sending half of a cancellation signal
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Receiving half of a cancellation signal, cheap to clone
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

/// Create a connected cancellation handle and signal
pub fn cancellation() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CancelSignal {
    /// A signal that is never triggered
    pub fn never() -> Self {
        let (_, signal) = cancellation();
        signal
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested. Pends forever when the
    /// handle was dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// A browser performance testing tool
#[async_trait]
pub trait PerfTool: Send + Sync {
    /// Run the tool once and wait for it to exit
    async fn run(&self, invocation: &ToolInvocation, cancel: &CancelSignal) -> Result<ToolOutcome>;
}

/// Runs the tool as a child process with a timeout
#[derive(Debug, Clone)]
pub struct CommandTool {
    timeout: Duration,
}

impl CommandTool {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for CommandTool {
    fn default() -> Self {
        Self::new(Duration::from_secs(tool::DEFAULT_TIMEOUT_SECONDS))
    }
}

#[async_trait]
impl PerfTool for CommandTool {
    async fn run(&self, invocation: &ToolInvocation, cancel: &CancelSignal) -> Result<ToolOutcome> {
        let command_line = invocation.program.clone();
        if cancel.is_cancelled() {
            return Err(VitalsUpError::Cancelled(command_line));
        }

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Browsers and drivers started by the tool join its group
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command
            .spawn()
            .map_err(|source| VitalsUpError::ToolSpawn {
                command: command_line.clone(),
                source,
            })?;
        let pid = child.id();
        let mut stderr = StderrCapture::new(child.stderr.take());
        let started = Instant::now();
        let deadline = started + self.timeout;

        // Stderr is read inside the race so a full pipe cannot stall the tool
        let status = loop {
            tokio::select! {
                read = stderr.read_chunk() => stderr.accept(read),
                status = child.wait() => break status?,
                _ = sleep_until(deadline) => {
                    terminate(&mut child, pid).await;
                    return Err(VitalsUpError::ToolTimedOut {
                        command: command_line,
                        timeout: self.timeout,
                    });
                }
                _ = cancel.cancelled() => {
                    terminate(&mut child, pid).await;
                    return Err(VitalsUpError::Cancelled(command_line));
                }
            }
        };

        // Finish reading what the tool wrote, but not past the deadline
        let grace = Duration::from_millis(tool::STDERR_DRAIN_GRACE_MILLIS);
        let drain_deadline = (Instant::now() + grace).min(deadline);
        while stderr.is_open() {
            tokio::select! {
                read = stderr.read_chunk() => stderr.accept(read),
                _ = sleep_until(drain_deadline) => {
                    logging::log_warning(&format!(
                        "'{command_line}' exited but left processes holding stderr open, stopping them"
                    ));
                    terminate(&mut child, pid).await;
                    break;
                }
                _ = cancel.cancelled() => {
                    terminate(&mut child, pid).await;
                    return Err(VitalsUpError::Cancelled(command_line));
                }
            }
        }
        let stderr = stderr.into_text();

        if status.success() {
            Ok(ToolOutcome {
                elapsed: started.elapsed(),
                stderr,
            })
        } else {
            Err(VitalsUpError::ToolFailed {
                command: command_line,
                code: status.code(),
                stderr,
            })
        }
    }
}

/// Kill the tool together with everything in its process group
async fn terminate(child: &mut Child, pid: Option<u32>) {
    kill_group(pid);
    // The child may already have exited between the race and the kill
    let _ = child.kill().await;
}

#[cfg(unix)]
fn kill_group(pid: Option<u32>) {
    // The group id is the tool's pid; the group may already be empty
    if let Some(pgid) = pid.and_then(|pid| i32::try_from(pid).ok()) {
        let _ = killpg(Pid::from_raw(pgid), Signal::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) {}

/// Reads a child's stderr, keeping at most `STDERR_CAPTURE_LIMIT` bytes
struct StderrCapture<R> {
    reader: Option<R>,
    kept: Vec<u8>,
    chunk: [u8; 1024],
}

impl<R: AsyncRead + Unpin> StderrCapture<R> {
    fn new(reader: Option<R>) -> Self {
        Self {
            reader,
            kept: Vec::new(),
            chunk: [0; 1024],
        }
    }

    fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Pends forever once the stream is closed
    async fn read_chunk(&mut self) -> io::Result<usize> {
        match self.reader.as_mut() {
            Some(reader) => reader.read(&mut self.chunk).await,
            None => std::future::pending().await,
        }
    }

    fn accept(&mut self, read: io::Result<usize>) {
        match read {
            Ok(0) | Err(_) => self.reader = None,
            Ok(n) => {
                let room = tool::STDERR_CAPTURE_LIMIT.saturating_sub(self.kept.len());
                self.kept.extend_from_slice(&self.chunk[..n.min(room)]);
            }
        }
    }

    fn into_text(self) -> String {
        let mut text = String::from_utf8_lossy(&self.kept).into_owned();
        if text.len() > tool::STDERR_CAPTURE_LIMIT {
            let mut cut = tool::STDERR_CAPTURE_LIMIT;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use tokio::time::sleep;

    fn shell(script: &str) -> ToolInvocation {
        ToolInvocation {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            output_dir: PathBuf::from("/tmp/unused"),
        }
    }

    #[test]
    fn test_from_template__substitutes_placeholders() {
        let template: Vec<String> = ["{url}", "--outputFolder={output}", "-n", "3"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let invocation = ToolInvocation::from_template(
            "sitespeed.io",
            &template,
            "https://shop.example/",
            Path::new("/runs/.staging/home"),
        );

        assert_eq!(invocation.program, "sitespeed.io");
        assert_eq!(
            invocation.args,
            vec![
                "https://shop.example/",
                "--outputFolder=/runs/.staging/home",
                "-n",
                "3"
            ]
        );
        assert_eq!(invocation.output_dir, PathBuf::from("/runs/.staging/home"));
    }

    #[test]
    fn test_cancel_signal_state() {
        let (handle, signal) = cancellation();
        assert!(!signal.is_cancelled());
        handle.cancel();
        assert!(signal.is_cancelled());
        assert!(signal.clone().is_cancelled());
        assert!(!CancelSignal::never().is_cancelled());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run__success() {
        let tool = CommandTool::new(Duration::from_secs(10));
        let outcome = tool
            .run(&shell("echo warming up >&2; exit 0"), &CancelSignal::never())
            .await
            .unwrap();
        assert!(outcome.stderr.contains("warming up"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run__non_zero_exit() {
        let tool = CommandTool::new(Duration::from_secs(10));
        let err = tool
            .run(&shell("echo boom >&2; exit 3"), &CancelSignal::never())
            .await
            .unwrap_err();

        match err {
            VitalsUpError::ToolFailed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert!(stderr.contains("boom"));
            }
            other => panic!("Expected ToolFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run__timeout_kills_child() {
        let tool = CommandTool::new(Duration::from_millis(200));
        let started = std::time::Instant::now();
        let err = tool
            .run(&shell("sleep 30"), &CancelSignal::never())
            .await
            .unwrap_err();

        assert!(matches!(err, VitalsUpError::ToolTimedOut { .. }));
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run__cancellation_kills_child() {
        let tool = CommandTool::new(Duration::from_secs(60));
        let (handle, signal) = cancellation();

        let canceller = tokio::spawn(async move {
            sleep(Duration::from_millis(100)).await;
            handle.cancel();
        });

        let err = tool.run(&shell("sleep 30"), &signal).await.unwrap_err();
        assert!(matches!(err, VitalsUpError::Cancelled(_)));
        canceller.await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run__exited_tool_does_not_wait_for_stray_children() {
        let tool = CommandTool::new(Duration::from_secs(1));
        let started = std::time::Instant::now();
        let outcome = tool
            .run(&shell("sleep 8 & exit 0"), &CancelSignal::never())
            .await;

        assert!(outcome.is_ok(), "{outcome:?}");
        assert!(
            started.elapsed() < std::time::Duration::from_secs(3),
            "took {:?}",
            started.elapsed()
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run__timeout_kills_process_group()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let marker = dir.path().join("late");
        let script = format!("(sleep 1; touch '{}') & sleep 30", marker.display());

        let tool = CommandTool::new(Duration::from_millis(200));
        let err = tool
            .run(&shell(&script), &CancelSignal::never())
            .await
            .unwrap_err();
        assert!(matches!(err, VitalsUpError::ToolTimedOut { .. }));

        sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "background child outlived the tool");
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run__cancel_while_stray_child_holds_stderr() {
        let tool = CommandTool::new(Duration::from_secs(60));
        let (handle, signal) = cancellation();

        let canceller = tokio::spawn(async move {
            sleep(Duration::from_millis(100)).await;
            handle.cancel();
        });

        let started = std::time::Instant::now();
        let err = tool
            .run(&shell("sleep 8 & exit 0"), &signal)
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert!(matches!(err, VitalsUpError::Cancelled(_)));
        assert!(started.elapsed() < std::time::Duration::from_secs(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run__stderr_is_bounded() {
        let tool = CommandTool::new(Duration::from_secs(10));
        let outcome = tool
            .run(
                &shell("i=0; while [ $i -lt 200 ]; do printf '%050d\\n' 0 >&2; i=$((i+1)); done"),
                &CancelSignal::never(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.stderr.len(), tool::STDERR_CAPTURE_LIMIT);
    }

    #[tokio::test]
    async fn test_stderr_capture__keeps_limit_on_char_boundary() {
        let text = "é".repeat(tool::STDERR_CAPTURE_LIMIT);
        let mut capture = StderrCapture::new(Some(text.as_bytes()));
        while capture.is_open() {
            let read = capture.read_chunk().await;
            capture.accept(read);
        }

        let kept = capture.into_text();
        assert!(kept.len() <= tool::STDERR_CAPTURE_LIMIT);
        assert!(kept.chars().all(|c| c == 'é'));
    }

    #[tokio::test]
    async fn test_run__already_cancelled_does_not_spawn() {
        let tool = CommandTool::default();
        let (handle, signal) = cancellation();
        handle.cancel();

        let invocation = ToolInvocation {
            program: "definitely-not-a-real-program-12345".to_string(),
            args: vec![],
            output_dir: PathBuf::from("/tmp/unused"),
        };
        let err = tool.run(&invocation, &signal).await.unwrap_err();
        assert!(matches!(err, VitalsUpError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_run__missing_program() {
        let tool = CommandTool::default();
        let invocation = ToolInvocation {
            program: "definitely-not-a-real-program-12345".to_string(),
            args: vec![],
            output_dir: PathBuf::from("/tmp/unused"),
        };

        let err = tool
            .run(&invocation, &CancelSignal::never())
            .await
            .unwrap_err();
        assert!(matches!(err, VitalsUpError::ToolSpawn { .. }));
        assert!(format!("{err}").contains("definitely-not-a-real-program-12345"));
    }
}
