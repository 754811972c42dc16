use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// How long to let the pipe readers catch up after a timeout kill.
const DRAIN_GRACE: Duration = Duration::from_millis(200);
const READ_CHUNK: usize = 8192;

#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    /// Output captured up to the moment the process was killed.
    #[error("Process did not finish within {}s and was terminated", timeout.as_secs_f64())]
    Timeout {
        timeout: Duration,
        stdout: String,
        stderr: String,
    },
    #[error("I/O error while waiting for process: {0}")]
    Io(#[from] io::Error),
}

/// A pipe drained on its own thread into a buffer that can be read before the
/// thread finishes.
struct PipeReader {
    buffer: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<io::Result<()>>,
}

impl PipeReader {
    fn spawn<R: Read + Send + 'static>(mut pipe: R) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);
        let handle = thread::spawn(move || {
            let mut chunk = [0u8; READ_CHUNK];
            loop {
                let read = match pipe.read(&mut chunk) {
                    Ok(0) => return Ok(()),
                    Ok(read) => read,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                match sink.lock() {
                    Ok(mut buffer) => buffer.extend_from_slice(&chunk[..read]),
                    Err(_) => return Err(io::Error::other("output buffer lock poisoned")),
                }
            }
        });
        Self { buffer, handle }
    }

    fn contents(&self) -> String {
        Self::contents_of(&self.buffer)
    }

    fn contents_of(buffer: &Mutex<Vec<u8>>) -> String {
        match buffer.lock() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => String::new(),
        }
    }

    /// Waits for end of stream and returns everything read.
    fn finish(self) -> String {
        let Self { buffer, handle } = self;
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to read process output: {}", e),
            Err(_) => warn!("Output reader thread panicked."),
        }
        Self::contents_of(&buffer)
    }

    /// Returns what has been read so far without waiting for end of stream.
    /// Processes outside the killed group may still hold the pipe; the reader
    /// thread is left to exit once they close it.
    fn snapshot(self, grace: Duration) -> String {
        let deadline = Instant::now() + grace;
        while !self.handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        self.contents()
    }
}

fn finish(reader: Option<PipeReader>) -> String {
    reader.map(PipeReader::finish).unwrap_or_default()
}

fn snapshot(reader: Option<PipeReader>) -> String {
    reader
        .map(|reader| reader.snapshot(DRAIN_GRACE))
        .unwrap_or_default()
}

fn wait_with_deadline(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

/// Starts the child as the leader of a new process group so a timeout can take
/// its workers down with it.
#[cfg(unix)]
fn isolate(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn isolate(_command: &mut Command) {}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    // A negative pid addresses the whole process group led by the child.
    let group = format!("-{}", child.id());
    match Command::new("kill")
        .args(["-KILL", "--", &group])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) if status.success() => {}
        Ok(status) => debug!("Killing process group {} exited with {}", group, status),
        Err(e) => debug!("Could not signal process group {}: {}", group, e),
    }
    if let Err(e) = child.kill() {
        debug!("Kill after timeout failed (process may have exited): {}", e);
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("Kill after timeout failed (process may have exited): {}", e);
    }
}

/// Runs `command` to completion with stdout and stderr captured in full.
///
/// Stdin is closed. With a `timeout`, the child and every process in its group
/// are killed once it expires, and [`ProcessError::Timeout`] is returned with
/// the output captured until then.
pub fn run_captured(command: &mut Command, timeout: Option<Duration>) -> Result<ProcessOutput, ProcessError> {
    let program = command.get_program().to_string_lossy().into_owned();
    debug!("Spawning {:?}", command);

    if timeout.is_some() {
        isolate(command);
    }
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

    let stdout_reader = child.stdout.take().map(PipeReader::spawn);
    let stderr_reader = child.stderr.take().map(PipeReader::spawn);

    let status = match timeout {
        None => Some(child.wait()?),
        Some(limit) => wait_with_deadline(&mut child, limit)?,
    };

    let Some(status) = status else {
        warn!("'{}' exceeded its time limit; terminating.", program);
        terminate(&mut child);
        child.wait()?;
        return Err(ProcessError::Timeout {
            timeout: timeout.unwrap_or_default(),
            stdout: snapshot(stdout_reader),
            stderr: snapshot(stderr_reader),
        });
    };

    Ok(ProcessOutput {
        status,
        stdout: finish(stdout_reader),
        stderr: finish(stderr_reader),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_both_streams_and_exit_status() {
        let output = run_captured(
            Command::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]),
            None,
        )
        .unwrap();

        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let result = run_captured(&mut Command::new("/nonexistent/predictor-binary"), None);
        assert!(matches!(result, Err(ProcessError::Spawn { .. })));
    }

    #[test]
    fn timeout_terminates_the_process() {
        let started = Instant::now();
        let result = run_captured(
            Command::new("sh").args(["-c", "echo starting >&2; exec sleep 10"]),
            Some(Duration::from_millis(200)),
        );

        match result {
            Err(ProcessError::Timeout { stderr, .. }) => assert_eq!(stderr, "starting\n"),
            other => panic!("expected timeout, got {:?}", other),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn fast_process_finishes_within_timeout() {
        let output = run_captured(
            Command::new("sh").args(["-c", "echo done"]),
            Some(Duration::from_secs(10)),
        )
        .unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, "done\n");
    }

    #[test]
    fn timeout_does_not_wait_for_grandchildren() {
        let started = Instant::now();
        let result = run_captured(
            Command::new("sh").args(["-c", "echo partial; echo working >&2; sleep 4; echo done"]),
            Some(Duration::from_millis(200)),
        );

        match result {
            Err(ProcessError::Timeout { stdout, stderr, .. }) => {
                assert_eq!(stdout, "partial\n");
                assert_eq!(stderr, "working\n");
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn timeout_kills_the_whole_process_group() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("survivor");
        let script = format!("(sleep 1; touch '{}') & wait", marker.display());

        let result = run_captured(
            Command::new("sh").args(["-c", &script]),
            Some(Duration::from_millis(200)),
        );

        assert!(matches!(result, Err(ProcessError::Timeout { .. })));
        thread::sleep(Duration::from_millis(1500));
        assert!(!marker.exists());
    }
}
