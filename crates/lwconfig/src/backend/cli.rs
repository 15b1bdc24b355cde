//! Real lwconfig backend using the `lwconfig` command.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{CommandConfig, command_line};
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running command is polled while a timeout is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Backend that executes the real `lwconfig` program.
#[derive(Debug, Clone)]
pub struct CliBackend {
    config: CommandConfig,
}

/// Captured result of one command.
struct Captured {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

impl CliBackend {
    /// Create a backend from a command configuration.
    pub fn new(config: CommandConfig) -> Self {
        Self { config }
    }

    /// The command configuration in use.
    pub fn config(&self) -> &CommandConfig {
        &self.config
    }

    /// Run the program with `args`, honoring the configured timeout.
    fn run(&self, args: &[&str]) -> Result<Captured> {
        let command = command_line(&self.config.program, args.iter().copied());
        log::debug!("running {command}");

        let mut child = Command::new(&self.config.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::NotFound {
                    program: self.config.program.clone(),
                },
                _ => Error::Io(e),
            })?;

        // Drain both pipes on their own threads so a chatty child never
        // blocks on a full pipe while we wait for it.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_with_timeout(&mut child, self.config.timeout)?;

        let stdout = join(stdout)?;
        let stderr = join(stderr)?;

        let Some(status) = status else {
            return Err(Error::Timeout {
                command,
                timeout: self.config.timeout.unwrap_or_default(),
            });
        };

        log::debug!("{command} exited with {status} ({} bytes of output)", stdout.len());
        Ok(Captured {
            status,
            stdout,
            stderr,
        })
    }

    /// Run the program and fail on a non-zero exit.
    fn run_checked(&self, args: &[&str]) -> Result<String> {
        let captured = self.run(args)?;
        if !captured.status.success() {
            let command = command_line(&self.config.program, args.iter().copied());
            return Err(Error::from_output(&command, captured.status, &captured.stderr));
        }
        Ok(captured.stdout)
    }
}

impl Backend for CliBackend {
    fn program(&self) -> &str {
        &self.config.program
    }

    fn dump_command(&self) -> String {
        self.config.dump_command()
    }

    fn is_available(&self) -> bool {
        which::which(&self.config.program).is_ok()
    }

    fn dump(&self) -> Result<String> {
        let args: Vec<&str> = self.config.dump_args.iter().map(String::as_str).collect();
        self.run_checked(&args)
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        self.run_checked(&[name, value])?;
        Ok(())
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<io::Result<String>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    })
}

fn join(handle: thread::JoinHandle<io::Result<String>>) -> Result<String> {
    handle
        .join()
        .map_err(|_| Error::Other("output reader thread panicked".to_string()))?
        .map_err(Error::Io)
}

/// Wait for the child, killing it once `timeout` elapses.
///
/// Returns `None` if the child was killed.
fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> Result<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return Ok(Some(child.wait()?));
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            // The child may exit between try_wait and kill.
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
