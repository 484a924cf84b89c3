use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DumpSource {
    HdmiControl,
    Display,
    MediaSession,
    WindowFocus,
    NetDev,
}

impl DumpSource {
    pub fn shell_args(self) -> &'static [&'static str] {
        match self {
            Self::HdmiControl => &["dumpsys", "hdmi_control"],
            Self::Display => &["dumpsys", "display"],
            Self::MediaSession => &["dumpsys", "media_session"],
            Self::WindowFocus => &["dumpsys", "window", "windows"],
            Self::NetDev => &["cat", "/proc/net/dev"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::HdmiControl => "hdmi_control",
            Self::Display => "display",
            Self::MediaSession => "media_session",
            Self::WindowFocus => "window_focus",
            Self::NetDev => "net_dev",
        }
    }
}

pub trait DeviceClient {
    fn connect(&self) -> Result<(), DeviceClientError>;
    fn link_state(&self) -> Result<String, DeviceClientError>;
    fn dump(&self, source: DumpSource) -> Result<String, DeviceClientError>;
}

impl<T: DeviceClient + ?Sized> DeviceClient for Box<T> {
    fn connect(&self) -> Result<(), DeviceClientError> {
        (**self).connect()
    }

    fn link_state(&self) -> Result<String, DeviceClientError> {
        (**self).link_state()
    }

    fn dump(&self, source: DumpSource) -> Result<String, DeviceClientError> {
        (**self).dump(source)
    }
}

#[derive(Debug, Error)]
pub enum DeviceClientError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("device command io failed: {0}")]
    Io(#[from] io::Error),
    #[error("`{command}` timed out after {timeout_ms} ms")]
    TimedOut { command: String, timeout_ms: u128 },
    #[error("`{command}` exited with {status}")]
    CommandFailed { command: String, status: String },
    #[error("adb connect failed: {0}")]
    ConnectFailed(String),
    #[error("failed to parse debug script: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct AdbClient {
    adb_path: String,
    serial: String,
    timeout: Duration,
}

impl AdbClient {
    pub fn new(adb_path: &str, host: &str, port: u16, timeout: Duration) -> Self {
        Self {
            adb_path: adb_path.to_string(),
            serial: format!("{host}:{port}"),
            timeout,
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    fn run_on_device(&self, args: &[&str]) -> Result<String, DeviceClientError> {
        let mut full_args = vec!["-s", self.serial.as_str()];
        full_args.extend_from_slice(args);
        run_command(&self.adb_path, &full_args, self.timeout)
    }
}

impl DeviceClient for AdbClient {
    fn connect(&self) -> Result<(), DeviceClientError> {
        let output = run_command(
            &self.adb_path,
            &["connect", self.serial.as_str()],
            self.timeout,
        )?;
        let normalized = output.to_ascii_lowercase();
        // adb exits 0 even when the connection attempt fails.
        if normalized.contains("cannot") || normalized.contains("failed") {
            return Err(DeviceClientError::ConnectFailed(output.trim().to_string()));
        }
        Ok(())
    }

    fn link_state(&self) -> Result<String, DeviceClientError> {
        self.run_on_device(&["get-state"])
    }

    fn dump(&self, source: DumpSource) -> Result<String, DeviceClientError> {
        let mut args = vec!["shell"];
        args.extend_from_slice(source.shell_args());
        self.run_on_device(&args)
    }
}

pub fn run_command(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, DeviceClientError> {
    let command = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| DeviceClientError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
    // Drained on a separate thread so large dumps cannot fill the pipe and stall the child.
    let reader = thread::spawn(move || {
        let mut output = String::new();
        stdout.read_to_string(&mut output).map(|_| output)
    });

    // Timeouts too large to represent as an Instant wait for the child indefinitely.
    let deadline = Instant::now().checked_add(timeout);
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(DeviceClientError::TimedOut {
                command,
                timeout_ms: timeout.as_millis(),
            });
        }
        thread::sleep(WAIT_POLL_INTERVAL);
    };

    let output = reader
        .join()
        .map_err(|_| io::Error::other("stdout reader thread panicked"))??;

    if !status.success() {
        return Err(DeviceClientError::CommandFailed {
            command,
            status: status.to_string(),
        });
    }

    Ok(output)
}
