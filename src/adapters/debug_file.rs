use std::fs;
use std::io;
use std::sync::Mutex;

use serde::Deserialize;

use crate::adapters::adb::{DeviceClient, DeviceClientError, DumpSource};

#[derive(Debug, Clone, Deserialize)]
struct ScriptFile {
    #[serde(default = "default_loop")]
    loop_forever: bool,
    link: Vec<ScriptEvent>,
    #[serde(default)]
    hdmi_control: Vec<ScriptEvent>,
    #[serde(default)]
    display: Vec<ScriptEvent>,
    #[serde(default)]
    media_session: Vec<ScriptEvent>,
    #[serde(default)]
    window_focus: Vec<ScriptEvent>,
    #[serde(default)]
    net_dev: Vec<ScriptEvent>,
}

impl ScriptFile {
    fn events(&self, stream: Stream) -> &[ScriptEvent] {
        match stream {
            Stream::Link => &self.link,
            Stream::Dump(DumpSource::HdmiControl) => &self.hdmi_control,
            Stream::Dump(DumpSource::Display) => &self.display,
            Stream::Dump(DumpSource::MediaSession) => &self.media_session,
            Stream::Dump(DumpSource::WindowFocus) => &self.window_focus,
            Stream::Dump(DumpSource::NetDev) => &self.net_dev,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ScriptEvent {
    ok: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Link,
    Dump(DumpSource),
}

impl Stream {
    fn index(self) -> usize {
        match self {
            Self::Link => 0,
            Self::Dump(DumpSource::HdmiControl) => 1,
            Self::Dump(DumpSource::Display) => 2,
            Self::Dump(DumpSource::MediaSession) => 3,
            Self::Dump(DumpSource::WindowFocus) => 4,
            Self::Dump(DumpSource::NetDev) => 5,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Dump(source) => source.name(),
        }
    }
}

const STREAM_COUNT: usize = 6;

#[derive(Debug)]
pub struct ScriptedDeviceClient {
    script: ScriptFile,
    cursors: Mutex<[usize; STREAM_COUNT]>,
}

fn default_loop() -> bool {
    true
}

impl ScriptedDeviceClient {
    pub fn from_file(path: &str) -> Result<Self, DeviceClientError> {
        let content = fs::read_to_string(path).map_err(DeviceClientError::Io)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, DeviceClientError> {
        let script: ScriptFile = serde_json::from_str(content).map_err(DeviceClientError::Json)?;

        if script.link.is_empty() {
            return Err(DeviceClientError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "debug script must contain at least one link event",
            )));
        }

        Ok(Self {
            script,
            cursors: Mutex::new([0; STREAM_COUNT]),
        })
    }

    fn next_event(&self, stream: Stream) -> Result<ScriptEvent, DeviceClientError> {
        let mut cursors = self.cursors.lock().map_err(|_| {
            DeviceClientError::Io(io::Error::other("debug replay state lock poisoned"))
        })?;

        let events = self.script.events(stream);
        if events.is_empty() {
            return Err(DeviceClientError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no scripted events for {}", stream.name()),
            )));
        }

        let cursor = &mut cursors[stream.index()];
        if *cursor >= events.len() {
            if self.script.loop_forever {
                *cursor = 0;
            } else {
                return Err(DeviceClientError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("debug replay finished for {}", stream.name()),
                )));
            }
        }

        let event = events[*cursor].clone();
        *cursor = cursor.saturating_add(1);

        Ok(event)
    }

    fn execute_event(event: ScriptEvent) -> Result<String, DeviceClientError> {
        match (event.ok, event.error) {
            (Some(output), None) => Ok(output),
            (None, Some(error)) => Err(map_script_error(&error)),
            _ => Err(DeviceClientError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "script event must contain exactly one of: ok or error",
            ))),
        }
    }
}

fn map_script_error(kind: &str) -> DeviceClientError {
    let normalized = kind.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "timeout" => DeviceClientError::TimedOut {
            command: "scripted".to_string(),
            timeout_ms: 0,
        },
        "offline" | "device_offline" => DeviceClientError::CommandFailed {
            command: "scripted".to_string(),
            status: "device offline".to_string(),
        },
        "connection_refused" => {
            DeviceClientError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, kind))
        }
        "host_unreachable" => {
            DeviceClientError::Io(io::Error::new(io::ErrorKind::HostUnreachable, kind))
        }
        _ => DeviceClientError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unknown scripted error kind: {kind}"),
        )),
    }
}

impl DeviceClient for ScriptedDeviceClient {
    fn connect(&self) -> Result<(), DeviceClientError> {
        Ok(())
    }

    fn link_state(&self) -> Result<String, DeviceClientError> {
        Self::execute_event(self.next_event(Stream::Link)?)
    }

    fn dump(&self, source: DumpSource) -> Result<String, DeviceClientError> {
        Self::execute_event(self.next_event(Stream::Dump(source))?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use crate::adapters::adb::{DeviceClient, DeviceClientError, DumpSource};

    use super::ScriptedDeviceClient;

    fn fixture(path: &str) -> String {
        format!(
            "{}/testdata/debug/{path}",
            env!("CARGO_MANIFEST_DIR").replace("\\", "/")
        )
    }

    #[test]
    fn replays_and_loops_scripted_output() {
        let client =
            ScriptedDeviceClient::from_file(&fixture("tv_on_off.json")).expect("script should load");

        let first = client
            .dump(DumpSource::HdmiControl)
            .expect("hdmi #1 should succeed");
        let second = client
            .dump(DumpSource::HdmiControl)
            .expect("hdmi #2 should succeed");
        let third = client
            .dump(DumpSource::HdmiControl)
            .expect("hdmi should loop to first event");

        assert!(first.contains("mPowerStatus: 0"));
        assert!(second.contains("mPowerStatus: 1"));
        assert_eq!(first, third);
        assert_eq!(client.link_state().expect("link should answer").trim(), "device");
    }

    #[test]
    fn streams_advance_independently() {
        let client =
            ScriptedDeviceClient::from_file(&fixture("tv_on_off.json")).expect("script should load");

        client.dump(DumpSource::HdmiControl).expect("hdmi should succeed");
        let display = client
            .dump(DumpSource::Display)
            .expect("display should succeed");

        assert!(display.contains("mScreenState=ON"));
    }

    #[test]
    fn simulates_timeouts_and_offline_link() {
        let client =
            ScriptedDeviceClient::from_file(&fixture("link_failures.json")).expect("script");

        let err1 = client.link_state().expect_err("first link event should time out");
        let err2 = client
            .link_state()
            .expect_err("second link event should be offline");

        assert!(matches!(err1, DeviceClientError::TimedOut { .. }));
        assert!(matches!(err2, DeviceClientError::CommandFailed { .. }));
    }

    #[test]
    fn missing_stream_behaves_like_unanswered_command() {
        let client =
            ScriptedDeviceClient::from_file(&fixture("link_failures.json")).expect("script");

        match client.dump(DumpSource::NetDev) {
            Err(DeviceClientError::Io(io)) => assert_eq!(io.kind(), ErrorKind::NotFound),
            other => panic!("expected not found io error, got {other:?}"),
        }
    }

    #[test]
    fn stops_after_last_event_without_loop() {
        let client = ScriptedDeviceClient::from_json(
            r#"{"loop_forever": false, "link": [{"ok": "device"}]}"#,
        )
        .expect("script should load");

        client.link_state().expect("first link event should succeed");
        match client.link_state() {
            Err(DeviceClientError::Io(io)) => assert_eq!(io.kind(), ErrorKind::UnexpectedEof),
            other => panic!("expected eof io error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_script_without_link_events() {
        let err = ScriptedDeviceClient::from_json(r#"{"link": []}"#)
            .expect_err("missing link events should fail");

        match err {
            DeviceClientError::Io(io) => assert_eq!(io.kind(), ErrorKind::InvalidData),
            _ => panic!("expected invalid data io error"),
        }
    }

    #[test]
    fn rejects_invalid_top_level_json() {
        let err = ScriptedDeviceClient::from_json("[1, 2")
            .expect_err("invalid json should fail");

        assert!(matches!(err, DeviceClientError::Json(_)));
    }

    #[test]
    fn rejects_event_with_both_ok_and_error() {
        let client = ScriptedDeviceClient::from_json(
            r#"{"link": [{"ok": "device", "error": "timeout"}]}"#,
        )
        .expect("script should load");

        match client.link_state() {
            Err(DeviceClientError::Io(io)) => assert_eq!(io.kind(), ErrorKind::InvalidData),
            other => panic!("expected invalid data io error, got {other:?}"),
        }
    }
}
