use std::sync::LazyLock;

use regex::Regex;

use crate::domain::models::{MediaState, NetCounters, PowerStatus};

static POWER_STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mPowerStatus:\s*(\d+)").expect("power status regex is valid"));
static DISPLAY_ON_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)mScreenState\s*=\s*ON").expect("screen state regex is valid"),
        Regex::new(r"(?i)mActualState\s*=\s*ON").expect("actual state regex is valid"),
    ]
});
static MEDIA_STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"state=(\d+)").expect("media state regex is valid"));
// `mCurrentFocus=Window{1a2b3c u0 com.netflix.ninja/com.netflix.ninja.MainActivity}`
static FOCUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"mCurrentFocus=Window\{\S+ (?:u\d+ )?([^/\s}]+)/").expect("focus regex is valid")
});
static NET_DEV_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[:\s]+").expect("net dev split regex is valid"));

const NET_INTERFACES: &[&str] = &["wlan0:", "eth0:"];
const NET_DEV_RX_BYTES_COLUMN: usize = 1;
const NET_DEV_TX_BYTES_COLUMN: usize = 9;

pub fn parse_power_status(dump: &str) -> Option<PowerStatus> {
    let code = POWER_STATUS_RE
        .captures(dump)
        .and_then(|caps| caps[1].parse::<i64>().ok())?;
    let status = PowerStatus::from_code(code);
    if status.is_none() {
        tracing::debug!(code, "unrecognized hdmi power status code");
    }
    status
}

pub fn parse_display_on(dump: &str) -> bool {
    DISPLAY_ON_RES.iter().any(|re| re.is_match(dump))
}

pub fn parse_media_state(dump: &str) -> Option<MediaState> {
    let code = MEDIA_STATE_RE
        .captures(dump)
        .and_then(|caps| caps[1].parse::<i64>().ok())?;
    MediaState::from_code(code)
}

pub fn parse_foreground_app(dump: &str) -> Option<String> {
    FOCUS_RE
        .captures(dump)
        .map(|caps| caps[1].to_string())
        .filter(|app| !app.is_empty())
}

pub fn parse_net_counters(dump: &str) -> Option<NetCounters> {
    dump.lines()
        .filter(|line| NET_INTERFACES.iter().any(|iface| line.contains(iface)))
        .find_map(|line| {
            let parts: Vec<&str> = NET_DEV_SPLIT_RE.split(line.trim()).collect();
            if parts.len() <= NET_DEV_TX_BYTES_COLUMN {
                return None;
            }
            Some(NetCounters {
                received_bytes: parts[NET_DEV_RX_BYTES_COLUMN].parse().ok()?,
                sent_bytes: parts[NET_DEV_TX_BYTES_COLUMN].parse().ok()?,
            })
        })
}
