use serde::{Deserialize, Serialize};

use crate::domain::power_state::TimestampMs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerStatus {
    On,
    Standby,
    TransitioningToOn,
    TransitioningToStandby,
}

impl PowerStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::On),
            1 => Some(Self::Standby),
            2 => Some(Self::TransitioningToOn),
            3 => Some(Self::TransitioningToStandby),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::On => 0,
            Self::Standby => 1,
            Self::TransitioningToOn => 2,
            Self::TransitioningToStandby => 3,
        }
    }

    pub fn indicates_on(self) -> bool {
        matches!(self, Self::On | Self::TransitioningToOn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    None,
    Stopped,
    Paused,
    Playing,
    FastForwarding,
    Rewinding,
    Buffering,
    Error,
    Connecting,
    SkippingToPrevious,
    SkippingToNext,
    SkippingToQueueItem,
}

impl MediaState {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Stopped),
            2 => Some(Self::Paused),
            3 => Some(Self::Playing),
            4 => Some(Self::FastForwarding),
            5 => Some(Self::Rewinding),
            6 => Some(Self::Buffering),
            7 => Some(Self::Error),
            8 => Some(Self::Connecting),
            9 => Some(Self::SkippingToPrevious),
            10 => Some(Self::SkippingToNext),
            11 => Some(Self::SkippingToQueueItem),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Stopped => "STOPPED",
            Self::Paused => "PAUSED",
            Self::Playing => "PLAYING",
            Self::FastForwarding => "FAST_FORWARDING",
            Self::Rewinding => "REWINDING",
            Self::Buffering => "BUFFERING",
            Self::Error => "ERROR",
            Self::Connecting => "CONNECTING",
            Self::SkippingToPrevious => "SKIPPING_TO_PREVIOUS",
            Self::SkippingToNext => "SKIPPING_TO_NEXT",
            Self::SkippingToQueueItem => "SKIPPING_TO_QUEUE_ITEM",
        }
    }

    pub fn is_streaming(self) -> bool {
        matches!(self, Self::Playing | Self::Buffering | Self::Connecting)
    }
}

pub const UNKNOWN_MEDIA_LABEL: &str = "UNKNOWN";

pub fn media_label(media: Option<MediaState>) -> &'static str {
    media.map_or(UNKNOWN_MEDIA_LABEL, MediaState::label)
}

pub fn power_status_code(power_status: Option<PowerStatus>) -> i64 {
    power_status.map_or(-1, PowerStatus::code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetCounters {
    pub received_bytes: u64,
    pub sent_bytes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub power_status: Option<PowerStatus>,
    pub display_on: Option<bool>,
    pub media_state: Option<MediaState>,
    pub net_counters: Option<NetCounters>,
    pub foreground_app: Option<String>,
    pub collected_at: TimestampMs,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    #[serde(rename = "device_on", alias = "tv_on", default)]
    pub is_on: Option<bool>,
    #[serde(alias = "app", default)]
    pub current_app: String,
}
