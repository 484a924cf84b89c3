use crate::domain::models::{MediaState, PowerStatus};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceInput {
    pub power_status: Option<PowerStatus>,
    pub display_on: Option<bool>,
    pub media_state: Option<MediaState>,
    pub kbps_in: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceReason {
    Display,
    PowerStatus,
    TrafficFallback,
    NoEvidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInference {
    pub device_on: bool,
    pub reason: InferenceReason,
}

/// Derives whether the attached display is on.
///
/// Explicit indicators win: display flags first, then the CEC power status.
/// Only when both are negative or missing does inbound traffic during an
/// active media session count as evidence of a lit screen.
pub fn infer_device_on(input: &InferenceInput, active_threshold_kbps: f64) -> DeviceInference {
    let reason = if input.display_on == Some(true) {
        InferenceReason::Display
    } else if input.power_status.is_some_and(PowerStatus::indicates_on) {
        InferenceReason::PowerStatus
    } else if input.media_state.is_some_and(MediaState::is_streaming)
        && input.kbps_in >= active_threshold_kbps
    {
        InferenceReason::TrafficFallback
    } else {
        InferenceReason::NoEvidence
    };

    DeviceInference {
        device_on: reason != InferenceReason::NoEvidence,
        reason,
    }
}
