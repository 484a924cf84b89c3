use std::thread;
use std::time::Duration;

use crate::adapters::adb::DeviceClient;
use crate::app::config::AppConfig;
use crate::app::error::AppError;
use crate::app::runtime::{SystemClock, build_device_client, check_link, collect_sample};
use crate::domain::inference::{DeviceInference, InferenceInput, infer_device_on};
use crate::domain::models::RawSample;
use crate::domain::power_state::Clock;
use crate::domain::throughput::{CounterSample, ThroughputEstimate, estimate_throughput};

const PROBE_SAMPLE_SPACING: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub link_up: bool,
    pub sample: Option<RawSample>,
    pub throughput: ThroughputEstimate,
    pub inference: Option<DeviceInference>,
}

pub(crate) fn probe(config: &AppConfig) -> Result<ProbeReport, AppError> {
    let client = build_device_client(config)?;
    Ok(probe_with(
        &client,
        &SystemClock,
        PROBE_SAMPLE_SPACING,
        config.active_kbps,
    ))
}

fn probe_with<D, C>(client: &D, clock: &C, spacing: Duration, active_kbps: f64) -> ProbeReport
where
    D: DeviceClient,
    C: Clock,
{
    if !check_link(client) {
        return ProbeReport {
            link_up: false,
            sample: None,
            throughput: ThroughputEstimate::idle(),
            inference: None,
        };
    }

    let first = collect_sample(client, clock.now());
    thread::sleep(spacing);
    let second = collect_sample(client, clock.now());

    let throughput = match (first.net_counters, second.net_counters) {
        (Some(before), Some(after)) => estimate_throughput(
            Some(&CounterSample {
                counters: before,
                collected_at: first.collected_at,
            }),
            &CounterSample {
                counters: after,
                collected_at: second.collected_at,
            },
        ),
        _ => ThroughputEstimate::idle(),
    };

    let inference = infer_device_on(
        &InferenceInput {
            power_status: second.power_status,
            display_on: second.display_on,
            media_state: second.media_state,
            kbps_in: throughput.kbps_in,
        },
        active_kbps,
    );

    ProbeReport {
        link_up: true,
        sample: Some(second),
        throughput,
        inference: Some(inference),
    }
}
