use crate::domain::models::NetCounters;
use crate::domain::power_state::TimestampMs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSample {
    pub counters: NetCounters,
    pub collected_at: TimestampMs,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputEstimate {
    pub kbps_in: f64,
    pub kbps_out: f64,
    pub warnings: Vec<ThroughputWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThroughputWarning {
    ClockNotAdvancing,
    ReceivedCounterReset,
    SentCounterReset,
}

impl ThroughputEstimate {
    pub fn idle() -> Self {
        Self {
            kbps_in: 0.0,
            kbps_out: 0.0,
            warnings: Vec::new(),
        }
    }
}

/// Estimates throughput in kilobits per second between two counter samples.
///
/// A counter that went backwards (reboot or interface reset) yields `0.0` for
/// that direction and a warning instead of a negative rate.
pub fn estimate_throughput(
    previous: Option<&CounterSample>,
    current: &CounterSample,
) -> ThroughputEstimate {
    let Some(previous) = previous else {
        return ThroughputEstimate::idle();
    };

    let elapsed_ms = current.collected_at.0 - previous.collected_at.0;
    if elapsed_ms <= 0 {
        return ThroughputEstimate {
            warnings: vec![ThroughputWarning::ClockNotAdvancing],
            ..ThroughputEstimate::idle()
        };
    }
    let elapsed_secs = elapsed_ms as f64 / 1000.0;

    let mut warnings = Vec::new();

    let kbps_in = match current
        .counters
        .received_bytes
        .checked_sub(previous.counters.received_bytes)
    {
        Some(delta) => kbps(delta, elapsed_secs),
        None => {
            warnings.push(ThroughputWarning::ReceivedCounterReset);
            0.0
        }
    };

    let kbps_out = match current
        .counters
        .sent_bytes
        .checked_sub(previous.counters.sent_bytes)
    {
        Some(delta) => kbps(delta, elapsed_secs),
        None => {
            warnings.push(ThroughputWarning::SentCounterReset);
            0.0
        }
    };

    ThroughputEstimate {
        kbps_in,
        kbps_out,
        warnings,
    }
}

fn kbps(delta_bytes: u64, elapsed_secs: f64) -> f64 {
    delta_bytes as f64 * 8.0 / 1000.0 / elapsed_secs
}

#[cfg(test)]
mod tests {
    use super::{CounterSample, ThroughputWarning, estimate_throughput};
    use crate::domain::models::NetCounters;
    use crate::domain::power_state::TimestampMs;

    fn sample(received_bytes: u64, sent_bytes: u64, at_ms: i64) -> CounterSample {
        CounterSample {
            counters: NetCounters {
                received_bytes,
                sent_bytes,
            },
            collected_at: TimestampMs(at_ms),
        }
    }

    #[test]
    fn returns_zero_without_previous_sample() {
        let result = estimate_throughput(None, &sample(5_000, 1_000, 1_000));

        assert_eq!(result.kbps_in, 0.0);
        assert_eq!(result.kbps_out, 0.0);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn computes_kbps_from_byte_delta() {
        let previous = sample(1_000, 500, 0);
        let current = sample(2_000, 750, 1_000);

        let result = estimate_throughput(Some(&previous), &current);

        assert!((result.kbps_in - 8.0).abs() < 1e-9);
        assert!((result.kbps_out - 2.0).abs() < 1e-9);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn scales_by_elapsed_seconds() {
        let previous = sample(0, 0, 10_000);
        let current = sample(250_000, 0, 15_000);

        let result = estimate_throughput(Some(&previous), &current);

        assert!((result.kbps_in - 400.0).abs() < 1e-9);
    }

    #[test]
    fn returns_zero_when_clock_does_not_advance() {
        let previous = sample(1_000, 1_000, 5_000);

        for at_ms in [5_000, 4_000] {
            let result = estimate_throughput(Some(&previous), &sample(9_000, 9_000, at_ms));

            assert_eq!(result.kbps_in, 0.0);
            assert_eq!(result.kbps_out, 0.0);
            assert_eq!(result.warnings, vec![ThroughputWarning::ClockNotAdvancing]);
        }
    }

    #[test]
    fn clamps_counter_reset_to_zero() {
        let previous = sample(900_000, 400, 0);
        let current = sample(1_200, 800, 2_000);

        let result = estimate_throughput(Some(&previous), &current);

        assert_eq!(result.kbps_in, 0.0);
        assert!((result.kbps_out - 1.6).abs() < 1e-9);
        assert_eq!(result.warnings, vec![ThroughputWarning::ReceivedCounterReset]);
    }
}
