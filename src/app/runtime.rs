use std::thread;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};

use crate::adapters::adb::{AdbClient, DeviceClient, DumpSource};
use crate::adapters::debug_file::ScriptedDeviceClient;
use crate::adapters::notifier::{NoopNotifier, Notifier, TelegramNotifier};
use crate::adapters::state_store::StateStore;
use crate::adapters::usage_log::{UsageLog, UsageRecord, round_one_decimal};
use crate::app::config::{AppConfig, DeviceSource};
use crate::app::error::AppError;
use crate::domain::app_focus::AppFocusTracker;
use crate::domain::dumpsys;
use crate::domain::events::{WatchEvent, on_off};
use crate::domain::inference::{DeviceInference, InferenceInput, infer_device_on};
use crate::domain::models::{DeviceState, RawSample, media_label, power_status_code};
use crate::domain::power_state::{Clock, PowerObservation, PowerStateMachine, TimestampMs};
use crate::domain::throughput::{
    CounterSample, ThroughputEstimate, ThroughputWarning, estimate_throughput,
};

const LINK_READY_STATE: &str = "device";

#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimestampMs {
        TimestampMs(Utc::now().timestamp_millis())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchSettings {
    pub active_kbps: f64,
    pub debounce_ms: i64,
}

impl WatchSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            active_kbps: config.active_kbps,
            debounce_ms: i64::try_from(config.debounce_secs.saturating_mul(1000))
                .unwrap_or(i64::MAX),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub sample: RawSample,
    pub throughput: ThroughputEstimate,
    pub inference: DeviceInference,
    pub power: PowerObservation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    LinkDown,
    Completed(CycleReport),
}

pub struct Watcher<D, N, Cl> {
    client: D,
    notifier: N,
    clock: Cl,
    store: StateStore,
    usage_log: UsageLog,
    settings: WatchSettings,
    power: PowerStateMachine,
    apps: AppFocusTracker,
    previous_counters: Option<CounterSample>,
    link_up: bool,
    initial_reported: bool,
}

impl<D, N, Cl> Watcher<D, N, Cl>
where
    D: DeviceClient,
    N: Notifier,
    Cl: Clock,
{
    pub fn new(
        client: D,
        notifier: N,
        clock: Cl,
        store: StateStore,
        usage_log: UsageLog,
        settings: WatchSettings,
    ) -> Self {
        let persisted = store.load();
        tracing::info!(
            device_on = ?persisted.is_on,
            current_app = %persisted.current_app,
            "loaded persisted device state"
        );

        Self {
            client,
            notifier,
            clock,
            store,
            usage_log,
            settings,
            power: PowerStateMachine::new(settings.debounce_ms, persisted.is_on),
            apps: AppFocusTracker::new(persisted.current_app),
            previous_counters: None,
            link_up: true,
            initial_reported: false,
        }
    }

    pub fn tick(&mut self) -> CycleOutcome {
        let link_up = check_link(&self.client);
        if link_up != self.link_up {
            self.link_up = link_up;
            tracing::info!(link_up, "device link changed");
            self.dispatch(&WatchEvent::ConnectivityChanged { is_up: link_up });
        }
        if !link_up {
            return CycleOutcome::LinkDown;
        }

        let sample = collect_sample(&self.client, self.clock.now());
        let throughput = self.estimate(&sample);
        let inference = infer_device_on(
            &InferenceInput {
                power_status: sample.power_status,
                display_on: sample.display_on,
                media_state: sample.media_state,
                kbps_in: throughput.kbps_in,
            },
            self.settings.active_kbps,
        );
        let foreground_app = sample.foreground_app.as_deref().unwrap_or_default();

        tracing::info!(
            tv = on_off(inference.device_on),
            reason = ?inference.reason,
            pwr = power_status_code(sample.power_status),
            display = ?sample.display_on,
            app = if foreground_app.is_empty() { "-" } else { foreground_app },
            media = media_label(sample.media_state),
            kbps_in = format_args!("{:.0}", throughput.kbps_in),
            "poll cycle"
        );

        self.append_usage(&sample, &inference, &throughput);

        let power = self.power.observe(inference.device_on, sample.collected_at);
        match power {
            PowerObservation::Transitioned { is_on, .. } => {
                let current_app = if foreground_app.is_empty() {
                    self.apps.current_app().to_string()
                } else {
                    foreground_app.to_string()
                };
                tracing::info!(device_on = is_on, "power transition accepted");
                self.dispatch(&WatchEvent::PowerTransitioned { is_on, current_app });
            }
            PowerObservation::Suppressed {
                stable_on,
                observed_on,
            } => {
                tracing::debug!(stable_on, observed_on, "power flip inside debounce window");
            }
            PowerObservation::Baseline { .. } | PowerObservation::Unchanged { .. } => {}
        }

        if let Some(change) = self
            .apps
            .observe(inference.device_on, sample.foreground_app.as_deref())
        {
            tracing::info!(from = %change.from, to = %change.to, "foreground app changed");
            self.dispatch(&WatchEvent::AppChanged {
                from: change.from,
                to: change.to,
            });
        }

        self.persist_state();

        if !self.initial_reported {
            self.initial_reported = true;
            self.dispatch(&WatchEvent::InitialState {
                is_on: inference.device_on,
                app: foreground_app.to_string(),
                media_state: sample.media_state,
                power_status: sample.power_status,
            });
        }

        CycleOutcome::Completed(CycleReport {
            sample,
            throughput,
            inference,
            power,
        })
    }

    pub fn run(mut self, poll_interval: Duration) -> ! {
        loop {
            self.tick();
            thread::sleep(poll_interval);
        }
    }

    fn estimate(&mut self, sample: &RawSample) -> ThroughputEstimate {
        let Some(counters) = sample.net_counters else {
            return ThroughputEstimate::idle();
        };

        let current = CounterSample {
            counters,
            collected_at: sample.collected_at,
        };
        let estimate = estimate_throughput(self.previous_counters.as_ref(), &current);
        self.previous_counters = Some(current);

        for warning in &estimate.warnings {
            match warning {
                ThroughputWarning::ClockNotAdvancing => {
                    tracing::debug!("clock did not advance between counter samples");
                }
                ThroughputWarning::ReceivedCounterReset | ThroughputWarning::SentCounterReset => {
                    tracing::warn!(?warning, "network counter reset, rate clamped to zero");
                }
            }
        }

        estimate
    }

    fn append_usage(
        &self,
        sample: &RawSample,
        inference: &DeviceInference,
        throughput: &ThroughputEstimate,
    ) {
        let record = UsageRecord {
            ts: timestamp_to_iso8601(sample.collected_at),
            device_on: inference.device_on,
            power_status: power_status_code(sample.power_status),
            display_on: sample.display_on.unwrap_or(false),
            foreground_app: sample.foreground_app.clone().unwrap_or_default(),
            media_state: media_label(sample.media_state).to_string(),
            kbps_in: round_one_decimal(throughput.kbps_in),
            kbps_out: round_one_decimal(throughput.kbps_out),
        };

        if let Err(error) = self.usage_log.append(&record) {
            tracing::warn!(
                path = %self.usage_log.path().display(),
                error = %error,
                "failed to append usage record"
            );
        }
    }

    fn persist_state(&self) {
        let state = DeviceState {
            is_on: self.power.stable_on(),
            current_app: self.apps.current_app().to_string(),
        };

        if let Err(error) = self.store.save(&state) {
            tracing::warn!(
                path = %self.store.path().display(),
                error = %error,
                "failed to persist device state"
            );
        }
    }

    fn dispatch(&self, event: &WatchEvent) {
        if let Err(error) = self.notifier.notify(event) {
            tracing::warn!(kind = event.kind(), error = %error, "notification delivery failed");
        }
    }
}

pub fn check_link<D: DeviceClient>(client: &D) -> bool {
    if link_ready(client) {
        return true;
    }

    if let Err(error) = client.connect() {
        tracing::debug!(error = %error, "device reconnect failed");
        return false;
    }

    link_ready(client)
}

fn link_ready<D: DeviceClient>(client: &D) -> bool {
    match client.link_state() {
        Ok(state) => state.trim() == LINK_READY_STATE,
        Err(error) => {
            tracing::debug!(error = %error, "device link check failed");
            false
        }
    }
}

/// Collects every signal independently; a failed retrieval leaves that field empty.
pub fn collect_sample<D: DeviceClient>(client: &D, collected_at: TimestampMs) -> RawSample {
    RawSample {
        net_counters: read_dump(client, DumpSource::NetDev)
            .and_then(|dump| dumpsys::parse_net_counters(&dump)),
        media_state: read_dump(client, DumpSource::MediaSession)
            .and_then(|dump| dumpsys::parse_media_state(&dump)),
        foreground_app: read_dump(client, DumpSource::WindowFocus)
            .and_then(|dump| dumpsys::parse_foreground_app(&dump)),
        power_status: read_dump(client, DumpSource::HdmiControl)
            .and_then(|dump| dumpsys::parse_power_status(&dump)),
        display_on: read_dump(client, DumpSource::Display)
            .map(|dump| dumpsys::parse_display_on(&dump)),
        collected_at,
    }
}

fn read_dump<D: DeviceClient>(client: &D, source: DumpSource) -> Option<String> {
    match client.dump(source) {
        Ok(output) => Some(output),
        Err(error) => {
            tracing::debug!(source = source.name(), error = %error, "signal unavailable");
            None
        }
    }
}

pub(crate) fn build_device_client(config: &AppConfig) -> Result<Box<dyn DeviceClient>, AppError> {
    match &config.device {
        DeviceSource::Adb {
            host,
            port,
            adb_path,
            timeout_secs,
        } => Ok(Box::new(AdbClient::new(
            adb_path,
            host,
            *port,
            Duration::from_secs(*timeout_secs),
        ))),
        DeviceSource::Replay { script_path } => {
            let client = ScriptedDeviceClient::from_file(script_path).map_err(AppError::runtime)?;
            tracing::info!(script_path = %script_path, "replaying scripted device output");
            Ok(Box::new(client))
        }
    }
}

fn build_notifier(config: &AppConfig) -> Result<Box<dyn Notifier>, AppError> {
    match &config.telegram {
        Some(telegram) => {
            let notifier =
                TelegramNotifier::new(&telegram.api_base, &telegram.token, &telegram.chat_id)
                    .map_err(AppError::runtime)?;
            Ok(Box::new(notifier))
        }
        None => {
            tracing::info!("telegram credentials not configured, notifications disabled");
            Ok(Box::new(NoopNotifier))
        }
    }
}

pub fn run(config: AppConfig) -> Result<(), AppError> {
    let client = build_device_client(&config)?;
    if let Err(error) = client.connect() {
        tracing::warn!(error = %error, "initial device connect failed");
    }

    let watcher = Watcher::new(
        client,
        build_notifier(&config)?,
        SystemClock,
        StateStore::new(&config.state_path),
        UsageLog::new(&config.usage_log_path),
        WatchSettings::from_config(&config),
    );

    watcher.run(Duration::from_secs(config.poll_interval_secs))
}

fn timestamp_to_iso8601(timestamp: TimestampMs) -> String {
    let datetime = chrono::DateTime::<Utc>::from_timestamp_millis(timestamp.0)
        .unwrap_or_else(|| chrono::DateTime::<Utc>::from(std::time::UNIX_EPOCH));
    datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
}
