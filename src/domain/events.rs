use crate::domain::models::{MediaState, PowerStatus, media_label, power_status_code};

#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    ConnectivityChanged {
        is_up: bool,
    },
    PowerTransitioned {
        is_on: bool,
        current_app: String,
    },
    AppChanged {
        from: String,
        to: String,
    },
    InitialState {
        is_on: bool,
        app: String,
        media_state: Option<MediaState>,
        power_status: Option<PowerStatus>,
    },
}

impl WatchEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectivityChanged { .. } => "connectivity_changed",
            Self::PowerTransitioned { .. } => "power_transitioned",
            Self::AppChanged { .. } => "app_changed",
            Self::InitialState { .. } => "initial_state",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::ConnectivityChanged { is_up: true } => "🔌 Device link restored".to_string(),
            Self::ConnectivityChanged { is_up: false } => "⚠️ Device link lost".to_string(),
            Self::PowerTransitioned {
                is_on: true,
                current_app,
            } => format!("📺 TV turned on (app: {})", or_dash(current_app)),
            Self::PowerTransitioned { is_on: false, .. } => {
                "💤 TV turned off or switched input".to_string()
            }
            Self::AppChanged { from, to } => {
                let from = if from.is_empty() { "none" } else { from.as_str() };
                format!("🔄 App changed: {from} → {to}")
            }
            Self::InitialState {
                is_on,
                app,
                media_state,
                power_status,
            } => format!(
                "🔔 Initial state: TV={} | app={} | media={} | pwr={}",
                on_off(*is_on),
                or_dash(app),
                media_label(*media_state),
                power_status_code(*power_status)
            ),
        }
    }
}

pub fn on_off(is_on: bool) -> &'static str {
    if is_on { "ON" } else { "OFF" }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
