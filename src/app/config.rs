use crate::app::AppError;

const MAX_ADB_TIMEOUT_SECS: u64 = 600;
const MAX_POLL_INTERVAL_SECS: u64 = 86_400;

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceSource {
    Adb {
        host: String,
        port: u16,
        adb_path: String,
        timeout_secs: u64,
    },
    Replay {
        script_path: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub api_base: String,
    pub token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub device: DeviceSource,
    pub poll_interval_secs: u64,
    pub active_kbps: f64,
    pub debounce_secs: u64,
    pub usage_log_path: String,
    pub state_path: String,
    pub telegram: Option<TelegramConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        // A missing .env file is the normal case in production.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let device = match non_empty(&lookup, "DEVICE_DEBUG_SCRIPT") {
            Some(script_path) => DeviceSource::Replay { script_path },
            None => DeviceSource::Adb {
                host: non_empty(&lookup, "DEVICE_HOST")
                    .ok_or_else(|| AppError::config("DEVICE_HOST is required"))?,
                port: parse_or_default(&lookup, "DEVICE_PORT", 5555_u16)?,
                adb_path: non_empty(&lookup, "ADB_PATH").unwrap_or_else(|| "adb".to_string()),
                timeout_secs: parse_in_range(
                    &lookup,
                    "ADB_TIMEOUT_SECS",
                    4,
                    1,
                    MAX_ADB_TIMEOUT_SECS,
                )?,
            },
        };

        let active_kbps = parse_or_default(&lookup, "ACTIVE_KBPS", 300.0_f64)?;
        if !active_kbps.is_finite() || active_kbps < 0.0 {
            return Err(AppError::config("ACTIVE_KBPS must be a non-negative number"));
        }

        let telegram = match (
            non_empty(&lookup, "TELEGRAM_TOKEN"),
            non_empty(&lookup, "TELEGRAM_CHAT_ID"),
        ) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig {
                api_base: non_empty(&lookup, "TELEGRAM_API_BASE")
                    .unwrap_or_else(|| "https://api.telegram.org".to_string()),
                token,
                chat_id,
            }),
            _ => None,
        };

        Ok(Self {
            device,
            poll_interval_secs: parse_in_range(
                &lookup,
                "POLL_INTERVAL_SECS",
                5,
                1,
                MAX_POLL_INTERVAL_SECS,
            )?,
            active_kbps,
            debounce_secs: parse_or_default(&lookup, "DEBOUNCE_SECS", 8_u64)?,
            usage_log_path: non_empty(&lookup, "USAGE_LOG_PATH")
                .unwrap_or_else(|| "/var/lib/firetv-watcher/usage.jsonl".to_string()),
            state_path: non_empty(&lookup, "STATE_PATH")
                .unwrap_or_else(|| "/var/lib/firetv-watcher/state.json".to_string()),
            telegram,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or_default<T, F>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::config(format!("{key} must be a valid number"))),
        None => Ok(default),
    }
}

fn parse_in_range<F>(
    lookup: &F,
    key: &str,
    default: u64,
    min: u64,
    max: u64,
) -> Result<u64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or_default(lookup, key, default)?;
    if !(min..=max).contains(&value) {
        return Err(AppError::config(format!("{key} must be between {min} and {max}")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DeviceSource, TelegramConfig};

    #[test]
    fn rejects_missing_device_host() {
        let result = AppConfig::from_lookup(|_| None);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid configuration: DEVICE_HOST is required"
        );
    }

    #[test]
    fn applies_defaults_for_optional_fields() {
        let result = AppConfig::from_lookup(|key| match key {
            "DEVICE_HOST" => Some("10.0.1.16".to_string()),
            _ => None,
        })
        .expect("config should be valid");

        assert_eq!(
            result.device,
            DeviceSource::Adb {
                host: "10.0.1.16".to_string(),
                port: 5555,
                adb_path: "adb".to_string(),
                timeout_secs: 4,
            }
        );
        assert_eq!(result.poll_interval_secs, 5);
        assert_eq!(result.active_kbps, 300.0);
        assert_eq!(result.debounce_secs, 8);
        assert_eq!(result.usage_log_path, "/var/lib/firetv-watcher/usage.jsonl");
        assert_eq!(result.state_path, "/var/lib/firetv-watcher/state.json");
        assert_eq!(result.telegram, None);
    }

    #[test]
    fn debug_script_replaces_adb_source() {
        let result = AppConfig::from_lookup(|key| match key {
            "DEVICE_DEBUG_SCRIPT" => Some(" testdata/debug/tv_on_off.json ".to_string()),
            _ => None,
        })
        .expect("config should be valid");

        assert_eq!(
            result.device,
            DeviceSource::Replay {
                script_path: "testdata/debug/tv_on_off.json".to_string(),
            }
        );
    }

    #[test]
    fn enables_telegram_only_with_both_credentials() {
        let token_only = AppConfig::from_lookup(|key| match key {
            "DEVICE_HOST" => Some("10.0.1.16".to_string()),
            "TELEGRAM_TOKEN" => Some("123:abc".to_string()),
            _ => None,
        })
        .expect("config should be valid");
        assert_eq!(token_only.telegram, None);

        let both = AppConfig::from_lookup(|key| match key {
            "DEVICE_HOST" => Some("10.0.1.16".to_string()),
            "TELEGRAM_TOKEN" => Some("123:abc".to_string()),
            "TELEGRAM_CHAT_ID" => Some("42".to_string()),
            _ => None,
        })
        .expect("config should be valid");
        assert_eq!(
            both.telegram,
            Some(TelegramConfig {
                api_base: "https://api.telegram.org".to_string(),
                token: "123:abc".to_string(),
                chat_id: "42".to_string(),
            })
        );
    }

    #[test]
    fn rejects_invalid_numeric_values() {
        let result = AppConfig::from_lookup(|key| match key {
            "DEVICE_HOST" => Some("10.0.1.16".to_string()),
            "DEBOUNCE_SECS" => Some("abc".to_string()),
            _ => None,
        });

        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid configuration: DEBOUNCE_SECS must be a valid number"
        );
    }

    #[test]
    fn rejects_negative_threshold() {
        let result = AppConfig::from_lookup(|key| match key {
            "DEVICE_HOST" => Some("10.0.1.16".to_string()),
            "ACTIVE_KBPS" => Some("-1".to_string()),
            _ => None,
        });

        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid configuration: ACTIVE_KBPS must be a non-negative number"
        );
    }

    #[test]
    fn rejects_zero_and_oversized_intervals() {
        let zero_poll = AppConfig::from_lookup(|key| match key {
            "DEVICE_HOST" => Some("10.0.1.16".to_string()),
            "POLL_INTERVAL_SECS" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(
            zero_poll.unwrap_err().to_string(),
            "invalid configuration: POLL_INTERVAL_SECS must be between 1 and 86400"
        );

        let zero_timeout = AppConfig::from_lookup(|key| match key {
            "DEVICE_HOST" => Some("10.0.1.16".to_string()),
            "ADB_TIMEOUT_SECS" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(
            zero_timeout.unwrap_err().to_string(),
            "invalid configuration: ADB_TIMEOUT_SECS must be between 1 and 600"
        );

        let huge_timeout = AppConfig::from_lookup(|key| match key {
            "DEVICE_HOST" => Some("10.0.1.16".to_string()),
            "ADB_TIMEOUT_SECS" => Some(u64::MAX.to_string()),
            _ => None,
        });
        assert!(huge_timeout.is_err());
    }
}
