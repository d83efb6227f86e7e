//! Watcher configuration
//!
//! Built once at startup and passed by value or reference into each
//! component. Nothing reads the environment after `WatchConfig::from_env`.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TYPES: &[&str] = &["Komfort-Apartment", "Komfort L-Apartment"];

/// Polling cadence and run budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Wall-clock budget for one invocation
    pub run_budget: Duration,
    /// Delay between polls while free units exist
    pub fast_interval: Duration,
    /// Delay between polls while idle
    pub slow_interval: Duration,
    /// Do not start a cycle with less budget than this left
    pub min_start_budget: Duration,
    /// Sleeps shorter than this end the run instead
    pub min_sleep: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            run_budget: Duration::from_secs(280),
            fast_interval: Duration::from_secs(20),
            slow_interval: Duration::from_secs(60),
            min_start_budget: Duration::from_secs(35),
            min_sleep: Duration::from_secs(3),
        }
    }
}

/// Decision engine tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertConfig {
    /// Maximum STILL-ALERT messages per run
    pub still_alert_max: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self { still_alert_max: 3 }
    }
}

/// Liveness message schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatConfig {
    /// Local hours (0-23) at which a heartbeat is sent
    pub hours: Vec<u32>,
    /// Minutes after the top of the hour during which it may fire
    pub window_minutes: u32,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            hours: vec![9, 21],
            window_minutes: 10,
        }
    }
}

/// Telegram Bot API transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub api_base: String,
    pub token: String,
    pub chat_id: String,
}

/// Complete watcher configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub url: String,
    pub user_agent: String,
    pub monitored_types: Vec<String>,
    pub state_file: PathBuf,
    pub fetch_timeout: Duration,
    pub notify_timeout: Duration,
    /// None means notifications are only logged
    pub telegram: Option<TelegramConfig>,
    pub poll: PollConfig,
    pub alerts: AlertConfig,
    pub heartbeat: HeartbeatConfig,
}

impl WatchConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_agent: "Mozilla/5.0".to_string(),
            monitored_types: DEFAULT_TYPES.iter().map(|s| s.to_string()).collect(),
            state_file: PathBuf::from("./unitwatch_state.json"),
            fetch_timeout: Duration::from_secs(30),
            notify_timeout: Duration::from_secs(20),
            telegram: None,
            poll: PollConfig::default(),
            alerts: AlertConfig::default(),
            heartbeat: HeartbeatConfig::default(),
        }
    }

    /// Create a config from environment variables
    /// UNITWATCH_URL=https://example.org/units (required)
    /// UNITWATCH_TELEGRAM_TOKEN=123:abc
    /// UNITWATCH_TELEGRAM_CHAT_ID=42
    /// UNITWATCH_TYPES=Komfort-Apartment,Komfort L-Apartment
    /// UNITWATCH_HEARTBEAT_HOURS=9,21
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = non_empty_var("UNITWATCH_URL")
            .ok_or_else(|| ConfigError::Missing("UNITWATCH_URL".to_string()))?;
        let mut config = Self::new(url);

        if let Some(ua) = non_empty_var("UNITWATCH_USER_AGENT") {
            config.user_agent = ua;
        }
        if let Some(types) = non_empty_var("UNITWATCH_TYPES") {
            let types = split_list(&types);
            if types.is_empty() {
                return Err(ConfigError::Invalid(
                    "UNITWATCH_TYPES has no entries".to_string(),
                ));
            }
            config.monitored_types = types;
        }
        if let Some(path) = non_empty_var("UNITWATCH_STATE_FILE") {
            config.state_file = PathBuf::from(path);
        }

        config.fetch_timeout = secs_var("UNITWATCH_FETCH_TIMEOUT_SECS", config.fetch_timeout);
        config.notify_timeout = secs_var("UNITWATCH_NOTIFY_TIMEOUT_SECS", config.notify_timeout);

        config.telegram = match (
            non_empty_var("UNITWATCH_TELEGRAM_TOKEN"),
            non_empty_var("UNITWATCH_TELEGRAM_CHAT_ID"),
        ) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig {
                api_base: non_empty_var("UNITWATCH_TELEGRAM_API")
                    .unwrap_or_else(|| "https://api.telegram.org".to_string()),
                token,
                chat_id,
            }),
            _ => None,
        };

        let poll = &mut config.poll;
        poll.run_budget = secs_var("UNITWATCH_RUN_BUDGET_SECS", poll.run_budget);
        poll.fast_interval = secs_var("UNITWATCH_FAST_POLL_SECS", poll.fast_interval);
        poll.slow_interval = secs_var("UNITWATCH_SLOW_POLL_SECS", poll.slow_interval);
        poll.min_start_budget = secs_var("UNITWATCH_MIN_START_SECS", poll.min_start_budget);
        poll.min_sleep = secs_var("UNITWATCH_MIN_SLEEP_SECS", poll.min_sleep);

        config.alerts.still_alert_max =
            parsed_var("UNITWATCH_STILL_ALERT_MAX").unwrap_or(config.alerts.still_alert_max);

        if let Some(hours) = non_empty_var("UNITWATCH_HEARTBEAT_HOURS") {
            config.heartbeat.hours = parse_hours(&hours)?;
        }
        config.heartbeat.window_minutes = parsed_var("UNITWATCH_HEARTBEAT_WINDOW_MINS")
            .unwrap_or(config.heartbeat.window_minutes);

        Ok(config)
    }

    pub fn with_monitored_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.monitored_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = path.into();
        self
    }

    pub fn with_telegram(mut self, telegram: TelegramConfig) -> Self {
        self.telegram = Some(telegram);
        self
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_alerts(mut self, alerts: AlertConfig) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_heartbeat(mut self, heartbeat: HeartbeatConfig) -> Self {
        self.heartbeat = heartbeat;
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_var<T: FromStr>(key: &str) -> Option<T> {
    non_empty_var(key).and_then(|v| v.parse().ok())
}

fn secs_var(key: &str, default: Duration) -> Duration {
    parsed_var::<u64>(key)
        .map(Duration::from_secs)
        .unwrap_or(default)
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a comma-separated list of hours of day.
pub fn parse_hours(s: &str) -> Result<Vec<u32>, ConfigError> {
    let mut hours = Vec::new();
    for part in split_list(s) {
        let hour: u32 = part
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("heartbeat hour {:?}", part)))?;
        if hour > 23 {
            return Err(ConfigError::Invalid(format!(
                "heartbeat hour {} out of range",
                hour
            )));
        }
        hours.push(hour);
    }
    hours.sort_unstable();
    hours.dedup();
    Ok(hours)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required variable: {0}")]
    Missing(String),

    #[error("Invalid value: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WatchConfig::new("http://localhost/units");
        assert_eq!(config.monitored_types.len(), 2);
        assert!(config.telegram.is_none());
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert!(config.poll.fast_interval < config.poll.slow_interval);
        assert!(config.poll.min_start_budget > config.fetch_timeout);
    }

    #[test]
    fn test_builder() {
        let config = WatchConfig::new("http://localhost/units")
            .with_monitored_types(["Studio"])
            .with_state_file("/tmp/x.json")
            .with_alerts(AlertConfig { still_alert_max: 1 });

        assert_eq!(config.monitored_types, vec!["Studio".to_string()]);
        assert_eq!(config.state_file, PathBuf::from("/tmp/x.json"));
        assert_eq!(config.alerts.still_alert_max, 1);
    }

    #[test]
    fn test_parse_hours() {
        assert_eq!(parse_hours("21, 9,9").unwrap(), vec![9, 21]);
        assert_eq!(parse_hours("").unwrap(), Vec::<u32>::new());
        assert!(parse_hours("24").is_err());
        assert!(parse_hours("nine").is_err());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" Komfort-Apartment , ,Komfort L-Apartment"),
            vec!["Komfort-Apartment", "Komfort L-Apartment"]
        );
    }
}
