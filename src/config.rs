//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

use crate::{
    error::TimerError,
    services::audio::DEFAULT_PLAYER,
    state::{TimerSettings, TimingConfig},
};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "focus-studio")]
#[command(about = "A focus timer coordinator with session tracking and a local control API")]
#[command(version)]
pub struct Config {
    /// Port to bind the control API to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Session length in minutes
    #[arg(short, long, default_value = "90")]
    pub duration: u64,

    /// Timer type reported to the session backend
    #[arg(long, default_value = "2")]
    pub timer_type: i64,

    /// Base url of the session backend
    #[arg(long, default_value = "http://localhost:8000")]
    pub api_base: String,

    /// User the sessions are recorded for
    #[arg(long, env = "FOCUS_STUDIO_USER")]
    pub user_id: Option<String>,

    /// Delay between completion and the completed display, in milliseconds
    #[arg(long, default_value = "800")]
    pub completion_delay_ms: u64,

    /// How long the completed display is held before returning to idle, in milliseconds
    #[arg(long, default_value = "2000")]
    pub completed_hold_ms: u64,

    /// Animation frame interval in milliseconds
    #[arg(long, default_value = "16")]
    pub frame_interval_ms: u64,

    /// Stats refresh interval in seconds
    #[arg(long, default_value = "30")]
    pub stats_interval: u64,

    /// Background track to loop while the screen is open
    #[arg(long)]
    pub track: Option<PathBuf>,

    /// Player command used for the background track
    #[arg(long, default_value = DEFAULT_PLAYER)]
    pub player: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn timing(&self) -> TimingConfig {
        TimingConfig {
            tick_interval: Duration::from_secs(1),
            frame_interval: Duration::from_millis(self.frame_interval_ms.max(1)),
            completion_delay: Duration::from_millis(self.completion_delay_ms),
            completed_hold: Duration::from_millis(self.completed_hold_ms),
        }
    }

    pub fn timer_settings(&self) -> Result<TimerSettings, TimerError> {
        if self.duration == 0 {
            return Err(TimerError::ZeroDuration);
        }
        let total_seconds = self
            .duration
            .checked_mul(60)
            .ok_or(TimerError::DurationTooLong { minutes: self.duration })?;
        Ok(TimerSettings {
            total_seconds,
            timer_type_id: self.timer_type,
            timing: self.timing(),
        })
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_ninety_minute_session() {
        let config = Config::try_parse_from(["focus-studio"]).unwrap();
        let settings = config.timer_settings().unwrap();

        assert_eq!(settings.total_seconds, 5400);
        assert_eq!(settings.timer_type_id, 2);
        assert_eq!(settings.timing, TimingConfig::default());
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.stats_interval(), Duration::from_secs(30));
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn zero_duration_is_rejected() {
        let config = Config::try_parse_from(["focus-studio", "--duration", "0"]).unwrap();
        assert_eq!(config.timer_settings().unwrap_err(), TimerError::ZeroDuration);
    }

    #[test]
    fn oversized_duration_is_rejected() {
        let config =
            Config::try_parse_from(["focus-studio", "--duration", "18446744073709551615"]).unwrap();
        assert_eq!(
            config.timer_settings().unwrap_err(),
            TimerError::DurationTooLong { minutes: u64::MAX }
        );
    }

    #[test]
    fn overrides_apply() {
        let config = Config::try_parse_from([
            "focus-studio",
            "-d",
            "25",
            "--completion-delay-ms",
            "0",
            "--user-id",
            "u-1",
            "-v",
        ])
        .unwrap();

        assert_eq!(config.timer_settings().unwrap().total_seconds, 1500);
        assert_eq!(config.timing().completion_delay, Duration::ZERO);
        assert_eq!(config.user_id.as_deref(), Some("u-1"));
        assert_eq!(config.log_level(), "debug");
    }
}
