use std::path::PathBuf;
use std::time::Duration;
use clap::Parser;

use crate::config::types::Config;
use crate::report::OutputFormat;

/// Stream grip strength readings from a Squegg over bluetooth.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Advertised device name, or a prefix of it
    #[arg(long)]
    pub name: Option<String>,

    /// How long to scan for the device, e.g. "20s"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// How often to check the connection while streaming, e.g. "3s"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub poll_interval: Option<Duration>,

    /// How often to try connecting before giving up
    #[arg(long)]
    pub attempts: Option<u32>,

    /// Pause between connect attempts, e.g. "500ms"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub retry_delay: Option<Duration>,

    /// Print measurements as json lines
    #[arg(long)]
    pub json: bool,

    /// Write the effective configuration back to the config file
    #[arg(long)]
    pub save_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(name) = &self.name {
            config.target_name = name.clone();
        }
        if let Some(timeout) = self.timeout {
            config.discovery_timeout_secs = timeout.as_secs_f64();
        }
        if let Some(poll_interval) = self.poll_interval {
            config.poll_interval_secs = poll_interval.as_secs_f64();
        }
        if let Some(attempts) = self.attempts {
            config.connect_attempts = attempts;
        }
        if let Some(retry_delay) = self.retry_delay {
            config.retry_delay_secs = retry_delay.as_secs_f64();
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.json { OutputFormat::Json } else { OutputFormat::Text }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let cli = Cli::parse_from(["squegg", "--name", "Squegg_3", "--timeout", "5s", "--attempts", "4", "--retry-delay", "250ms"]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.target_name, "Squegg_3");
        assert_eq!(config.discovery_timeout_secs, 5.0);
        assert_eq!(config.connect_attempts, 4);
        assert_eq!(config.retry_delay_secs, 0.25);
        assert_eq!(config.poll_interval_secs, 3.0);
    }

    #[test]
    fn no_flags_keep_config() {
        let cli = Cli::parse_from(["squegg"]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config, Config::default());
        assert_eq!(cli.output_format(), OutputFormat::Text);
        assert_eq!(cli.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn json_and_verbose() {
        let cli = Cli::parse_from(["squegg", "--json", "-v"]);
        assert_eq!(cli.output_format(), OutputFormat::Json);
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn rejects_bad_durations() {
        assert!(Cli::try_parse_from(["squegg", "--timeout", "soon"]).is_err());
    }
}
