//! Runtime configuration and its command-line surface.

use getopts::Options;
use log::LevelFilter;

/// Knobs that shape a worker's run but never its progress-tracking
/// semantics: channel sizing, diagnostic verbosity, and worker identity in a
/// multi-worker log stream.
#[derive(Clone, Debug)]
pub struct Config {
    /// Bound on every vertex inbox and ack channel.
    pub channel_capacity: usize,
    pub log_level: LevelFilter,
    pub worker_id: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config { channel_capacity: 1024, log_level: LevelFilter::Info, worker_id: 0 }
    }
}

/// Error building a [`Config`] from argv: either `getopts` rejected the
/// arguments, or a flag's value didn't parse.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Parse(String),
    #[error("invalid value {value:?} for --{flag}")]
    InvalidValue { flag: &'static str, value: String },
}

impl Config {
    /// Parses `--channel-capacity`, `--log-level`, and `--worker-id` out of
    /// `args` (excluding argv[0]), falling back to [`Config::default`] for
    /// anything unset.
    pub fn from_args(args: &[String]) -> Result<Config, ConfigError> {
        let mut opts = Options::new();
        opts.optopt("", "channel-capacity", "bound on vertex inbox/ack channels", "N");
        opts.optopt("", "log-level", "off|error|warn|info|debug|trace", "LEVEL");
        opts.optopt("", "worker-id", "identity tag for log output", "N");
        opts.optflag("h", "help", "print this help menu");

        let matches = opts.parse(args).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut config = Config::default();

        if let Some(raw) = matches.opt_str("channel-capacity") {
            config.channel_capacity = raw.parse().map_err(|_| ConfigError::InvalidValue {
                flag: "channel-capacity",
                value: raw,
            })?;
        }

        if let Some(raw) = matches.opt_str("log-level") {
            config.log_level = raw.parse().map_err(|_| ConfigError::InvalidValue {
                flag: "log-level",
                value: raw,
            })?;
        }

        if let Some(raw) = matches.opt_str("worker-id") {
            config.worker_id =
                raw.parse().map_err(|_| ConfigError::InvalidValue { flag: "worker-id", value: raw })?;
        }

        Ok(config)
    }

    /// Usage text for `--help`, in the shape `getopts` expects to format.
    pub fn usage(program: &str) -> String {
        let mut opts = Options::new();
        opts.optopt("", "channel-capacity", "bound on vertex inbox/ack channels", "N");
        opts.optopt("", "log-level", "off|error|warn|info|debug|trace", "LEVEL");
        opts.optopt("", "worker-id", "identity tag for log output", "N");
        opts.optflag("h", "help", "print this help menu");
        opts.usage(&format!("Usage: {} [options]", program))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_no_args() {
        let config = Config::from_args(&[]).unwrap();
        assert_eq!(config.channel_capacity, 1024);
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(config.worker_id, 0);
    }

    #[test]
    fn parses_every_flag() {
        let args: Vec<String> = vec![
            "--channel-capacity".into(),
            "64".into(),
            "--log-level".into(),
            "debug".into(),
            "--worker-id".into(),
            "3".into(),
        ];
        let config = Config::from_args(&args).unwrap();
        assert_eq!(config.channel_capacity, 64);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.worker_id, 3);
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let args: Vec<String> = vec!["--log-level".into(), "noisy".into()];
        assert!(Config::from_args(&args).is_err());
    }
}
