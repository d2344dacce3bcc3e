//! Process configuration, read once from the environment at startup.
//!
//! Anything required that's missing or malformed is a [ConfigError], and the
//! process refuses to start. Variables set to an empty string count as unset.

use crate::{
    report::auth::BasicAuth,
    slack::{
        api::API_BASE,
        auth::SlackAccessToken,
        channel::{parse_channel_map, ChannelId, ChannelMapError, ChannelRouting},
        message::MessageFormat,
    },
};
use std::{env, fmt, time::Duration};
use url::Url;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub slack_token: SlackAccessToken,
    pub slack_api_base: Url,
    /// Upper bound on each outbound Slack request.
    pub slack_timeout: Duration,
    pub message_format: MessageFormat,
    pub channels: ChannelRouting,
    /// `None` means no webhook will ever be accepted.
    pub basic_auth: Option<BasicAuth>,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { var: &'static str, reason: String },
    ChannelMap(ChannelMapError),
}

impl From<ChannelMapError> for ConfigError {
    fn from(e: ChannelMapError) -> Self {
        ConfigError::ChannelMap(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "${} environment variable is not set", var),
            ConfigError::Invalid { var, reason } => write!(f, "Invalid ${}: {}", var, reason),
            ConfigError::ChannelMap(e) => write!(f, "Invalid $PROJECT_CHANNEL_MAP: {}", e),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::from_lookup(|var| env::var(var).ok())
    }

    /// Build a config from any variable source, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|x| !x.trim().is_empty());
        let require = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));

        let port = match get("PORT") {
            Some(x) => parse(x, "PORT")?,
            None => DEFAULT_PORT,
        };

        let slack_token = SlackAccessToken(require("SLACK_BOT_TOKEN")?);

        let slack_api_base = match get("SLACK_API_BASE") {
            Some(x) => Url::parse(&x).map_err(|e| ConfigError::Invalid {
                var: "SLACK_API_BASE",
                reason: e.to_string(),
            })?,
            None => Url::parse(API_BASE).map_err(|e| ConfigError::Invalid {
                var: "SLACK_API_BASE",
                reason: e.to_string(),
            })?,
        };

        let slack_timeout = match get("SLACK_TIMEOUT_SECS") {
            Some(x) => match parse::<u64>(x, "SLACK_TIMEOUT_SECS")? {
                0 => {
                    return Err(ConfigError::Invalid {
                        var: "SLACK_TIMEOUT_SECS",
                        reason: "must be greater than zero".into(),
                    })
                }
                n => Duration::from_secs(n),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let message_format = match get("SLACK_MESSAGE_FORMAT") {
            Some(x) => x.parse().map_err(|reason| ConfigError::Invalid {
                var: "SLACK_MESSAGE_FORMAT",
                reason,
            })?,
            None => MessageFormat::default(),
        };

        let default_channel = ChannelId(require("DEFAULT_CHANNEL_ID")?.trim().to_owned());
        let map = parse_channel_map(&get("PROJECT_CHANNEL_MAP").unwrap_or_default())?;
        let channels = ChannelRouting::new(map, default_channel);

        let basic_auth = match (get("BASIC_AUTH_USERNAME"), get("BASIC_AUTH_PASSWORD")) {
            (Some(user), Some(pass)) => Some(BasicAuth::new(user, pass)),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("BASIC_AUTH_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("BASIC_AUTH_USERNAME")),
        };

        Ok(Config {
            port,
            slack_token,
            slack_api_base,
            slack_timeout,
            message_format,
            channels,
            basic_auth,
        })
    }
}

fn parse<T>(raw: String, var: &'static str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}
