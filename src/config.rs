use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;

use crate::catalog::DEFAULT_KEY_PREFIX;
use crate::{NasMetricsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    East1,
    East2,
    East3,
    East4,
    West1,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::East1 => "east-1",
            Region::East2 => "east-2",
            Region::East3 => "east-3",
            Region::East4 => "east-4",
            Region::West1 => "west-1",
        }
    }

    pub fn endpoint(&self) -> String {
        format!("https://nas.jp-{}.api.cloud.nifty.com/", self.as_str())
    }
}

impl FromStr for Region {
    type Err = NasMetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "east-1" => Ok(Region::East1),
            "east-2" => Ok(Region::East2),
            "east-3" => Ok(Region::East3),
            "east-4" => Ok(Region::East4),
            "west-1" => Ok(Region::West1),
            other => Err(NasMetricsError::Configuration(format!(
                "an invalid region was specified: {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Result<Self> {
        let credentials = Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        };
        if credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty() {
            return Err(NasMetricsError::Configuration(
                "access key id and secret access key are required".to_string(),
            ));
        }
        Ok(credentials)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Command line flags, each with an environment fallback.
#[derive(Debug, Clone, Parser)]
#[command(name = "nas_metrics", about = "Reports NIFCLOUD NAS metrics to a monitoring agent")]
pub struct PluginOptions {
    #[arg(long, env = "NIFCLOUD_REGION", default_value = "")]
    pub region: String,

    #[arg(long, env = "NIFCLOUD_ACCESS_KEY_ID", default_value = "", hide_env_values = true)]
    pub access_key_id: String,

    #[arg(long, env = "NIFCLOUD_SECRET_ACCESS_KEY", default_value = "", hide_env_values = true)]
    pub secret_access_key: String,

    /// NAS instance identifier
    #[arg(long, env = "NAS_IDENTIFIER", default_value = "")]
    pub identifier: String,

    #[arg(long, default_value = DEFAULT_KEY_PREFIX)]
    pub metric_key_prefix: String,

    #[arg(long, default_value = "")]
    pub metric_label_prefix: String,

    /// Deadline in seconds for one polling cycle
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Override the region endpoint
    #[arg(long, env = "NAS_ENDPOINT")]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PluginConfig {
    pub region: Region,
    pub credentials: Credentials,
    pub identifier: String,
    pub key_prefix: String,
    pub label_prefix: String,
    pub timeout: Duration,
    pub endpoint: String,
}

impl TryFrom<PluginOptions> for PluginConfig {
    type Error = NasMetricsError;

    fn try_from(options: PluginOptions) -> Result<Self> {
        let region: Region = options.region.parse()?;
        let credentials = Credentials::new(options.access_key_id, options.secret_access_key)?;

        if options.identifier.is_empty() {
            return Err(NasMetricsError::Configuration("identifier is required".to_string()));
        }
        if options.timeout == 0 {
            return Err(NasMetricsError::Configuration("timeout must be positive".to_string()));
        }

        let key_prefix = if options.metric_key_prefix.is_empty() {
            DEFAULT_KEY_PREFIX.to_string()
        } else {
            options.metric_key_prefix
        };
        let label_prefix = label_prefix_for(&key_prefix, &options.metric_label_prefix);
        let endpoint = options.endpoint.unwrap_or_else(|| region.endpoint());

        Ok(Self {
            region,
            credentials,
            identifier: options.identifier,
            key_prefix,
            label_prefix,
            timeout: Duration::from_secs(options.timeout),
            endpoint,
        })
    }
}

/// An explicit label prefix wins. Otherwise the default key prefix maps to
/// "NAS" and any other key prefix is title-cased.
pub fn label_prefix_for(key_prefix: &str, label_prefix: &str) -> String {
    if !label_prefix.is_empty() {
        return label_prefix.to_string();
    }
    if key_prefix == DEFAULT_KEY_PREFIX {
        return "NAS".to_string();
    }
    title_case(key_prefix)
}

/// Upper-cases the first letter of every word. Any character other than a
/// letter, digit or `_` starts a new word.
fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut after_separator = true;
    for c in text.chars() {
        if after_separator {
            titled.extend(c.to_uppercase());
        } else {
            titled.push(c);
        }
        after_separator = is_word_separator(c);
    }
    titled
}

fn is_word_separator(c: char) -> bool {
    if c.is_ascii() {
        !(c.is_ascii_alphanumeric() || c == '_')
    } else if c.is_alphanumeric() {
        false
    } else {
        c.is_whitespace()
    }
}
