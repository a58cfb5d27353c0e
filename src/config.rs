//! Runtime configuration loaded from the environment (or a `.env` file).

use crate::error::ConfigError;
use crate::filters::RelevancePolicy;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LISTINGS_URL: &str =
    "https://sssb.se/soka-bostad/sok-ledigt/lediga-bostader/?pagination=0&paginationantal=0";
pub const DEFAULT_SNAPSHOT_PATH: &str = "listings.json";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SETTLE_DELAY_SECS: u64 = 5;
const DEFAULT_EMAIL_DELAY_SECS: u64 = 5;

/// How the listing page is downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Headless Chrome; needed because the page renders client-side.
    Browser,
    /// Plain HTTP GET.
    Http,
}

/// When the snapshot is written relative to notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePolicy {
    /// Only after every notification of the cycle went out. A failed send
    /// leaves the old snapshot, so the listing is retried next run.
    AfterNotify,
    /// Always, even if a send failed. A failed listing is never retried.
    Always,
}

/// What happens to an error that aborts a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Email the error to the recipient and exit normally.
    Email,
    /// Return the error from `main`.
    Propagate,
}

/// SMTP identity and destination.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub sender: String,
    pub app_password: String,
    pub recipient: String,
    pub smtp_host: String,
    /// Pause after each sent email.
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listings_url: String,
    pub snapshot_path: PathBuf,
    pub settle_delay: Duration,
    pub fetch_mode: FetchMode,
    pub relevance: RelevancePolicy,
    pub save_policy: SavePolicy,
    pub error_policy: ErrorPolicy,
    pub mail: MailConfig,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let mail = MailConfig {
            sender: required("SENDER")?,
            app_password: required("APP_PASSWORD")?,
            recipient: required("RECIPIENT")?,
            smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            delay: Duration::from_secs(parse_or(
                &lookup,
                "EMAIL_DELAY_SECS",
                DEFAULT_EMAIL_DELAY_SECS,
            )?),
        };

        Ok(Self {
            listings_url: lookup("LISTINGS_URL").unwrap_or_else(|| DEFAULT_LISTINGS_URL.to_string()),
            snapshot_path: lookup("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH)),
            settle_delay: Duration::from_secs(parse_or(
                &lookup,
                "SETTLE_DELAY_SECS",
                DEFAULT_SETTLE_DELAY_SECS,
            )?),
            fetch_mode: parse_or(&lookup, "FETCH_MODE", FetchMode::Browser)?,
            relevance: parse_or(&lookup, "RELEVANCE_POLICY", RelevancePolicy::Strict)?,
            save_policy: parse_or(&lookup, "SAVE_POLICY", SavePolicy::AfterNotify)?,
            error_policy: parse_or(&lookup, "ERROR_POLICY", ErrorPolicy::Email)?,
            mail,
        })
    }
}

/// Parses `key` when set, `default` otherwise. A set but unparsable value
/// is an error rather than a silent fallback.
fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

impl FromStr for FetchMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "browser" => Ok(Self::Browser),
            "http" => Ok(Self::Http),
            _ => Err(()),
        }
    }
}

impl FromStr for SavePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "after-notify" | "after_notify" => Ok(Self::AfterNotify),
            "always" => Ok(Self::Always),
            _ => Err(()),
        }
    }
}

impl FromStr for ErrorPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "propagate" => Ok(Self::Propagate),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const CREDENTIALS: [(&str, &str); 3] = [
        ("SENDER", "watcher@example.com"),
        ("APP_PASSWORD", "secret"),
        ("RECIPIENT", "me@example.com"),
    ];

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let config = Config::from_lookup(lookup_from(&CREDENTIALS)).unwrap();

        assert_eq!(config.listings_url, DEFAULT_LISTINGS_URL);
        assert_eq!(config.snapshot_path, PathBuf::from("listings.json"));
        assert_eq!(config.settle_delay, Duration::from_secs(5));
        assert_eq!(config.mail.delay, Duration::from_secs(5));
        assert_eq!(config.mail.smtp_host, "smtp.gmail.com");
        assert_eq!(config.fetch_mode, FetchMode::Browser);
        assert_eq!(config.relevance, RelevancePolicy::Strict);
        assert_eq!(config.save_policy, SavePolicy::AfterNotify);
        assert_eq!(config.error_policy, ErrorPolicy::Email);
    }

    #[test]
    fn missing_credential_is_reported_by_name() {
        let err = Config::from_lookup(lookup_from(&CREDENTIALS[..2])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("RECIPIENT")));
    }

    #[test]
    fn policies_parse_case_insensitively() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.extend([
            ("RELEVANCE_POLICY", "Loose"),
            ("SAVE_POLICY", "ALWAYS"),
            ("ERROR_POLICY", "propagate"),
            ("FETCH_MODE", "http"),
            ("SETTLE_DELAY_SECS", "12"),
        ]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.relevance, RelevancePolicy::Loose);
        assert_eq!(config.save_policy, SavePolicy::Always);
        assert_eq!(config.error_policy, ErrorPolicy::Propagate);
        assert_eq!(config.fetch_mode, FetchMode::Http);
        assert_eq!(config.settle_delay, Duration::from_secs(12));
    }

    #[test]
    fn unknown_policy_is_an_error() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("RELEVANCE_POLICY", "whatever"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "RELEVANCE_POLICY", .. }
        ));
    }
}
