//! Gate configuration.
//!
//! The defaults reproduce the deployed widget: 50 codes in steps of 3,
//! three attempts, strict session policy, `pfm_*` storage keys.

use crate::codes::{DEFAULT_PREFIX, DEFAULT_STEP, DEFAULT_YEAR};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// What the gate shows when the page loads. Exactly one is active per
/// deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPolicy {
    /// Always start on the lock form. LastGuest is cleared on load and on
    /// page leave.
    #[default]
    Strict,
    /// Skip the lock form when a LastGuest is remembered.
    Sticky,
    /// Always show the lock form, prefilled from LastCredentials if any.
    Prefill,
}

impl SessionPolicy {
    /// Stable name, as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Sticky => "sticky",
            Self::Prefill => "prefill",
        }
    }
}

impl fmt::Display for SessionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "sticky" | "sticky-session" | "sticky_session" => Ok(Self::Sticky),
            "prefill" | "prefill-only" | "prefill_only" => Ok(Self::Prefill),
            _ => Err(ConfigError::InvalidValue {
                key: "WICKET_POLICY",
                value: s.to_string(),
            }),
        }
    }
}

/// Names of the four persisted slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    pub registry: String,
    pub lock_flag: String,
    pub last_guest: String,
    pub last_credentials: String,
}

impl StoreKeys {
    /// Derive slot keys from a namespace (`pfm` → `pfm_codes_registry`, ...).
    pub fn with_namespace(ns: &str) -> Self {
        Self {
            registry: format!("{}_codes_registry", ns),
            lock_flag: format!("{}_lock_blocked", ns),
            last_guest: format!("{}_last_guest", ns),
            last_credentials: format!("{}_last_credentials", ns),
        }
    }
}

/// Configuration for a gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Number of codes in the whitelist
    pub code_count: u32,

    /// Distance between consecutive code suffixes
    pub code_step: u32,

    /// Code prefix (`PFM`)
    pub code_prefix: String,

    /// Code year segment (`2025`)
    pub code_year: String,

    /// Attempts before lockout
    pub max_attempts: u32,

    /// Load-time reconnection policy
    pub policy: SessionPolicy,

    /// Persist raw credentials on success for later prefill
    pub remember_credentials: bool,

    /// Prefix for storage slot keys
    pub key_namespace: String,

    /// Pause before showing the invitation after a first use
    pub welcome_delay: Duration,

    /// Pause before showing the invitation after a reconnect
    pub welcome_back_delay: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            code_count: 50,
            code_step: DEFAULT_STEP,
            code_prefix: DEFAULT_PREFIX.to_string(),
            code_year: DEFAULT_YEAR.to_string(),
            max_attempts: 3,
            policy: SessionPolicy::Strict,
            remember_credentials: false,
            key_namespace: "pfm".to_string(),
            welcome_delay: Duration::from_millis(650),
            welcome_back_delay: Duration::from_millis(450),
        }
    }
}

impl GateConfig {
    /// Default config with a given policy. Prefill turns on credential
    /// remembering, since it has nothing to prefill otherwise.
    pub fn with_policy(policy: SessionPolicy) -> Self {
        Self {
            policy,
            remember_credentials: policy == SessionPolicy::Prefill,
            ..Self::default()
        }
    }

    /// Create config from `WICKET_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let policy = match lookup("WICKET_POLICY") {
            Some(raw) => raw.parse()?,
            None => SessionPolicy::default(),
        };
        let mut config = Self::with_policy(policy);

        if let Some(raw) = lookup("WICKET_CODE_COUNT") {
            config.code_count = parse_number("WICKET_CODE_COUNT", &raw)?;
        }
        if let Some(raw) = lookup("WICKET_CODE_STEP") {
            config.code_step = parse_number("WICKET_CODE_STEP", &raw)?;
        }
        if let Some(raw) = lookup("WICKET_CODE_PREFIX") {
            config.code_prefix = raw.trim().to_uppercase();
        }
        if let Some(raw) = lookup("WICKET_CODE_YEAR") {
            config.code_year = raw.trim().to_string();
        }
        if let Some(raw) = lookup("WICKET_MAX_ATTEMPTS") {
            config.max_attempts = parse_number("WICKET_MAX_ATTEMPTS", &raw)?;
        }
        if let Some(raw) = lookup("WICKET_REMEMBER") {
            config.remember_credentials = parse_bool("WICKET_REMEMBER", &raw)?;
        }
        if let Some(raw) = lookup("WICKET_KEY_NAMESPACE") {
            config.key_namespace = raw.trim().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the gate cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_count == 0 {
            return Err(ConfigError::OutOfRange("code count must be at least 1"));
        }
        if self.code_step == 0 {
            return Err(ConfigError::OutOfRange("code step must be at least 1"));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::OutOfRange("max attempts must be at least 1"));
        }
        if self.key_namespace.is_empty() {
            return Err(ConfigError::OutOfRange("key namespace must not be empty"));
        }
        Ok(())
    }

    /// Storage slot keys for this config.
    pub fn store_keys(&self) -> StoreKeys {
        StoreKeys::with_namespace(&self.key_namespace)
    }
}

fn parse_number(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}
