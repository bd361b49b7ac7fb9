//! Synthesis configuration with source tracking.
//!
//! Values are layered, lowest precedence first:
//! 1. Defaults
//! 2. Environment variables (`ANNINSERT_UNKNOWN_CONSTRUCTORS`, `ANNINSERT_NO_BYTECODE`)
//! 3. CLI flags
//!
//! Each resolved value remembers which layer it came from.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Environment variable selecting the [`UnknownConstructorPolicy`].
pub const ENV_UNKNOWN_CONSTRUCTORS: &str = "ANNINSERT_UNKNOWN_CONSTRUCTORS";
/// Environment variable that disables bytecode lookups when truthy.
pub const ENV_NO_BYTECODE: &str = "ANNINSERT_NO_BYTECODE";

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From environment variable.
    EnvVar = 1,
    /// From CLI flag (highest precedence).
    CliFlag = 2,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    /// The actual value.
    pub value: T,
    /// Where the value came from.
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    /// Create a new config value with the given source.
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

/// Error for a configuration value that cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}' for {setting}: expected {expected}")]
pub struct ConfigError {
    pub setting: String,
    pub value: String,
    pub expected: String,
}

// ============================================================================
// Settings
// ============================================================================

/// What to do with annotations on `<init>()V` when the bytecode could not
/// say whether the class declares a constructor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownConstructorPolicy {
    /// Leave the annotations as ordinary insertions; write no constructor.
    #[default]
    Suppress,
    /// Assume the constructor is implicit and write one.
    Synthesize,
}

impl UnknownConstructorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnknownConstructorPolicy::Suppress => "suppress",
            UnknownConstructorPolicy::Synthesize => "synthesize",
        }
    }
}

impl fmt::Display for UnknownConstructorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UnknownConstructorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "suppress" => Ok(UnknownConstructorPolicy::Suppress),
            "synthesize" => Ok(UnknownConstructorPolicy::Synthesize),
            _ => Err(ConfigError {
                setting: "unknown-constructors".to_string(),
                value: s.to_string(),
                expected: "suppress or synthesize".to_string(),
            }),
        }
    }
}

/// The immutable settings a synthesis run consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisConfig {
    pub unknown_constructors: UnknownConstructorPolicy,
    /// Ask the constructor oracle about each class.
    pub read_bytecode: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        SynthesisConfig {
            unknown_constructors: UnknownConstructorPolicy::default(),
            read_bytecode: true,
        }
    }
}

// ============================================================================
// Configuration Resolution
// ============================================================================

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// --unknown-constructors flag.
    pub unknown_constructors: Option<UnknownConstructorPolicy>,
    /// --no-bytecode flag.
    pub no_bytecode: bool,
}

/// Resolved configuration with precedence information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub unknown_constructors: ConfigValue<UnknownConstructorPolicy>,
    pub read_bytecode: ConfigValue<bool>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let defaults = SynthesisConfig::default();
        ResolvedConfig {
            unknown_constructors: ConfigValue::new(
                defaults.unknown_constructors,
                ConfigSource::Default,
            ),
            read_bytecode: ConfigValue::new(defaults.read_bytecode, ConfigSource::Default),
        }
    }
}

impl ResolvedConfig {
    /// Resolve configuration from defaults, the process environment and CLI
    /// flags.
    pub fn resolve(cli_overrides: &CliOverrides) -> Result<Self, ConfigError> {
        Self::resolve_with(|name| std::env::var(name).ok(), cli_overrides)
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with<F>(env: F, cli_overrides: &CliOverrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ResolvedConfig::default();
        config.apply_env_vars(&env)?;
        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn apply_env_vars<F>(&mut self, env: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(policy) = env(ENV_UNKNOWN_CONSTRUCTORS) {
            let policy = policy.parse::<UnknownConstructorPolicy>().map_err(|err| ConfigError {
                setting: ENV_UNKNOWN_CONSTRUCTORS.to_string(),
                ..err
            })?;
            self.unknown_constructors = self
                .unknown_constructors
                .clone()
                .merge(ConfigValue::new(policy, ConfigSource::EnvVar));
        }

        if let Some(flag) = env(ENV_NO_BYTECODE) {
            let no_bytecode = parse_flag(ENV_NO_BYTECODE, &flag)?;
            self.read_bytecode = self
                .read_bytecode
                .clone()
                .merge(ConfigValue::new(!no_bytecode, ConfigSource::EnvVar));
        }
        Ok(())
    }

    fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(policy) = overrides.unknown_constructors {
            self.unknown_constructors = ConfigValue::new(policy, ConfigSource::CliFlag);
        }

        if overrides.no_bytecode {
            self.read_bytecode = ConfigValue::new(false, ConfigSource::CliFlag);
        }
    }

    /// The plain settings, without source information.
    pub fn synthesis_config(&self) -> SynthesisConfig {
        SynthesisConfig {
            unknown_constructors: self.unknown_constructors.value,
            read_bytecode: self.read_bytecode.value,
        }
    }
}

fn parse_flag(setting: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError {
            setting: setting.to_string(),
            value: value.to_string(),
            expected: "a boolean (1/0, true/false, yes/no, on/off)".to_string(),
        }),
    }
}
