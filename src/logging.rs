//! Logging System
//!
//! Structured logging via `tracing`. The tools' `--debug` option carries the daemon's
//! debug level (legacy 0-9 or a bitmask); it is mapped onto a tracing level filter and
//! installed as the process-wide subscriber.

use std::fmt;
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt as tfmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable holding an `EnvFilter` directive that overrides `--debug`.
pub const LOG_ENV: &str = "IDM_LOG";
/// Environment variable selecting the output format (`text` or `json`).
pub const LOG_FORMAT_ENV: &str = "IDM_LOG_FORMAT";

pub const DEBUG_FATAL: u32 = 0x0010;
pub const DEBUG_CRIT: u32 = 0x0020;
pub const DEBUG_OP: u32 = 0x0040;
pub const DEBUG_MINOR: u32 = 0x0080;
pub const DEBUG_CONF: u32 = 0x0100;
pub const DEBUG_FUNC: u32 = 0x0200;
pub const DEBUG_TRACE_FUNC: u32 = 0x0400;
pub const DEBUG_TRACE_LIBS: u32 = 0x1000;
pub const DEBUG_TRACE_INTERNAL: u32 = 0x2000;
pub const DEBUG_TRACE_ALL: u32 = 0x4000;

/// Debug level as accepted by `--debug`, always stored in bitmask form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugLevel(u32);

impl DebugLevel {
    /// Fatal, critical and operation failures.
    pub const DEFAULT: DebugLevel = DebugLevel(DEBUG_FATAL | DEBUG_CRIT | DEBUG_OP);

    /// Build from the raw integer given on the command line.
    ///
    /// Values 0-9 are legacy levels and are expanded to the matching bitmask.
    /// Negative values mean "unresolved" and yield the default.
    pub fn from_raw(raw: i64) -> Self {
        if raw < 0 {
            return Self::DEFAULT;
        }
        if raw <= 9 {
            return Self::from_legacy(raw as u32);
        }
        match u32::try_from(raw) {
            Ok(mask) => DebugLevel(mask),
            Err(_) => DebugLevel(u32::MAX),
        }
    }

    fn from_legacy(level: u32) -> Self {
        const LEGACY: [u32; 10] = [
            DEBUG_FATAL,
            DEBUG_CRIT,
            DEBUG_OP,
            DEBUG_MINOR,
            DEBUG_CONF,
            DEBUG_FUNC,
            DEBUG_TRACE_FUNC,
            DEBUG_TRACE_LIBS,
            DEBUG_TRACE_INTERNAL,
            DEBUG_TRACE_ALL,
        ];
        let upto = LEGACY.len().min(level as usize + 1);
        DebugLevel(LEGACY[..upto].iter().fold(0, |acc, bit| acc | bit))
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    /// The most verbose tracing level enabled by this mask.
    pub fn level_filter(&self) -> LevelFilter {
        let mask = self.0;
        if mask & (DEBUG_TRACE_LIBS | DEBUG_TRACE_INTERNAL | DEBUG_TRACE_ALL) != 0 {
            LevelFilter::TRACE
        } else if mask & (DEBUG_FUNC | DEBUG_TRACE_FUNC) != 0 {
            LevelFilter::DEBUG
        } else if mask & (DEBUG_MINOR | DEBUG_CONF) != 0 {
            LevelFilter::INFO
        } else if mask & DEBUG_OP != 0 {
            LevelFilter::WARN
        } else if mask & (DEBUG_FATAL | DEBUG_CRIT) != 0 {
            LevelFilter::ERROR
        } else {
            LevelFilter::OFF
        }
    }
}

impl Default for DebugLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Parses integers the way a C `strtol(s, NULL, 0)` option does: decimal, `0x` hex
/// or leading-zero octal, with an optional sign.
impl FromStr for DebugLevel {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_c_integer(s).map(DebugLevel::from_raw)
    }
}

pub(crate) fn parse_c_integer(s: &str) -> Result<i64, std::num::ParseIntError> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16)?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8)?
    } else {
        digits.parse::<i64>()?
    };
    Ok(if negative { -value } else { value })
}

/// Logging configuration for one tool invocation
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level taken from `--debug`
    pub debug_level: DebugLevel,

    /// Output format: json, text (default: text)
    pub format: String,

    /// Enable colored output (text format only)
    pub color: bool,
}

impl LoggingConfig {
    pub fn new(debug_level: DebugLevel) -> Self {
        Self {
            debug_level,
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug_level: DebugLevel::DEFAULT,
            format: "text".to_string(),
            color: false,
        }
    }
}

/// Install the process-wide subscriber. Logs go to stderr so they never mix with
/// command output.
///
/// Priority order (highest to lowest):
/// 1. `IDM_LOG` / `IDM_LOG_FORMAT` environment variables
/// 2. `--debug` level
/// 3. Defaults
///
/// A subscriber installed earlier in the process is left in place.
pub fn init_logging(config: &LoggingConfig) {
    let filter = build_env_filter(config);
    let base_subscriber = Registry::default().with(filter);

    let result = if determine_format(config) == "json" {
        base_subscriber
            .with(
                tfmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        base_subscriber
            .with(
                tfmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized, keeping existing subscriber");
    }
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return filter;
    }
    EnvFilter::default().add_directive(config.debug_level.level_filter().into())
}

fn determine_format(config: &LoggingConfig) -> String {
    if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
        if format == "json" || format == "text" {
            return format;
        }
    }
    config.format.clone()
}
