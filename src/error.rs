//! Error types for the identity administration tool framework.
//!
//! Lower layers only detect failures and return these values; printing is left to the
//! option parser, the router and the tool entry point.

use std::path::PathBuf;
use thiserror::Error;

use crate::cli::ExitStatus;

/// Configuration store errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to open configuration {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("Malformed configuration: {0}")]
    Malformed(String),

    #[error("No domains configured")]
    NoDomains,

    #[error("Domain '{0}' is listed but has no [domain.\"{0}\"] section")]
    MissingDomainSection(String),

    #[error("Domain '{0}' is listed more than once")]
    DuplicateDomain(String),

    #[error("Invalid value for {section}/{key}: {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Malformed(err.to_string())
    }
}

/// Identity storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Identity database version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Domain not registered in identity storage: {0}")]
    UnknownDomain(String),

    #[error("Identity storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn io(context: &str, err: impl std::fmt::Display) -> Self {
        StoreError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("{}: {}", context, err),
        ))
    }

    pub(crate) fn invalid_data(context: &str, err: impl std::fmt::Display) -> Self {
        StoreError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{}: {}", context, err),
        ))
    }
}

/// Name-parsing rule initialization errors
#[derive(Debug, Error)]
pub enum NamesError {
    #[error("Invalid name expression for domain {domain}: {source}")]
    InvalidExpression {
        domain: String,
        #[source]
        source: regex::Error,
    },

    #[error("Name expression for domain {0} has no `name` capture group")]
    MissingNameGroup(String),

    #[error("Invalid full name format for domain {domain}: {format}")]
    InvalidFormat { domain: String, format: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Fatal bootstrap errors. Any of these means no tool context exists.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Unable to open configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Unable to initialize identity storage: {0}")]
    Storage(#[source] StoreError),

    #[error("Unable to initialize name rules for domain {domain}: {source}")]
    NameRules {
        domain: String,
        #[source]
        source: NamesError,
    },

    #[error("Cannot get the default domain: {0}")]
    DefaultDomain(#[source] ConfigError),
}

impl BootstrapError {
    /// True when storage exists on disk in a format this build cannot use.
    pub fn is_version_mismatch(&self) -> bool {
        matches!(
            self,
            BootstrapError::Storage(StoreError::VersionMismatch { .. })
        )
    }
}

/// Non-fatal bootstrap conditions. Recorded and logged, never abort startup.
#[derive(Debug, Error)]
pub enum BootstrapWarning {
    #[error("Failed to update subdomains for domain {domain}: {source}")]
    SubdomainRefresh {
        domain: String,
        #[source]
        source: StoreError,
    },
}

/// Option parsing outcomes other than success
#[derive(Debug, Error)]
pub enum OptionError {
    #[error("Invalid option {option}: {reason}")]
    InvalidOption { option: String, reason: String },

    #[error("Missing option: {0}")]
    MissingFreeArgument(String),

    #[error("Only one free argument is expected!")]
    TooManyFreeArguments,

    #[error("At least one option is required!")]
    OptionRequired,

    #[error("Option rejected: {0}")]
    Rejected(#[source] anyhow::Error),

    #[error("Help requested")]
    HelpDisplayed,
}

impl OptionError {
    /// Exit status the command should finish with.
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            OptionError::HelpDisplayed => ExitStatus::SUCCESS,
            _ => ExitStatus::FAILURE,
        }
    }
}

/// Name resolution errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Unable to parse name: {0}")]
    Unparseable(String),

    #[error(
        "Unable to find domain {0}. The domain name may be a subdomain that was not yet found."
    )]
    UnknownDomain(String),

    #[error("Name {0} is not fully qualified and no default domain is configured")]
    NoDomain(String),

    #[error("Domain not found: {0}")]
    DomainNotFound(String),
}
