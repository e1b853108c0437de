//! Per-domain name parsing rules.
//!
//! A rule set is a regular expression with a `name` capture group and an optional
//! `domain` group, plus the format used to build fully qualified names. Domain sections
//! may override the `[general]` values, which in turn override the built-in defaults.

use regex::Regex;

use crate::config::{domain_section, ConfigStore, GENERAL_SECTION, KEY_FULL_NAME_FORMAT, KEY_RE_EXPRESSION};
use crate::error::NamesError;

/// Accepts `name` and `name@domain`.
pub const DEFAULT_RE_EXPRESSION: &str = r"^(?P<name>[^@]+)(?:@(?P<domain>[^@]+))?$";

/// `%1$s` is the short name, `%2$s` the domain name.
pub const DEFAULT_FULL_NAME_FORMAT: &str = "%1$s@%2$s";

const NAME_GROUP: &str = "name";
const DOMAIN_GROUP: &str = "domain";
const NAME_PLACEHOLDER: &str = "%1$s";
const DOMAIN_PLACEHOLDER: &str = "%2$s";

/// Result of splitting one input string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedName<'a> {
    pub name: &'a str,
    pub domain: Option<&'a str>,
}

/// Compiled name parsing rules for one domain
#[derive(Debug, Clone)]
pub struct NameRules {
    expression: Regex,
    full_name_format: String,
}

impl NameRules {
    /// Compile a rule set. `domain` is only used for error reporting.
    pub fn new(domain: &str, expression: &str, full_name_format: &str) -> Result<Self, NamesError> {
        let expression = Regex::new(expression).map_err(|source| NamesError::InvalidExpression {
            domain: domain.to_string(),
            source,
        })?;

        if !expression.capture_names().flatten().any(|n| n == NAME_GROUP) {
            return Err(NamesError::MissingNameGroup(domain.to_string()));
        }

        if !full_name_format.contains(NAME_PLACEHOLDER) {
            return Err(NamesError::InvalidFormat {
                domain: domain.to_string(),
                format: full_name_format.to_string(),
            });
        }

        Ok(Self {
            expression,
            full_name_format: full_name_format.to_string(),
        })
    }

    /// Load the rules for `domain` from configuration.
    pub fn init(config: &dyn ConfigStore, domain: &str) -> Result<Self, NamesError> {
        let section = domain_section(domain);

        let expression = match config.get_string(&section, KEY_RE_EXPRESSION)? {
            Some(value) => value,
            None => config.get_string_or(GENERAL_SECTION, KEY_RE_EXPRESSION, DEFAULT_RE_EXPRESSION)?,
        };
        let full_name_format = match config.get_string(&section, KEY_FULL_NAME_FORMAT)? {
            Some(value) => value,
            None => config.get_string_or(
                GENERAL_SECTION,
                KEY_FULL_NAME_FORMAT,
                DEFAULT_FULL_NAME_FORMAT,
            )?,
        };

        tracing::trace!(domain, expression = %expression, format = %full_name_format, "Name rules loaded");
        Self::new(domain, &expression, &full_name_format)
    }

    pub fn expression(&self) -> &str {
        self.expression.as_str()
    }

    pub fn full_name_format(&self) -> &str {
        &self.full_name_format
    }

    /// Split `input`. `None` when the expression does not match or captures an empty name.
    pub fn parse<'a>(&self, input: &'a str) -> Option<ParsedName<'a>> {
        let captures = self.expression.captures(input)?;
        let name = captures.name(NAME_GROUP)?.as_str();
        if name.is_empty() {
            return None;
        }
        let domain = captures
            .name(DOMAIN_GROUP)
            .map(|m| m.as_str())
            .filter(|d| !d.is_empty());
        Some(ParsedName { name, domain })
    }

    /// Build a fully qualified name from a short name and a domain name.
    pub fn fully_qualified(&self, name: &str, domain: &str) -> String {
        self.full_name_format
            .replace(NAME_PLACEHOLDER, name)
            .replace(DOMAIN_PLACEHOLDER, domain)
    }
}
