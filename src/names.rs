//! Name parsing: per-domain rules for splitting user-supplied names, and the resolver
//! that picks a short name and a target domain out of the whole domain registry.

mod resolve;
mod rules;

pub use resolve::{resolve_name, split_name_for_domains, ResolvedName};
pub use rules::{NameRules, ParsedName, DEFAULT_FULL_NAME_FORMAT, DEFAULT_RE_EXPRESSION};
