//! Property-based tests for routing, option parsing and name splitting

mod name_split;
mod routing;
