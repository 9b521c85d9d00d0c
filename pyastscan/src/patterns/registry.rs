//! Static pattern registry.
//!
//! The embedding application resolves pattern names through this table at
//! startup; there is no runtime discovery.

use super::{builtin, custom, resolve_args, Pattern, PatternConfig, PatternInfo};
use crate::errors::ConfigError;

/// Every registered pattern, common group first.
pub static PATTERNS: &[&PatternInfo] = &[
    &builtin::ASSIGN,
    &builtin::ATTR,
    &builtin::CALL,
    &builtin::CLASS,
    &builtin::CONSTANT,
    &builtin::DICT,
    &builtin::DUMP,
    &builtin::FUNCTION,
    &builtin::LIST,
    &builtin::NAME,
    &builtin::PRINT,
    &builtin::TEST,
    &custom::FORELSE,
    &custom::MUTABLE_DEFAULT,
    &custom::REPLACE_WITH_SUBSTRING,
    &custom::UNUSED_CLASSES,
];

/// Looks up a pattern descriptor by name.
#[must_use]
pub fn find(name: &str) -> Option<&'static PatternInfo> {
    PATTERNS.iter().copied().find(|info| info.name == name)
}

/// Builds a configured pattern instance from its registry entry.
pub fn build(config: &PatternConfig) -> Result<Box<dyn Pattern>, ConfigError> {
    let info = find(&config.name)
        .ok_or_else(|| ConfigError::UnknownPattern(config.name.clone()))?;
    let args = resolve_args(info, config)?;
    (info.build)(&args)
}
