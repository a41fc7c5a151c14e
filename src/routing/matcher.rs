//! Module path matching.
//!
//! # Responsibilities
//! - Map a request path onto the module registered for its first segment
//! - Split off the remainder of the path for subpath redirects
//!
//! # Design Decisions
//! - Module keys are single path segments, so they are disjoint by
//!   construction and one hash lookup replaces a registry scan
//! - `/mod` and `/mod/...` match; `/modx` never matches `/mod`
//! - Path matching is case-sensitive

use std::collections::HashMap;

use crate::routing::gomod::ModuleInfo;

/// Result of a successful module match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleMatch<'a> {
    /// Registry key (the first path segment).
    pub key: &'a str,
    pub module: &'a ModuleInfo,
    /// Everything after `/<key>`: empty, or starting with `/`.
    pub suffix: &'a str,
}

/// First-segment dispatch table for vanity modules.
#[derive(Debug, Clone, Default)]
pub struct ModuleMatcher {
    modules: HashMap<String, ModuleInfo>,
}

impl ModuleMatcher {
    /// Build the table. Keys that cannot be a single segment are dropped.
    pub fn new(modules: impl IntoIterator<Item = (String, ModuleInfo)>) -> Self {
        let modules = modules
            .into_iter()
            .filter(|(key, _)| {
                let usable = !key.is_empty() && !key.contains('/');
                if !usable {
                    tracing::warn!(key = %key, "Ignoring module key that is not a single path segment");
                }
                usable
            })
            .collect();
        Self { modules }
    }

    /// Find the module serving `uri`, if any.
    pub fn match_path<'a>(&'a self, uri: &'a str) -> Option<ModuleMatch<'a>> {
        let rest = uri.strip_prefix('/')?;
        let segment = rest.split_once('/').map_or(rest, |(first, _)| first);
        let (key, module) = self.modules.get_key_value(segment)?;
        Some(ModuleMatch {
            key,
            module,
            suffix: &rest[key.len()..],
        })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
