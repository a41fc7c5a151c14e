//! WebFinger identity lookup.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::Link;

/// Path WebFinger clients query.
pub const WEBFINGER_PATH: &str = "/.well-known/webfinger";

const ACCT_SCHEME: &str = "acct:";

/// JSON document returned for a known identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebfingerDocument<'a> {
    pub subject: String,
    pub links: &'a [Link],
}

/// Identifier → links lookup table.
#[derive(Debug, Clone, Default)]
pub struct WebfingerRegistry {
    accounts: HashMap<String, Vec<Link>>,
}

impl WebfingerRegistry {
    pub fn new(accounts: impl IntoIterator<Item = (String, Vec<Link>)>) -> Self {
        Self {
            accounts: accounts.into_iter().collect(),
        }
    }

    /// Resolve a `resource` query value. Absent resources arrive as `""`.
    pub fn lookup(&self, resource: &str) -> Option<WebfingerDocument<'_>> {
        let identifier = identifier_from_resource(resource);
        self.accounts
            .get(identifier)
            .map(|links| WebfingerDocument {
                subject: format!("{}{}", ACCT_SCHEME, identifier),
                links,
            })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Strip an `acct:` prefix; anything else is used as-is.
pub fn identifier_from_resource(resource: &str) -> &str {
    resource.strip_prefix(ACCT_SCHEME).unwrap_or(resource)
}
