//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the site
//! router. All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the edge router.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// The single hostname all traffic must be served from.
    pub canonical_host: String,

    /// Go modules served as vanity imports, keyed by the first path segment.
    pub modules: BTreeMap<String, ModuleConfig>,

    /// WebFinger identities.
    pub webfinger: WebfingerConfig,

    /// Listener configuration (serve mode).
    pub listener: ListenerConfig,

    /// HTTP server settings (serve mode).
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// A Go module published under the canonical host.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ModuleConfig {
    /// Full import path (e.g., "example.com/oauth2ext").
    pub path: String,

    /// Repository URL announced in the `go-import` tag.
    pub git_url: String,

    /// Fixed browser destination. Empty means "pkg.go.dev, subpaths appended".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub redirect_to: String,
}

/// WebFinger configuration.
///
/// Two shapes are accepted and merged into one registry:
/// `accounts` maps identifiers to links, while the single-owner
/// `email` + `links` pair becomes one more entry keyed by `email`.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct WebfingerConfig {
    /// Identifier (the part after `acct:`) to links.
    pub accounts: BTreeMap<String, Vec<Link>>,

    /// Single-owner identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Links for the single owner.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

impl WebfingerConfig {
    /// Merge both configuration shapes into a single identifier registry.
    ///
    /// On a duplicate identifier the `accounts` entry wins; validation rejects
    /// that case before a config is ever accepted.
    pub fn registry(&self) -> BTreeMap<String, Vec<Link>> {
        let mut registry = self.accounts.clone();
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            registry
                .entry(email.to_string())
                .or_insert_with(|| self.links.clone());
        }
        registry
    }
}

/// A WebFinger link. Forwarded verbatim into responses.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Link {
    pub rel: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// Any other members (`titles`, `properties`, ...), passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Link {
    /// Convenience constructor for the common `rel` + `href` pair.
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            media_type: None,
            href: Some(href.into()),
            extra: serde_json::Map::new(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory served for pass-through requests. Without one, they get a 404.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            static_dir: None,
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_merges_single_owner() {
        let mut config = WebfingerConfig::default();
        config
            .accounts
            .insert("alice@example.com".into(), vec![Link::new("self", "https://a")]);
        config.email = Some("owner@example.com".into());
        config.links = vec![Link::new("issuer", "https://id.example.com")];

        let registry = config.registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry["owner@example.com"][0].rel, "issuer");
    }

    #[test]
    fn test_registry_ignores_empty_email() {
        let config = WebfingerConfig {
            email: Some(String::new()),
            ..Default::default()
        };
        assert!(config.registry().is_empty());
    }

    #[test]
    fn test_link_passes_unknown_members_through() {
        let link: Link = serde_json::from_str(
            r#"{"rel":"self","type":"application/activity+json","href":"https://x","titles":{"en":"Me"}}"#,
        )
        .unwrap();
        assert_eq!(link.media_type.as_deref(), Some("application/activity+json"));
        assert!(link.extra.contains_key("titles"));

        let out = serde_json::to_value(&link).unwrap();
        assert_eq!(out["titles"]["en"], "Me");
        assert_eq!(out["type"], "application/activity+json");
    }
}
