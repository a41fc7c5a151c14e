//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the canonical host and every URL is well-formed
//! - Keep module keys usable as a single path segment
//! - Detect conflicting webfinger identities
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::SiteConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_canonical_host(&config.canonical_host, &mut errors);

    for (key, module) in &config.modules {
        let field = format!("modules.{}", key);
        if key.is_empty() {
            errors.push(ValidationError::new(&field, "module key must not be empty"));
        }
        if key.contains('/') {
            errors.push(ValidationError::new(&field, "module key must be a single path segment"));
        }
        if module.path.is_empty() {
            errors.push(ValidationError::new(format!("{}.path", field), "must not be empty"));
        }
        check_absolute_url(&module.git_url, format!("{}.git_url", field), &mut errors);
        if !module.redirect_to.is_empty() {
            check_absolute_url(&module.redirect_to, format!("{}.redirect_to", field), &mut errors);
        }
    }

    let webfinger = &config.webfinger;
    for (id, links) in &webfinger.accounts {
        let field = format!("webfinger.accounts.{}", id);
        if id.is_empty() {
            errors.push(ValidationError::new(&field, "identifier must not be empty"));
        }
        for (i, link) in links.iter().enumerate() {
            if link.rel.is_empty() {
                errors.push(ValidationError::new(format!("{}[{}].rel", field, i), "must not be empty"));
            }
        }
    }
    match webfinger.email.as_deref() {
        Some("") => errors.push(ValidationError::new("webfinger.email", "must not be empty")),
        Some(email) if webfinger.accounts.contains_key(email) => errors.push(ValidationError::new(
            "webfinger.email",
            format!("identifier {} is also listed under webfinger.accounts", email),
        )),
        Some(_) => {}
        None if !webfinger.links.is_empty() => {
            errors.push(ValidationError::new("webfinger.links", "requires webfinger.email"))
        }
        None => {}
    }
    for (i, link) in webfinger.links.iter().enumerate() {
        if link.rel.is_empty() {
            errors.push(ValidationError::new(format!("webfinger.links[{}].rel", i), "must not be empty"));
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("invalid socket address: {}", config.listener.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be greater than 0"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address: {}", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_canonical_host(host: &str, errors: &mut Vec<ValidationError>) {
    if host.is_empty() {
        errors.push(ValidationError::new("canonical_host", "must not be empty"));
        return;
    }
    let valid = !host.contains(['/', '?', '#', '@'])
        && Url::parse(&format!("https://{}/", host))
            .map(|u| u.host_str().is_some())
            .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::new(
            "canonical_host",
            format!("not a bare hostname: {}", host),
        ));
    }
}

fn check_absolute_url(value: &str, field: String, errors: &mut Vec<ValidationError>) {
    match Url::parse(value) {
        Ok(url) if url.has_host() => {}
        Ok(_) => errors.push(ValidationError::new(field, format!("URL has no host: {}", value))),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL {:?}: {}", value, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{Link, ModuleConfig};

    fn valid_config() -> SiteConfig {
        let mut config = SiteConfig {
            canonical_host: "example.com".into(),
            ..Default::default()
        };
        config.modules.insert(
            "oauth2ext".into(),
            ModuleConfig {
                path: "example.com/oauth2ext".into(),
                git_url: "https://github.com/x/y".into(),
                redirect_to: String::new(),
            },
        );
        config
            .webfinger
            .accounts
            .insert("alice@example.com".into(), vec![Link::new("self", "https://x")]);
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_canonical_host_with_port_is_accepted() {
        let mut config = valid_config();
        config.canonical_host = "localhost:8080".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.canonical_host = "https://example.com".into();
        config.modules.insert(
            "a/b".into(),
            ModuleConfig {
                path: String::new(),
                git_url: "not a url".into(),
                redirect_to: "also not".into(),
            },
        );
        config.listener.bind_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"canonical_host"));
        assert!(fields.contains(&"modules.a/b"));
        assert!(fields.contains(&"modules.a/b.path"));
        assert!(fields.contains(&"modules.a/b.git_url"));
        assert!(fields.contains(&"modules.a/b.redirect_to"));
        assert!(fields.contains(&"listener.bind_address"));
    }

    #[test]
    fn test_empty_canonical_host_rejected() {
        let mut config = valid_config();
        config.canonical_host.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "canonical_host: must not be empty");
    }

    #[test]
    fn test_links_without_email_rejected() {
        let mut config = valid_config();
        config.webfinger.links.push(Link::new("self", "https://x"));
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "webfinger.links");
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let mut config = valid_config();
        config.webfinger.email = Some("alice@example.com".into());
        config.webfinger.links.push(Link::new("self", "https://y"));
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "webfinger.email");
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = valid_config();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
