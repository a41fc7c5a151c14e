//! Shared fixtures for integration tests.

use edge_router::config::{parse_config, SiteConfig};

pub const SITE_TOML: &str = r#"
canonical_host = "example.com"

[modules.oauth2ext]
path = "example.com/oauth2ext"
git_url = "https://github.com/x/y"

[modules.mod]
path = "example.com/mod"
git_url = "https://github.com/x/mod"
redirect_to = "https://docs.example.org"

[[webfinger.accounts."alice@example.com"]]
rel = "self"
href = "https://x"
"#;

/// The sample site, parsed and validated.
pub fn sample_config() -> SiteConfig {
    let config = parse_config(SITE_TOML).expect("sample config parses");
    edge_router::config::validate_config(&config).expect("sample config is valid");
    config
}

/// The sample site served from `canonical_host`.
#[allow(dead_code)]
pub fn config_for_host(canonical_host: &str) -> SiteConfig {
    let mut config = sample_config();
    config.canonical_host = canonical_host.to_string();
    config
}
