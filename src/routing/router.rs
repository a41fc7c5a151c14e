//! Request routing decisions.
//!
//! # Responsibilities
//! - Enforce the canonical host before anything else
//! - Answer WebFinger lookups
//! - Resolve Go vanity import paths
//! - Signal pass-through for everything else
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Pure: the same request and router always yield the same outcome
//! - First matching rule wins; rules are checked in a fixed order
//! - Explicit PassThrough rather than a silent default response

use std::collections::HashMap;

use axum::http::StatusCode;

use crate::config::SiteConfig;
use crate::routing::gomod::{render_go_import_page, ModuleInfo};
use crate::routing::matcher::ModuleMatcher;
use crate::routing::webfinger::{WebfingerRegistry, WEBFINGER_PATH};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// The parts of an inbound request the router looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeRequest {
    pub host: String,
    /// Path only, without the query string.
    pub uri: String,
    /// Query parameters, one value per name.
    pub query: HashMap<String, String>,
}

impl EdgeRequest {
    pub fn new(host: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            uri: uri.into(),
            query: HashMap::new(),
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// A query parameter, or `""` when absent.
    pub fn query_param(&self, name: &str) -> &str {
        self.query.get(name).map(String::as_str).unwrap_or("")
    }
}

/// What to do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Redirect { status: StatusCode, location: String },
    Json { status: StatusCode, body: String },
    Html { status: StatusCode, body: String },
    PlainText { status: StatusCode, body: String },
    /// Forward the original request, unmodified, to the next stage.
    PassThrough,
}

impl Outcome {
    fn not_found() -> Self {
        Outcome::PlainText {
            status: StatusCode::NOT_FOUND,
            body: "Not Found".to_string(),
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Redirect { .. } => "redirect",
            Outcome::Json { .. } => "json",
            Outcome::Html { .. } => "html",
            Outcome::PlainText { .. } => "text",
            Outcome::PassThrough => "pass_through",
        }
    }

    /// Status code, or `None` for pass-through.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Outcome::Redirect { status, .. }
            | Outcome::Json { status, .. }
            | Outcome::Html { status, .. }
            | Outcome::PlainText { status, .. } => Some(*status),
            Outcome::PassThrough => None,
        }
    }

    /// Content type of the body, for outcomes that carry one.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Outcome::Json { .. } => Some(CONTENT_TYPE_JSON),
            Outcome::Html { .. } => Some(CONTENT_TYPE_HTML),
            Outcome::PlainText { .. } => Some(CONTENT_TYPE_TEXT),
            Outcome::Redirect { .. } | Outcome::PassThrough => None,
        }
    }
}

/// Compiled, read-only routing tables.
#[derive(Debug, Clone)]
pub struct SiteRouter {
    canonical_host: String,
    webfinger: WebfingerRegistry,
    modules: ModuleMatcher,
}

impl SiteRouter {
    pub fn new(
        canonical_host: impl Into<String>,
        webfinger: WebfingerRegistry,
        modules: ModuleMatcher,
    ) -> Self {
        Self {
            canonical_host: canonical_host.into(),
            webfinger,
            modules,
        }
    }

    /// Compile a router from a validated configuration.
    pub fn from_config(config: &SiteConfig) -> Self {
        let modules = config
            .modules
            .iter()
            .map(|(key, module)| (key.clone(), ModuleInfo::from(module)));
        Self::new(
            config.canonical_host.clone(),
            WebfingerRegistry::new(config.webfinger.registry()),
            ModuleMatcher::new(modules),
        )
    }

    pub fn canonical_host(&self) -> &str {
        &self.canonical_host
    }

    pub fn modules(&self) -> &ModuleMatcher {
        &self.modules
    }

    pub fn webfinger(&self) -> &WebfingerRegistry {
        &self.webfinger
    }

    /// Decide the outcome for a request.
    pub fn route(&self, req: &EdgeRequest) -> Outcome {
        if req.host != self.canonical_host {
            return Outcome::Redirect {
                status: StatusCode::MOVED_PERMANENTLY,
                location: format!("https://{}{}", self.canonical_host, req.uri),
            };
        }

        if req.uri == WEBFINGER_PATH {
            return self.resolve_webfinger(req.query_param("resource"));
        }

        if let Some(hit) = self.modules.match_path(&req.uri) {
            let destination = hit.module.destination();

            if req.query_param("go-get") == "1" {
                return Outcome::Html {
                    status: StatusCode::OK,
                    body: render_go_import_page(hit.module, &destination.base),
                };
            }

            return Outcome::Redirect {
                status: StatusCode::FOUND,
                location: destination.for_suffix(hit.suffix),
            };
        }

        Outcome::PassThrough
    }

    fn resolve_webfinger(&self, resource: &str) -> Outcome {
        let Some(document) = self.webfinger.lookup(resource) else {
            return Outcome::not_found();
        };
        match serde_json::to_string(&document) {
            Ok(body) => Outcome::Json {
                status: StatusCode::OK,
                body,
            },
            Err(e) => {
                tracing::error!(error = %e, subject = %document.subject, "Failed to encode webfinger response");
                Outcome::PlainText {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "Internal Server Error".to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Link, ModuleConfig};

    fn router() -> SiteRouter {
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
        config.modules.insert(
            "mod".into(),
            ModuleConfig {
                path: "example.com/mod".into(),
                git_url: "https://github.com/x/mod".into(),
                redirect_to: "https://docs.example.org".into(),
            },
        );
        config
            .webfinger
            .accounts
            .insert("alice@example.com".into(), vec![Link::new("self", "https://x")]);
        SiteRouter::from_config(&config)
    }

    fn location(outcome: &Outcome) -> &str {
        match outcome {
            Outcome::Redirect { location, .. } => location,
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[test]
    fn test_host_mismatch_redirects_everything() {
        let router = router();
        for uri in ["/", "/foo", WEBFINGER_PATH, "/oauth2ext", "/oauth2ext/sub"] {
            let req = EdgeRequest::new("www.example.com", uri).with_query("go-get", "1");
            let outcome = router.route(&req);
            assert_eq!(outcome.status(), Some(StatusCode::MOVED_PERMANENTLY));
            assert_eq!(location(&outcome), format!("https://example.com{}", uri));
        }
    }

    #[test]
    fn test_host_match_is_exact() {
        let router = router();
        let outcome = router.route(&EdgeRequest::new("EXAMPLE.COM", "/foo"));
        assert_eq!(location(&outcome), "https://example.com/foo");
    }

    #[test]
    fn test_webfinger_known() {
        let router = router();
        let req = EdgeRequest::new("example.com", WEBFINGER_PATH)
            .with_query("resource", "acct:alice@example.com");
        assert_eq!(
            router.route(&req),
            Outcome::Json {
                status: StatusCode::OK,
                body: r#"{"subject":"acct:alice@example.com","links":[{"rel":"self","href":"https://x"}]}"#
                    .to_string(),
            }
        );
    }

    #[test]
    fn test_webfinger_unknown_or_missing() {
        let router = router();
        let unknown = EdgeRequest::new("example.com", WEBFINGER_PATH)
            .with_query("resource", "acct:bob@example.com");
        let missing = EdgeRequest::new("example.com", WEBFINGER_PATH);
        for req in [unknown, missing] {
            let outcome = router.route(&req);
            assert_eq!(
                outcome,
                Outcome::PlainText {
                    status: StatusCode::NOT_FOUND,
                    body: "Not Found".into()
                }
            );
            assert_eq!(outcome.content_type(), Some(CONTENT_TYPE_TEXT));
        }
    }

    #[test]
    fn test_webfinger_subpath_passes_through() {
        let router = router();
        let req = EdgeRequest::new("example.com", "/.well-known/webfinger/x");
        assert_eq!(router.route(&req), Outcome::PassThrough);
    }

    #[test]
    fn test_go_get_page() {
        let router = router();
        let req = EdgeRequest::new("example.com", "/oauth2ext/sub").with_query("go-get", "1");
        match router.route(&req) {
            Outcome::Html { status, body } => {
                assert_eq!(status, StatusCode::OK);
                assert!(body.contains(
                    r#"<meta name="go-import" content="example.com/oauth2ext git https://github.com/x/y">"#
                ));
                assert!(body.contains("url=https://pkg.go.dev/example.com/oauth2ext\""));
            }
            other => panic!("expected html, got {:?}", other),
        }
    }

    #[test]
    fn test_go_get_page_for_fixed_module_refreshes_to_fixed_target() {
        let router = router();
        let req = EdgeRequest::new("example.com", "/mod").with_query("go-get", "1");
        match router.route(&req) {
            Outcome::Html { body, .. } => {
                assert!(body.contains("content=\"example.com/mod git https://github.com/x/mod\""));
                assert!(body.contains("url=https://docs.example.org\""));
            }
            other => panic!("expected html, got {:?}", other),
        }
    }

    #[test]
    fn test_go_get_requires_literal_one() {
        let router = router();
        for value in ["true", "", "01", "1 "] {
            let req = EdgeRequest::new("example.com", "/oauth2ext").with_query("go-get", value);
            assert_eq!(router.route(&req).status(), Some(StatusCode::FOUND), "go-get={:?}", value);
        }
    }

    #[test]
    fn test_browser_redirects() {
        let router = router();
        let cases = [
            ("/oauth2ext", "https://pkg.go.dev/example.com/oauth2ext"),
            ("/oauth2ext/sub", "https://pkg.go.dev/example.com/oauth2ext/sub"),
            ("/mod", "https://docs.example.org"),
            ("/mod/anything", "https://docs.example.org"),
        ];
        for (uri, expected) in cases {
            let outcome = router.route(&EdgeRequest::new("example.com", uri));
            assert_eq!(outcome.status(), Some(StatusCode::FOUND));
            assert_eq!(location(&outcome), expected);
        }
    }

    #[test]
    fn test_unmatched_passes_through() {
        let router = router();
        for uri in ["/", "/static/style.css", "/oauth2extra", "/modx/y"] {
            assert_eq!(router.route(&EdgeRequest::new("example.com", uri)), Outcome::PassThrough);
        }
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::PassThrough.kind(), "pass_through");
        assert_eq!(Outcome::PassThrough.status(), None);
        assert_eq!(Outcome::not_found().kind(), "text");
    }
}
