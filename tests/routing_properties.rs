//! Property tests for the routing rules.

use edge_router::routing::webfinger::WEBFINGER_PATH;
use edge_router::{EdgeRequest, Outcome, SiteRouter};
use axum::http::StatusCode;
use proptest::prelude::*;

mod common;

fn router() -> SiteRouter {
    SiteRouter::from_config(&common::sample_config())
}

fn any_uri() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(WEBFINGER_PATH.to_string()),
        "/(oauth2ext|mod)(/[a-z0-9]{1,8}){0,3}",
        "/[a-zA-Z0-9._-]{0,12}(/[a-z0-9]{1,8}){0,3}",
    ]
}

proptest! {
    /// Any host but the canonical one is redirected, whatever the path.
    #[test]
    fn prop_wrong_host_always_redirects(
        host in "[a-z]{1,10}\\.[a-z]{2,5}",
        uri in any_uri(),
        go_get in proptest::option::of(Just("1")),
    ) {
        prop_assume!(host != "example.com");
        let mut req = EdgeRequest::new(host, uri.clone());
        if let Some(v) = go_get {
            req = req.with_query("go-get", v);
        }
        prop_assert_eq!(
            router().route(&req),
            Outcome::Redirect {
                status: StatusCode::MOVED_PERMANENTLY,
                location: format!("https://example.com{}", uri),
            }
        );
    }

    /// Routing is a pure function of its input.
    #[test]
    fn prop_routing_is_idempotent(
        uri in any_uri(),
        resource in "(acct:)?[a-z]{1,6}@example\\.com",
        go_get in "(1|0|true|)",
    ) {
        let router = router();
        let req = EdgeRequest::new("example.com", uri)
            .with_query("resource", resource)
            .with_query("go-get", go_get);
        prop_assert_eq!(router.route(&req), router.route(&req));
    }

    /// Paths outside the webfinger endpoint and module prefixes pass through.
    #[test]
    fn prop_unmatched_paths_pass_through(
        segment in "[a-z0-9]{1,12}",
        rest in "(/[a-z0-9]{1,8}){0,3}",
    ) {
        prop_assume!(segment != "oauth2ext" && segment != "mod");
        let req = EdgeRequest::new("example.com", format!("/{}{}", segment, rest));
        prop_assert_eq!(router().route(&req), Outcome::PassThrough);
    }

    /// Module keys only match whole path segments.
    #[test]
    fn prop_module_prefix_needs_separator(tail in "[a-z0-9]{1,8}") {
        let req = EdgeRequest::new("example.com", format!("/mod{}", tail));
        prop_assert_eq!(router().route(&req), Outcome::PassThrough);
    }
}
