//! Self-test suite for a site configuration.
//!
//! Builds viewer-request events for every behavior the configuration
//! promises and checks the edge-function responses against them. Meant to be
//! run before publishing a config.

use serde_json::Value;

use crate::config::SiteConfig;
use crate::http::edge::{handle_event, viewer_request_event, EdgeResult};
use crate::routing::gomod::{go_import_tag, refresh_tag, ModuleInfo};
use crate::routing::webfinger::WEBFINGER_PATH;
use crate::routing::router::CONTENT_TYPE_JSON;
use crate::routing::SiteRouter;

const PASS_THROUGH_PROBES: &[&str] = &["/static/style.css", "/robots.txt", "/index.html"];

/// What a case expects back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    Redirect { status: u16, location: String },
    /// A JSON document whose `subject` member equals `subject`.
    Subject { status: u16, subject: String },
    Body {
        status: u16,
        content_type: &'static str,
        contains: Vec<String>,
    },
    PassThrough,
}

/// A single scenario.
#[derive(Debug, Clone)]
pub struct Case {
    pub name: String,
    pub event: Value,
    pub expect: Expectation,
}

impl Case {
    fn new(name: impl Into<String>, event: Value, expect: Expectation) -> Self {
        Self {
            name: name.into(),
            event,
            expect,
        }
    }
}

/// A failed case and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub name: String,
    pub reason: String,
}

/// Outcome of a suite run.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub passed: usize,
    pub failures: Vec<Failure>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Derive the cases a configuration should satisfy.
pub fn suite(config: &SiteConfig) -> Vec<Case> {
    let host = config.canonical_host.as_str();
    let mut cases = Vec::new();

    cases.push(Case::new(
        "canonical host redirect",
        viewer_request_event(&format!("www.{}", host), "/foo", &[]),
        Expectation::Redirect {
            status: 301,
            location: format!("https://{}/foo", host),
        },
    ));

    let registry = config.webfinger.registry();
    for id in registry.keys() {
        let subject = format!("acct:{}", id);
        cases.push(Case::new(
            format!("webfinger {}", id),
            viewer_request_event(host, WEBFINGER_PATH, &[("resource", &subject)]),
            Expectation::Subject {
                status: 200,
                subject: subject.clone(),
            },
        ));
    }
    let mut unknown = format!("unknown@{}", host);
    while registry.contains_key(&unknown) {
        unknown.insert(0, '_');
    }
    cases.push(Case::new(
        "webfinger unknown identity",
        viewer_request_event(host, WEBFINGER_PATH, &[("resource", &format!("acct:{}", unknown))]),
        Expectation::Body {
            status: 404,
            content_type: "text/plain",
            contains: vec!["Not Found".to_string()],
        },
    ));

    for (key, module) in &config.modules {
        let info = ModuleInfo::from(module);
        let destination = info.destination();
        let base = format!("/{}", key);
        let subpath = format!("/{}/subpkg", key);

        cases.push(Case::new(
            format!("module {} go-get", key),
            viewer_request_event(host, &base, &[("go-get", "1")]),
            Expectation::Body {
                status: 200,
                content_type: "text/html; charset=utf-8",
                contains: vec![go_import_tag(&info), refresh_tag(&destination.base)],
            },
        ));
        cases.push(Case::new(
            format!("module {} redirect", key),
            viewer_request_event(host, &base, &[]),
            Expectation::Redirect {
                status: 302,
                location: destination.for_suffix(""),
            },
        ));
        cases.push(Case::new(
            format!("module {} subpackage redirect", key),
            viewer_request_event(host, &subpath, &[]),
            Expectation::Redirect {
                status: 302,
                location: destination.for_suffix("/subpkg"),
            },
        ));
    }

    let probe = PASS_THROUGH_PROBES.iter().find(|path| {
        let segment = path.trim_start_matches('/').split('/').next().unwrap_or_default();
        !config.modules.contains_key(segment)
    });
    if let Some(path) = probe {
        cases.push(Case::new(
            "pass-through",
            viewer_request_event(host, path, &[]),
            Expectation::PassThrough,
        ));
    }

    cases
}

/// Run cases through the edge adapter and collect the results.
pub fn run_suite(router: &SiteRouter, cases: &[Case]) -> Report {
    let mut report = Report::default();
    for case in cases {
        match check(router, case) {
            Ok(()) => {
                tracing::info!(name = %case.name, "Case passed");
                report.passed += 1;
            }
            Err(reason) => {
                tracing::error!(name = %case.name, reason = %reason, "Case failed");
                report.failures.push(Failure {
                    name: case.name.clone(),
                    reason,
                });
            }
        }
    }
    report
}

fn check(router: &SiteRouter, case: &Case) -> Result<(), String> {
    let result = handle_event(router, &case.event.to_string()).map_err(|e| e.to_string())?;

    match (&case.expect, result) {
        (Expectation::PassThrough, EdgeResult::Request(request)) => {
            if request == case.event["request"] {
                Ok(())
            } else {
                Err("pass-through request was modified".to_string())
            }
        }
        (Expectation::PassThrough, EdgeResult::Response(response)) => Err(format!(
            "expected pass-through, got status {}",
            response.status_code
        )),
        (_, EdgeResult::Request(_)) => Err("expected a response, got pass-through".to_string()),
        (Expectation::Redirect { status, location }, EdgeResult::Response(response)) => {
            if response.status_code != *status {
                return Err(format!("expected status {}, got {}", status, response.status_code));
            }
            match response.header("location") {
                Some(actual) if actual == location => Ok(()),
                actual => Err(format!("expected location {}, got {:?}", location, actual)),
            }
        }
        (Expectation::Subject { status, subject }, EdgeResult::Response(response)) => {
            if response.status_code != *status {
                return Err(format!("expected status {}, got {}", status, response.status_code));
            }
            if response.header("content-type") != Some(CONTENT_TYPE_JSON) {
                return Err(format!(
                    "expected content type {}, got {:?}",
                    CONTENT_TYPE_JSON,
                    response.header("content-type")
                ));
            }
            let data = response.body.map(|b| b.data).unwrap_or_default();
            let document: Value =
                serde_json::from_str(&data).map_err(|e| format!("body is not JSON: {}", e))?;
            match document.get("subject").and_then(Value::as_str) {
                Some(actual) if actual == subject => Ok(()),
                actual => Err(format!("expected subject {}, got {:?}", subject, actual)),
            }
        }
        (
            Expectation::Body {
                status,
                content_type,
                contains,
            },
            EdgeResult::Response(response),
        ) => {
            if response.status_code != *status {
                return Err(format!("expected status {}, got {}", status, response.status_code));
            }
            if response.header("content-type") != Some(*content_type) {
                return Err(format!(
                    "expected content type {}, got {:?}",
                    content_type,
                    response.header("content-type")
                ));
            }
            let data = response.body.map(|b| b.data).unwrap_or_default();
            match contains.iter().find(|needle| !data.contains(needle.as_str())) {
                Some(missing) => Err(format!("body does not contain {}", missing)),
                None => Ok(()),
            }
        }
    }
}
