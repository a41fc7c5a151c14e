//! Go module vanity imports.
//!
//! A `go get` for a vanity path fetches `https://<host>/<path>?go-get=1` and
//! reads the `go-import` meta tag to find the repository. Browsers hitting the
//! same path are sent to documentation instead.

use std::borrow::Cow;

use crate::config::ModuleConfig;

/// Documentation host used when a module has no fixed redirect.
pub const GODOC_BASE: &str = "https://pkg.go.dev/";

/// Routing view of a configured module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Full import path (e.g., "example.com/oauth2ext").
    pub path: String,
    pub git_url: String,
    /// Fixed browser destination. `None` sends browsers to pkg.go.dev.
    pub redirect_to: Option<String>,
}

impl ModuleInfo {
    pub fn new(path: impl Into<String>, git_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            git_url: git_url.into(),
            redirect_to: None,
        }
    }

    pub fn with_redirect(mut self, target: impl Into<String>) -> Self {
        let target = target.into();
        self.redirect_to = (!target.is_empty()).then_some(target);
        self
    }

    /// Where browsers and the refresh tag should end up.
    pub fn destination(&self) -> Destination {
        match &self.redirect_to {
            Some(target) => Destination {
                base: target.clone(),
                fixed: true,
            },
            None => Destination {
                base: format!("{}{}", GODOC_BASE, self.path),
                fixed: false,
            },
        }
    }
}

impl From<&ModuleConfig> for ModuleInfo {
    fn from(config: &ModuleConfig) -> Self {
        ModuleInfo::new(&config.path, &config.git_url).with_redirect(&config.redirect_to)
    }
}

/// Redirect base for a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub base: String,
    /// A fixed destination never receives the request's subpath.
    pub fixed: bool,
}

impl Destination {
    /// Final browser target for a request whose path continues with `suffix`.
    pub fn for_suffix(&self, suffix: &str) -> String {
        if self.fixed {
            self.base.clone()
        } else {
            format!("{}{}", self.base, suffix)
        }
    }
}

/// The `go-import` meta tag for `module`, attributes escaped.
pub fn go_import_tag(module: &ModuleInfo) -> String {
    format!(
        "<meta name=\"go-import\" content=\"{} git {}\">",
        escape_attr(&module.path),
        escape_attr(&module.git_url)
    )
}

/// The refresh meta tag sending browsers on to `target`.
pub fn refresh_tag(target: &str) -> String {
    format!(
        "<meta http-equiv=\"refresh\" content=\"0; url={}\">",
        escape_attr(target)
    )
}

/// Render the page answering `?go-get=1`.
///
/// The page always announces the repository and always refreshes to
/// `target`, whether or not the destination is fixed.
pub fn render_go_import_page(module: &ModuleInfo, target: &str) -> String {
    let link = escape_attr(target);

    let mut html = String::with_capacity(512);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_attr(&module.path)));
    html.push_str(&go_import_tag(module));
    html.push('\n');
    html.push_str(&refresh_tag(target));
    html.push('\n');
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!(
        "Redirecting to <a href=\"{}\">{}</a>...\n",
        link, link
    ));
    html.push_str("</body>\n</html>\n");
    html
}

fn escape_attr(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
