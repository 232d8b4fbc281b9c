//! Refresh cookie descriptor and the request facts used to shape it.

use std::fmt;

use cookie::Cookie;
use tg_shared::config::RefreshCookieConfig;
use url::{Origin, Url};

pub use cookie::SameSite;

/// Parse a configured `SameSite` value; unknown values fall back to `Lax`
pub fn parse_same_site(value: &str) -> SameSite {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}

/// Header values needed to tell a cross-site request from a same-site one
#[derive(Debug, Clone, Default)]
pub struct RequestOrigin {
    /// `Origin` header
    pub origin: Option<String>,
    /// `Referer` header, consulted when `Origin` is absent
    pub referer: Option<String>,
    /// `Host` header of this backend
    pub host: Option<String>,
    /// Whether the request arrived over TLS
    pub is_secure: bool,
}

impl RequestOrigin {
    /// Whether the calling page lives on another scheme, host or port.
    ///
    /// Requests without `Origin`/`Referer`, or with values that cannot be
    /// parsed, count as same-site.
    pub fn is_cross_site(&self) -> bool {
        let caller = match self
            .origin
            .as_deref()
            .or(self.referer.as_deref())
            .and_then(web_origin)
        {
            Some(origin) => origin,
            None => return false,
        };

        let scheme = if self.is_secure { "https" } else { "http" };
        let host = match self.host.as_deref().map(str::trim) {
            Some(host) if !host.is_empty() => host,
            _ => return false,
        };
        match web_origin(&format!("{}://{}", scheme, host)) {
            Some(backend) => caller != backend,
            None => false,
        }
    }
}

/// Tuple origin (scheme, host, effective port) of an http(s) URL
fn web_origin(value: &str) -> Option<Origin> {
    let url = Url::parse(value.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    Some(url.origin())
}

/// Transport-agnostic `Set-Cookie` descriptor for the refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCookie {
    pub name: String,
    pub value: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    pub domain: Option<String>,
    /// Seconds; zero deletes the cookie
    pub max_age_secs: i64,
}

impl RefreshCookie {
    /// Cookie carrying `refresh_token` for `max_age_secs`.
    ///
    /// Cross-site requests get `SameSite=None`, which browsers only accept
    /// together with `Secure`.
    pub fn issue(
        config: &RefreshCookieConfig,
        refresh_token: impl Into<String>,
        max_age_secs: i64,
        cross_site: bool,
    ) -> Self {
        let same_site = if cross_site {
            SameSite::None
        } else {
            parse_same_site(&config.same_site)
        };

        Self {
            name: config.name.clone(),
            value: refresh_token.into(),
            http_only: true,
            secure: config.secure || same_site == SameSite::None,
            same_site,
            path: config.path.clone(),
            domain: config.domain.clone().filter(|d| !d.trim().is_empty()),
            max_age_secs: max_age_secs.max(0),
        }
    }

    /// Cookie that clears the refresh token
    pub fn deletion(config: &RefreshCookieConfig) -> Self {
        Self::issue(config, "", 0, false)
    }

    pub fn is_deletion(&self) -> bool {
        self.max_age_secs == 0 && self.value.is_empty()
    }

    /// As a `cookie::Cookie`, for frameworks that take one directly
    pub fn to_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.name.clone(), self.value.clone()))
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site)
            .path(self.path.clone())
            .max_age(time::Duration::seconds(self.max_age_secs))
            .build();
        if let Some(domain) = &self.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }

    /// Render as a `Set-Cookie` header value
    pub fn to_header_value(&self) -> String {
        self.to_cookie().to_string()
    }
}

impl fmt::Display for RefreshCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cookie())
    }
}
