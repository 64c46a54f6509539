use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use url::form_urlencoded;

use super::cookie::LocaleCookie;
use super::region::{normalize_locale_param, region_from_accept_language, Region};

/// Query parameters that force a region and trigger a canonical redirect.
const LOCALE_QUERY_KEYS: [&str; 2] = ["loc", "locale"];

/// The request signals the resolver looks at, detached from any HTTP type so
/// resolution can be exercised directly.
#[derive(Debug, Clone, Default)]
pub struct LocaleRequest {
    pub path: String,
    pub query: Option<String>,
    pub cookie: Option<String>,
    pub accept_language: Option<String>,
}

impl LocaleRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_cookie(mut self, value: impl Into<String>) -> Self {
        self.cookie = Some(value.into());
        self
    }

    pub fn with_accept_language(mut self, value: impl Into<String>) -> Self {
        self.accept_language = Some(value.into());
        self
    }

    pub fn from_http(uri: &Uri, headers: &HeaderMap, cookie: &LocaleCookie) -> Self {
        Self {
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            cookie: cookie.read(headers),
            accept_language: headers
                .get(header::ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }
}

/// Which signal decided the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocaleSource {
    QueryParam,
    PathPrefix,
    Cookie,
    AcceptLanguage,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleResolution {
    pub region: Region,
    pub source: LocaleSource,
    /// Canonical location to redirect to, set only for explicit query overrides.
    pub redirect_to: Option<String>,
    /// Request path with any region prefix removed.
    pub unprefixed_path: String,
}

/// Resolve the region for a request.
///
/// Precedence: explicit `loc`/`locale` query parameter, path prefix, cookie,
/// `Accept-Language`, then `global`.
pub fn resolve_locale(request: &LocaleRequest) -> LocaleResolution {
    let (path_region, unprefixed_path) = strip_region_prefix(&request.path);

    if let Some((region, remaining_query)) = request.query.as_deref().and_then(explicit_override) {
        let redirect_to = canonical_location(region, &unprefixed_path, remaining_query.as_deref());
        return LocaleResolution {
            region,
            source: LocaleSource::QueryParam,
            redirect_to: Some(redirect_to),
            unprefixed_path,
        };
    }

    if let Some(region) = path_region {
        return LocaleResolution { region, source: LocaleSource::PathPrefix, redirect_to: None, unprefixed_path };
    }

    if let Some(region) = request.cookie.as_deref().and_then(Region::from_tag) {
        return LocaleResolution { region, source: LocaleSource::Cookie, redirect_to: None, unprefixed_path };
    }

    if let Some(region) = request.accept_language.as_deref().and_then(region_from_accept_language) {
        return LocaleResolution {
            region,
            source: LocaleSource::AcceptLanguage,
            redirect_to: None,
            unprefixed_path,
        };
    }

    LocaleResolution {
        region: Region::Global,
        source: LocaleSource::Default,
        redirect_to: None,
        unprefixed_path,
    }
}

impl LocaleResolution {
    /// Write the region cookie onto an outgoing response.
    pub fn apply(&self, cookie: &LocaleCookie, response: &mut Response) {
        response
            .headers_mut()
            .append(header::SET_COOKIE, cookie.header_value(self.region));
    }

    /// Permanent redirect for query overrides, already carrying the cookie.
    pub fn redirect_response(&self, cookie: &LocaleCookie) -> Option<Response> {
        let location = self.redirect_to.as_deref()?;
        let location = HeaderValue::from_str(location).ok()?;
        let mut response = (StatusCode::PERMANENT_REDIRECT, [(header::LOCATION, location)]).into_response();
        self.apply(cookie, &mut response);
        Some(response)
    }
}

/// Split a recognized region prefix off a path. `/ca` and `/ca/` both map to `/`.
pub fn strip_region_prefix(path: &str) -> (Option<Region>, String) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let (first, rest) = match trimmed.split_once('/') {
        Some((first, rest)) => (first, Some(rest)),
        None => (trimmed, None),
    };

    match Region::from_path_segment(first) {
        Some(region) => (Some(region), format!("/{}", rest.unwrap_or(""))),
        None => (None, if path.is_empty() { "/".to_string() } else { path.to_string() }),
    }
}

/// Prefix-correct link for a region. Any region prefix already on `path` is
/// replaced.
pub fn localized_path(region: Region, path: &str) -> String {
    let (_, bare) = strip_region_prefix(path);
    match (region.path_prefix(), bare.as_str()) {
        ("", bare) => bare.to_string(),
        (prefix, "/") => prefix.to_string(),
        (prefix, bare) => format!("{}{}", prefix, bare),
    }
}

/// Region requested via query string, plus the query with the override keys
/// removed (`None` when nothing remains).
fn explicit_override(query: &str) -> Option<(Region, Option<String>)> {
    let mut region = None;
    let mut kept = form_urlencoded::Serializer::new(String::new());
    let mut kept_any = false;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if LOCALE_QUERY_KEYS.contains(&key.as_ref()) {
            if region.is_none() {
                region = Some(normalize_locale_param(&value));
            }
        } else {
            kept.append_pair(&key, &value);
            kept_any = true;
        }
    }

    let remaining = if kept_any { Some(kept.finish()) } else { None };
    region.map(|r| (r, remaining))
}

fn canonical_location(region: Region, unprefixed_path: &str, query: Option<&str>) -> String {
    let path = localized_path(region, unprefixed_path);
    match query {
        Some(q) => format!("{}?{}", path, q),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_beats_path_prefix_and_redirects() {
        let res = resolve_locale(&LocaleRequest::new("/ca/anything").with_query("loc=us"));
        assert_eq!(res.region, Region::Us);
        assert_eq!(res.source, LocaleSource::QueryParam);
        assert_eq!(res.redirect_to.as_deref(), Some("/us/anything"));
    }

    #[test]
    fn locale_alias_param_keeps_other_query_pairs() {
        let res = resolve_locale(&LocaleRequest::new("/blog/rates").with_query("page=2&locale=Canada&tag=fixed"));
        assert_eq!(res.region, Region::Ca);
        assert_eq!(res.redirect_to.as_deref(), Some("/ca/blog/rates?page=2&tag=fixed"));
    }

    #[test]
    fn unknown_query_value_redirects_to_unprefixed_global() {
        let res = resolve_locale(&LocaleRequest::new("/us/faq").with_query("loc=atlantis"));
        assert_eq!(res.region, Region::Global);
        assert_eq!(res.redirect_to.as_deref(), Some("/faq"));
    }

    #[test]
    fn path_prefix_beats_stale_cookie() {
        let res = resolve_locale(&LocaleRequest::new("/ca/anything").with_cookie("us"));
        assert_eq!(res.region, Region::Ca);
        assert_eq!(res.source, LocaleSource::PathPrefix);
        assert_eq!(res.redirect_to, None);
        assert_eq!(res.unprefixed_path, "/anything");
    }

    #[test]
    fn alias_prefixes_are_recognized() {
        assert_eq!(resolve_locale(&LocaleRequest::new("/uae/solutions")).region, Region::Ae);
        assert_eq!(resolve_locale(&LocaleRequest::new("/usa")).region, Region::Us);
    }

    #[test]
    fn cookie_beats_accept_language() {
        let req = LocaleRequest::new("/anything").with_accept_language("en-US");
        assert_eq!(resolve_locale(&req).region, Region::Us);
        assert_eq!(resolve_locale(&req).source, LocaleSource::AcceptLanguage);

        let req = req.with_cookie("ae");
        assert_eq!(resolve_locale(&req).region, Region::Ae);
        assert_eq!(resolve_locale(&req).source, LocaleSource::Cookie);
    }

    #[test]
    fn garbage_cookie_is_ignored() {
        let req = LocaleRequest::new("/").with_cookie("klingon").with_accept_language("en-CA");
        assert_eq!(resolve_locale(&req).region, Region::Ca);
    }

    #[test]
    fn nothing_known_defaults_to_global() {
        let res = resolve_locale(&LocaleRequest::new("/glossary").with_accept_language("de-DE"));
        assert_eq!(res.region, Region::Global);
        assert_eq!(res.source, LocaleSource::Default);
        assert_eq!(res.unprefixed_path, "/glossary");
    }

    #[test]
    fn strip_prefix_handles_roots_and_lookalikes() {
        assert_eq!(strip_region_prefix("/ca"), (Some(Region::Ca), "/".to_string()));
        assert_eq!(strip_region_prefix("/ca/"), (Some(Region::Ca), "/".to_string()));
        assert_eq!(strip_region_prefix("/cat/food"), (None, "/cat/food".to_string()));
        assert_eq!(strip_region_prefix("/"), (None, "/".to_string()));
    }

    #[test]
    fn localized_path_replaces_existing_prefix() {
        assert_eq!(localized_path(Region::Ae, "/usa/calculators"), "/ae/calculators");
        assert_eq!(localized_path(Region::Global, "/ca/faq"), "/faq");
        assert_eq!(localized_path(Region::Us, "/"), "/us");
        assert_eq!(localized_path(Region::Global, "/"), "/");
    }

    #[test]
    fn redirect_response_is_permanent_and_sets_cookie() {
        let res = resolve_locale(&LocaleRequest::new("/ca/anything").with_query("loc=us"));
        let response = res.redirect_response(&LocaleCookie::default()).unwrap();
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/us/anything");
        assert!(response.headers()[header::SET_COOKIE].to_str().unwrap().starts_with("kr_locale=us;"));
    }
}
