use axum::{
    extract::{Request, State},
    http::{uri::PathAndQuery, Uri},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use tracing::debug;

use crate::locale::{resolve_locale, LocaleRequest, LocaleSource, Region};
use crate::state::AppState;

/// Region resolved for the current request, available to handlers as an
/// extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequestLocale {
    pub region: Region,
    pub source: LocaleSource,
}

/// Resolve the request region, redirect explicit `?loc=` overrides, strip any
/// region prefix from the URI and write the region cookie on the way out.
pub async fn locale_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let cookie = state.locale_cookie.as_ref();
    let locale_request = LocaleRequest::from_http(request.uri(), request.headers(), cookie);
    let resolution = resolve_locale(&locale_request);
    debug!(
        "Locale for {}: {} via {:?}",
        locale_request.path, resolution.region, resolution.source
    );

    if let Some(redirect) = resolution.redirect_response(cookie) {
        return redirect;
    }

    if resolution.unprefixed_path != request.uri().path() {
        if let Some(uri) = rewrite_path(request.uri(), &resolution.unprefixed_path) {
            *request.uri_mut() = uri;
        }
    }

    request.extensions_mut().insert(RequestLocale {
        region: resolution.region,
        source: resolution.source,
    });

    let mut response = next.run(request).await;
    resolution.apply(cookie, &mut response);
    response
}

fn rewrite_path(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}
