use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

use super::region::Region;

pub const LOCALE_COOKIE_NAME: &str = "kr_locale";
pub const ONE_YEAR_SECS: u64 = 365 * 24 * 60 * 60;

/// Attributes of the region cookie written on every resolved request.
#[derive(Debug, Clone)]
pub struct LocaleCookie {
    pub name: String,
    pub max_age_secs: u64,
    pub secure: bool,
}

impl Default for LocaleCookie {
    fn default() -> Self {
        Self {
            name: LOCALE_COOKIE_NAME.to_string(),
            max_age_secs: ONE_YEAR_SECS,
            secure: false,
        }
    }
}

impl LocaleCookie {
    /// `Set-Cookie` value for the given region, scoped to `/`.
    pub fn header_value(&self, region: Region) -> HeaderValue {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax",
            self.name,
            region.as_str(),
            self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        // Name comes from config and the value from a fixed set, both ASCII.
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("kr_locale=global; Path=/"))
    }

    /// Raw cookie value from the request `Cookie` header(s).
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .find_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                if name.trim() == self.name {
                    Some(value.trim().trim_matches('"').to_string())
                } else {
                    None
                }
            })
    }
}
