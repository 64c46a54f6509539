pub mod cookie;
pub mod currency;
pub mod region;
pub mod resolver;

pub use cookie::{LocaleCookie, LOCALE_COOKIE_NAME};
pub use currency::{currency_for, format_currency, CurrencyInfo};
pub use region::{normalize_locale_param, region_from_accept_language, Region};
pub use resolver::{localized_path, resolve_locale, strip_region_prefix, LocaleRequest, LocaleResolution, LocaleSource};
