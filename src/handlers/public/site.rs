// handlers/public/site.rs - GET /api/site/* handlers
//
// Everything here reads the region from the `RequestLocale` extension set by
// the locale middleware; none of it touches the cookie directly.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Path, Query};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::locale::{currency_for, format_currency, localized_path, CurrencyInfo, LocaleSource, Region};
use crate::middleware::{ApiResponse, ApiResult, RequestLocale};
use crate::site::calculator::{AffordabilityInput, AffordabilityQuote, MortgageInput, MortgageQuote};
use crate::site::{affordability, mortgage_payment, IconId};

#[derive(Debug, Serialize)]
pub struct LocaleInfo {
    pub region: Region,
    pub source: LocaleSource,
    pub currency: CurrencyInfo,
    pub link_prefix: &'static str,
}

/// GET /api/site/locale - region resolved for this request
pub async fn locale(Extension(locale): Extension<RequestLocale>) -> ApiResponse<LocaleInfo> {
    ApiResponse::success(LocaleInfo {
        region: locale.region,
        source: locale.source,
        currency: currency_for(locale.region),
        link_prefix: locale.region.path_prefix(),
    })
}

#[derive(Debug, Deserialize)]
pub struct LinksQuery {
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LocalizedLink {
    pub region: Region,
    pub href: String,
    pub current: bool,
}

/// GET /api/site/links?path= - the same page in every region, for the region switcher
pub async fn links(
    Extension(locale): Extension<RequestLocale>,
    Query(query): Query<LinksQuery>,
) -> ApiResponse<Vec<LocalizedLink>> {
    let path = query.path.unwrap_or_else(|| "/".to_string());
    let links = Region::ALL
        .iter()
        .map(|&region| LocalizedLink {
            region,
            href: localized_path(region, &path),
            current: region == locale.region,
        })
        .collect();
    ApiResponse::success(links)
}

/// Calculator result plus the money fields rendered in the request region's currency.
#[derive(Debug, Serialize)]
pub struct Quote<T> {
    #[serde(flatten)]
    pub quote: T,
    pub currency: CurrencyInfo,
    pub formatted: BTreeMap<&'static str, String>,
}

fn formatted(region: Region, fields: &[(&'static str, Decimal)]) -> BTreeMap<&'static str, String> {
    fields
        .iter()
        .map(|(name, amount)| (*name, format_currency(region, *amount)))
        .collect()
}

fn calculator_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(input)| input)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// GET /api/site/calculators/mortgage?principal=&annual_rate=&amortization_years=
pub async fn mortgage(
    Extension(locale): Extension<RequestLocale>,
    query: Result<Query<MortgageInput>, QueryRejection>,
) -> ApiResult<Quote<MortgageQuote>> {
    let input = calculator_query(query)?;
    let quote = mortgage_payment(&input)?;
    let formatted = formatted(
        locale.region,
        &[
            ("monthly_payment", quote.monthly_payment),
            ("total_paid", quote.total_paid),
            ("total_interest", quote.total_interest),
        ],
    );
    Ok(ApiResponse::success(Quote {
        quote,
        currency: currency_for(locale.region),
        formatted,
    }))
}

/// GET /api/site/calculators/affordability?annual_income=&annual_rate=&amortization_years=[&monthly_debts=...]
pub async fn affordability_estimate(
    Extension(locale): Extension<RequestLocale>,
    query: Result<Query<AffordabilityInput>, QueryRejection>,
) -> ApiResult<Quote<AffordabilityQuote>> {
    let input = calculator_query(query)?;
    let quote = affordability(&input)?;
    let formatted = formatted(
        locale.region,
        &[
            ("max_monthly_payment", quote.max_monthly_payment),
            ("max_loan_amount", quote.max_loan_amount),
            ("max_purchase_price", quote.max_purchase_price),
        ],
    );
    Ok(ApiResponse::success(Quote {
        quote,
        currency: currency_for(locale.region),
        formatted,
    }))
}

#[derive(Debug, Serialize)]
pub struct IconLookup {
    pub requested: String,
    pub icon: IconId,
    pub fallback: bool,
}

/// GET /api/site/icons/:name - icon id for a template name, `circle` when unknown
pub async fn icon(Path(name): Path<String>) -> ApiResponse<IconLookup> {
    let found = IconId::lookup(&name);
    ApiResponse::success(IconLookup {
        icon: found.unwrap_or(IconId::Circle),
        fallback: found.is_none(),
        requested: name,
    })
}
