//! Locale routing for page requests.
//!
//! A page path must start with a supported locale segment. Anything else is
//! redirected to the same path under the best `Accept-Language` match, or the
//! default locale. JSON API routes and the health probe are not localized.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

const API_PREFIX: &str = "/api/";
const HEALTH_PATH: &str = "/healthz";

/// The locale segment of the current page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocale(pub String);

#[derive(Debug, Clone)]
pub struct LocaleConfig {
    locales: Arc<[String]>,
    default_locale: String,
}

impl LocaleConfig {
    pub fn new(locales: Vec<String>, default_locale: impl Into<String>) -> Self {
        let default_locale = default_locale.into().to_lowercase();
        let mut locales: Vec<String> = locales.into_iter().map(|l| l.to_lowercase()).collect();
        if !locales.contains(&default_locale) {
            locales.push(default_locale.clone());
        }
        Self {
            locales: locales.into(),
            default_locale,
        }
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn is_supported(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }

    /// Picks the supported locale for an `Accept-Language` header. Tags are
    /// tried in q-value order; each tag matches on the full tag, then its
    /// primary subtag (`de-AT` -> `de`). Chinese tags fall back to their
    /// region (`zh-TW` -> `tw`).
    pub fn negotiate(&self, accept_language: Option<&str>) -> &str {
        let Some(header) = accept_language else {
            return &self.default_locale;
        };

        let mut ranges: Vec<(String, f32)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.trim().split(';');
                let tag = pieces.next()?.trim().to_lowercase();
                if tag.is_empty() || tag == "*" {
                    return None;
                }
                let quality = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (quality > 0.0).then_some((tag, quality))
            })
            .collect();
        ranges.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (tag, _) in &ranges {
            let mut subtags = tag.split(['-', '_']);
            let primary = subtags.next().unwrap_or_default();
            let region = subtags.last().filter(|_| primary == "zh");
            let candidates = [Some(tag.as_str()), Some(primary), region];
            if let Some(found) = candidates
                .into_iter()
                .flatten()
                .find_map(|c| self.locales.iter().find(|l| l.as_str() == c))
            {
                return found;
            }
        }
        &self.default_locale
    }
}

pub async fn locale_middleware(
    State(locales): State<LocaleConfig>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if path == HEALTH_PATH || path.starts_with(API_PREFIX) {
        return next.run(req).await;
    }

    let first_segment = path.trim_start_matches('/').split('/').next().unwrap_or_default();
    if locales.is_supported(first_segment) {
        let locale = ResolvedLocale(first_segment.to_string());
        req.extensions_mut().insert(locale);
        return next.run(req).await;
    }

    let accept_language = req
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    let locale = locales.negotiate(accept_language);
    let target = localized_uri(locale, req.uri());
    debug!(from = %req.uri(), to = %target, "redirecting to localized path");
    Redirect::temporary(&target).into_response()
}

fn localized_uri(locale: &str, uri: &Uri) -> String {
    let path = uri.path().trim_end_matches('/');
    match uri.query() {
        Some(query) => format!("/{locale}{path}?{query}"),
        None => format!("/{locale}{path}"),
    }
}

#[cfg(test)]
#[path = "tests/locale_tests.rs"]
mod tests;
