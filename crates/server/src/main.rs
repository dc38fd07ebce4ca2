use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use server_api::{
    fetch_item_page, list_categories, resolve_category_page, subscribe_newsletter, ApiContext,
};
use shared::{
    error::{ApiError, ErrorCode},
    pagination::parse_page_number,
    protocol::{ItemPageResponse, NewsletterRequest, NewsletterResponse},
};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod locale;
mod render;

use app_state::AppState;
use config::{load_settings, normalize_database_url};
use locale::{locale_middleware, LocaleConfig, ResolvedLocale};

#[derive(Debug, Deserialize)]
struct CategoryPath {
    code: String,
    #[serde(default)]
    page_num: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemPageQuery {
    page: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings()?;
    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext::new(Arc::new(storage), settings.page_size),
        locales: LocaleConfig::new(settings.locales, settings.default_locale),
        max_body_bytes: settings.max_body_bytes,
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, page_size = settings.page_size, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/category/:code/items", get(http_item_page))
        .route("/api/newsletter", post(http_newsletter))
        .route("/:locale", get(home))
        .route("/:locale/category/:code", get(category))
        .route("/:locale/category/:code/page/:page_num", get(category))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.locales.clone(),
            locale_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(state.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn json_error(error: ApiError) -> (StatusCode, Json<ApiError>) {
    (status_for(error.code), Json(error))
}

fn html_error(locale: &str, uri: &Uri, error: &ApiError) -> Response {
    (
        status_for(error.code),
        Html(render::error_page(locale, uri.path(), error)),
    )
        .into_response()
}

async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.api.store.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

async fn home(
    State(state): State<Arc<AppState>>,
    Extension(ResolvedLocale(locale)): Extension<ResolvedLocale>,
    uri: Uri,
) -> Response {
    match list_categories(&state.api).await {
        Ok(categories) => Html(render::home_page(&locale, &categories)).into_response(),
        Err(err) => html_error(&locale, &uri, &err),
    }
}

async fn category(
    State(state): State<Arc<AppState>>,
    Extension(ResolvedLocale(locale)): Extension<ResolvedLocale>,
    Path(path): Path<CategoryPath>,
    uri: Uri,
) -> Response {
    match resolve_category_page(&state.api, &path.code, path.page_num.as_deref()).await {
        Ok(payload) => Html(render::category_page(&locale, &payload)).into_response(),
        Err(err) => html_error(&locale, &uri, &err),
    }
}

async fn http_item_page(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(q): Query<ItemPageQuery>,
) -> Result<Json<ItemPageResponse>, (StatusCode, Json<ApiError>)> {
    let page = parse_page_number(q.page.as_deref());
    fetch_item_page(&state.api, &code, page)
        .await
        .map(Json)
        .map_err(json_error)
}

async fn http_newsletter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewsletterRequest>,
) -> Result<Json<NewsletterResponse>, (StatusCode, Json<ApiError>)> {
    subscribe_newsletter(&state.api, &req)
        .await
        .map(Json)
        .map_err(json_error)
}

async fn not_found(
    State(state): State<Arc<AppState>>,
    locale: Option<Extension<ResolvedLocale>>,
    uri: Uri,
) -> Response {
    let error = ApiError::new(ErrorCode::NotFound, format!("no page at '{}'", uri.path()));
    if uri.path().starts_with("/api/") {
        return json_error(error).into_response();
    }
    let locale = locale
        .map(|Extension(ResolvedLocale(locale))| locale)
        .unwrap_or_else(|| state.locales.default_locale().to_string());
    html_error(&locale, &uri, &error)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
