use std::sync::Arc;

use shared::{
    domain::CategorySummary,
    error::{ApiError, ErrorCode},
    pagination::{category_route, parse_page_number, OffsetWindow, DEFAULT_PAGE_SIZE},
    protocol::{ItemPageResponse, NewsletterRequest, NewsletterResponse, RenderPayload},
    validation::validate_newsletter,
};
use storage::DirectoryStore;
use tracing::{debug, error, info};

/// Request-independent dependencies of every handler. The store is built once
/// per process and shared by clone.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn DirectoryStore>,
    pub page_size: u32,
}

impl ApiContext {
    pub fn new(store: Arc<dyn DirectoryStore>, page_size: u32) -> Self {
        Self {
            store,
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }
}

/// Resolves the server-rendered category page.
///
/// The category lookup and the item page are requested together; a missing
/// category yields `NotFound` and no payload, and a failing store yields
/// `StoreUnavailable` rather than an empty listing.
pub async fn resolve_category_page(
    ctx: &ApiContext,
    code: &str,
    page_num: Option<&str>,
) -> Result<RenderPayload, ApiError> {
    let current_page = parse_page_number(page_num);
    let window = OffsetWindow::for_page(current_page, ctx.page_size);

    let (category, items) = futures::join!(
        ctx.store.get_category(code),
        ctx.store
            .get_item_page(code, window.offset(), window.limit()),
    );

    let category = category
        .map_err(|err| store_failure("category", code, err))?
        .ok_or_else(|| {
            info!(code, "category not found");
            ApiError::new(ErrorCode::NotFound, format!("category '{code}' not found"))
        })?;
    let items = items.map_err(|err| store_failure("items", code, err))?;

    debug!(
        code,
        current_page,
        total = items.count,
        rows = items.data.len(),
        "resolved category page"
    );
    Ok(RenderPayload {
        header_title: category.display_title().to_string(),
        navigation_list: items.data,
        current_page,
        total: items.count,
        page_size: ctx.page_size,
        route: category_route(code),
    })
}

/// One page of a category for client-side navigation. Uses the same window
/// as [`resolve_category_page`] so both paths produce identical slices.
pub async fn fetch_item_page(
    ctx: &ApiContext,
    code: &str,
    page: u32,
) -> Result<ItemPageResponse, ApiError> {
    let current_page = page.max(1);
    let window = OffsetWindow::for_page(current_page, ctx.page_size);
    let items = ctx
        .store
        .get_item_page(code, window.offset(), window.limit())
        .await
        .map_err(|err| store_failure("items", code, err))?;
    Ok(ItemPageResponse {
        navigation_list: items.data,
        current_page,
        total: items.count,
        page_size: ctx.page_size,
    })
}

pub async fn list_categories(ctx: &ApiContext) -> Result<Vec<CategorySummary>, ApiError> {
    ctx.store
        .list_categories()
        .await
        .map_err(|err| store_failure("categories", "*", err))
}

pub async fn subscribe_newsletter(
    ctx: &ApiContext,
    request: &NewsletterRequest,
) -> Result<NewsletterResponse, ApiError> {
    let submission = validate_newsletter(request).map_err(ApiError::validation)?;
    let subscription_id = ctx
        .store
        .insert_subscription(&submission)
        .await
        .map_err(|err| {
            error!(error = %format!("{err:#}"), "newsletter subscription insert failed");
            ApiError::new(ErrorCode::StoreUnavailable, err.to_string())
        })?;
    info!(subscription_id = subscription_id.0, "newsletter subscription stored");
    Ok(NewsletterResponse { subscription_id })
}

fn store_failure(query: &'static str, code: &str, err: anyhow::Error) -> ApiError {
    error!(query, code, error = %format!("{err:#}"), "store query failed");
    ApiError::new(ErrorCode::StoreUnavailable, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
