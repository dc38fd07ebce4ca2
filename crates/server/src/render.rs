//! Server-side HTML for directory pages.

use std::fmt::Write as _;

use shared::{
    domain::{CategorySummary, NavigationItem},
    error::{ApiError, ErrorCode},
    pagination::{category_route, PaginationControl, PaginationEntry, PaginationSpec, PAGE_SUB_ROUTE},
    protocol::RenderPayload,
};

pub const SEED_ELEMENT_ID: &str = "directory-seed";

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// JSON for an inline `<script>` block; `</` cannot close the element early.
pub fn seed_json(payload: &RenderPayload) -> String {
    serde_json::to_string(payload)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

fn layout(locale: &str, title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"{locale}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n</head>\n<body>\n{body}</body>\n</html>\n",
        locale = escape_html(locale),
        title = escape_html(title),
    )
}

pub fn category_page(locale: &str, payload: &RenderPayload) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<nav class=\"breadcrumb\"><a href=\"/{locale}\">Home</a> / <span>{title}</span></nav>\n\
         <h1>{title}</h1>\n<section id=\"item-list\">\n",
        locale = escape_html(locale),
        title = escape_html(&payload.header_title),
    );

    if payload.navigation_list.is_empty() {
        body.push_str("<p class=\"empty\">No sites in this category yet.</p>\n");
    } else {
        body.push_str("<ul class=\"grid\">\n");
        for item in &payload.navigation_list {
            item_card(&mut body, item);
        }
        body.push_str("</ul>\n");

        let route = format!("/{locale}{}", payload.route);
        if let Some(control) = PaginationControl::build(PaginationSpec {
            current_page: payload.current_page,
            total: payload.total,
            page_size: payload.page_size,
            route: &route,
            sub_route: PAGE_SUB_ROUTE,
        }) {
            pagination(&mut body, &control);
        }
    }

    let _ = write!(
        body,
        "</section>\n<script id=\"{SEED_ELEMENT_ID}\" type=\"application/json\">{}</script>\n",
        seed_json(payload)
    );
    layout(locale, &payload.header_title, &body)
}

fn item_card(body: &mut String, item: &NavigationItem) {
    let label = item.title.as_deref().filter(|t| !t.trim().is_empty()).unwrap_or(item.name.as_str());
    let _ = write!(
        body,
        "<li class=\"item\" data-id=\"{}\"><a href=\"{}\" target=\"_blank\" rel=\"noopener\">",
        item.id.0,
        escape_html(&item.url)
    );
    if let Some(image) = &item.image_url {
        let _ = write!(
            body,
            "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
            escape_html(image),
            escape_html(label)
        );
    }
    let _ = writeln!(
        body,
        "<h2>{}</h2></a><p>{}</p></li>",
        escape_html(label),
        escape_html(&item.description)
    );
}

fn pagination(body: &mut String, control: &PaginationControl) {
    body.push_str("<nav class=\"pagination\">");
    if let Some(previous) = &control.previous {
        let _ = write!(body, "<a rel=\"prev\" href=\"{}\">Previous</a>", escape_html(&previous.href));
    }
    for entry in &control.entries {
        match entry {
            PaginationEntry::Page(link) if link.is_current => {
                let _ = write!(body, "<span aria-current=\"page\">{}</span>", link.page);
            }
            PaginationEntry::Page(link) => {
                let _ = write!(body, "<a href=\"{}\">{}</a>", escape_html(&link.href), link.page);
            }
            PaginationEntry::Gap => body.push_str("<span class=\"gap\">&hellip;</span>"),
        }
    }
    if let Some(next) = &control.next {
        let _ = write!(body, "<a rel=\"next\" href=\"{}\">Next</a>", escape_html(&next.href));
    }
    body.push_str("</nav>\n");
}

/// Category index with the newsletter signup form.
pub fn home_page(locale: &str, categories: &[CategorySummary]) -> String {
    let locale_attr = escape_html(locale);
    let mut body = String::from("<h1>Directory</h1>\n<ul class=\"categories\">\n");
    for summary in categories {
        let _ = writeln!(
            body,
            "<li><a href=\"/{locale_attr}{}\">{}</a> <small>({})</small></li>",
            escape_html(&category_route(&summary.category.code)),
            escape_html(summary.category.display_title()),
            summary.item_count
        );
    }
    body.push_str(
        "</ul>\n<form id=\"newsletter\" method=\"post\" data-endpoint=\"/api/newsletter\">\n\
         <label>Name <input name=\"name\" required></label>\n\
         <label>Email <input name=\"email\" type=\"email\" required></label>\n\
         <button type=\"submit\">Subscribe</button>\n</form>\n",
    );
    layout(locale, "Directory", &body)
}

/// Error page. Store failures carry a retry link back to `path`.
pub fn error_page(locale: &str, path: &str, error: &ApiError) -> String {
    let (heading, retry) = match error.code {
        ErrorCode::NotFound => ("Page not found", false),
        ErrorCode::StoreUnavailable => ("Service temporarily unavailable", true),
        ErrorCode::Validation => ("Bad request", false),
        ErrorCode::Internal => ("Something went wrong", true),
    };
    let mut body = format!(
        "<h1>{}</h1>\n<p class=\"error\">{}</p>\n",
        heading,
        escape_html(&error.message)
    );
    if retry {
        let _ = writeln!(body, "<a class=\"retry\" href=\"{}\">Retry</a>", escape_html(path));
    }
    let _ = writeln!(body, "<a href=\"/{}\">Home</a>", escape_html(locale));
    layout(locale, heading, &body)
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
