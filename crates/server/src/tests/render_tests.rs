use super::*;

use shared::domain::{Category, ItemId};

fn item(id: i64, name: &str) -> NavigationItem {
    NavigationItem {
        id: ItemId(id),
        name: name.to_string(),
        title: None,
        url: format!("https://example.com/{id}"),
        image_url: None,
        description: format!("about {name}"),
        category_name: "design".into(),
    }
}

fn payload(items: Vec<NavigationItem>, current_page: u32, total: u64) -> RenderPayload {
    RenderPayload {
        header_title: "Design Tools".into(),
        navigation_list: items,
        current_page,
        total,
        page_size: 4,
        route: "/category/design".into(),
    }
}

#[test]
fn escapes_markup_characters() {
    assert_eq!(
        escape_html("<a href=\"x\">Tom & Jerry's</a>"),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
    );
}

#[test]
fn seed_cannot_close_script_element() {
    let mut items = vec![item(1, "evil")];
    items[0].description = "</script><script>alert(1)</script>".into();
    let seed = seed_json(&payload(items, 1, 1));
    assert!(!seed.contains("</script>"));
    let round: RenderPayload = serde_json::from_str(&seed).expect("seed json");
    assert_eq!(round.navigation_list[0].description, "</script><script>alert(1)</script>");
}

#[test]
fn category_page_has_breadcrumb_grid_and_localized_pagination() {
    let html = category_page("de", &payload(vec![item(5, "figma"), item(6, "sketch")], 2, 10));
    assert!(html.contains("<a href=\"/de\">Home</a> / <span>Design Tools</span>"));
    assert!(html.contains("<h2>figma</h2>"));
    assert!(html.contains("<h2>sketch</h2>"));
    assert!(html.contains("href=\"/de/category/design/page/1\""));
    assert!(html.contains("rel=\"next\" href=\"/de/category/design/page/3\""));
    assert!(html.contains("<span aria-current=\"page\">2</span>"));
    assert!(html.contains(SEED_ELEMENT_ID));
}

#[test]
fn empty_listing_has_placeholder_and_no_pagination() {
    let html = category_page("en", &payload(Vec::new(), 1, 0));
    assert!(html.contains("class=\"empty\""));
    assert!(!html.contains("class=\"pagination\""));
}

#[test]
fn page_past_the_end_shows_placeholder() {
    let html = category_page("en", &payload(Vec::new(), 9, 10));
    assert!(html.contains("class=\"empty\""));
    assert!(!html.contains("class=\"grid\""));
}

#[test]
fn item_title_is_preferred_over_name() {
    let mut titled = item(1, "figma");
    titled.title = Some("Figma <Pro>".into());
    let html = category_page("en", &payload(vec![titled], 1, 1));
    assert!(html.contains("<h2>Figma &lt;Pro&gt;</h2>"));
}

#[test]
fn home_page_links_categories_and_has_newsletter_form() {
    let categories = vec![CategorySummary {
        category: Category {
            code: "design".into(),
            title: None,
        },
        item_count: 3,
    }];
    let html = home_page("fr", &categories);
    assert!(html.contains("<a href=\"/fr/category/design\">design</a> <small>(3)</small>"));
    assert!(html.contains("data-endpoint=\"/api/newsletter\""));
}

#[test]
fn store_failure_page_offers_retry() {
    let error = ApiError::new(ErrorCode::StoreUnavailable, "database is locked");
    let html = error_page("en", "/en/category/design", &error);
    assert!(html.contains("class=\"retry\" href=\"/en/category/design\""));

    let missing = ApiError::new(ErrorCode::NotFound, "category 'x' not found");
    assert!(!error_page("en", "/en/category/x", &missing).contains("class=\"retry\""));
}
