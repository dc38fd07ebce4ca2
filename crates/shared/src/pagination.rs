//! Offset pagination shared by the server-rendered page and client re-fetches.
//!
//! Both sides must derive the same window from the same `(page, page_size)`
//! pair, otherwise a page rendered on the server and the same page reached by
//! client-side navigation would show different slices.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const PAGE_SUB_ROUTE: &str = "/page";
const WINDOW_RADIUS: u32 = 2;

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Parses the page segment of a URL. Absent, malformed and zero values all
/// resolve to the first page.
pub fn parse_page_number(raw: Option<&str>) -> u32 {
    raw.map(str::trim)
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

/// Inclusive, zero-based row range `[start, end]` for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetWindow {
    pub start: u64,
    pub end: u64,
}

impl OffsetWindow {
    pub fn for_page(page: u32, page_size: u32) -> Self {
        let page = u64::from(page.max(1));
        let size = u64::from(page_size.max(1));
        Self {
            start: (page - 1) * size,
            end: page * size - 1,
        }
    }

    pub fn offset(&self) -> u64 {
        self.start
    }

    pub fn limit(&self) -> u64 {
        self.end - self.start + 1
    }
}

pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

/// Base route of a category listing, without locale prefix. The code is
/// percent-encoded as one path segment.
pub fn category_route(code: &str) -> String {
    format!("/category/{}", encode_path_segment(code))
}

pub fn encode_path_segment(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}

/// Inverse of [`encode_path_segment`]. `None` when the bytes are not UTF-8.
pub fn decode_path_segment(raw: &str) -> Option<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

pub fn page_href(route: &str, sub_route: &str, page: u32) -> String {
    format!("{route}{sub_route}/{page}")
}

#[derive(Debug, Clone, Copy)]
pub struct PaginationSpec<'a> {
    pub current_page: u32,
    pub total: u64,
    pub page_size: u32,
    pub route: &'a str,
    pub sub_route: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub page: u32,
    pub href: String,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PaginationEntry {
    Page(PageLink),
    Gap,
}

/// Link model for the pagination control under a category listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationControl {
    pub current_page: u32,
    pub total_pages: u32,
    pub previous: Option<PageLink>,
    pub next: Option<PageLink>,
    pub entries: Vec<PaginationEntry>,
}

impl PaginationControl {
    /// Returns `None` when there is nothing to paginate.
    pub fn build(spec: PaginationSpec<'_>) -> Option<Self> {
        let total_pages = total_pages(spec.total, spec.page_size);
        if total_pages == 0 {
            return None;
        }
        let current_page = spec.current_page.clamp(1, total_pages);
        let link = |page: u32| PageLink {
            page,
            href: page_href(spec.route, spec.sub_route, page),
            is_current: page == current_page,
        };

        let previous = (current_page > 1).then(|| link(current_page - 1));
        let next = (current_page < total_pages).then(|| link(current_page + 1));

        let window_start = current_page.saturating_sub(WINDOW_RADIUS).max(1);
        let window_end = current_page.saturating_add(WINDOW_RADIUS).min(total_pages);

        let mut entries = Vec::new();
        if window_start > 1 {
            entries.push(PaginationEntry::Page(link(1)));
            if window_start > 2 {
                entries.push(PaginationEntry::Gap);
            }
        }
        for page in window_start..=window_end {
            entries.push(PaginationEntry::Page(link(page)));
        }
        if window_end < total_pages {
            if window_end + 1 < total_pages {
                entries.push(PaginationEntry::Gap);
            }
            entries.push(PaginationEntry::Page(link(total_pages)));
        }

        Some(Self {
            current_page,
            total_pages,
            previous,
            next,
            entries,
        })
    }

    pub fn pages(&self) -> impl Iterator<Item = &PageLink> {
        self.entries.iter().filter_map(|entry| match entry {
            PaginationEntry::Page(link) => Some(link),
            PaginationEntry::Gap => None,
        })
    }
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
