//! Current navigation parameters of a category listing, published through a
//! single watch channel. Everything that reacts to page changes subscribes
//! here.

use tokio::sync::watch;
use tokio_stream::{wrappers::WatchStream, Stream};

use shared::pagination::{
    category_route, decode_path_segment, page_href, parse_page_number, PAGE_SUB_ROUTE,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NavigationParams {
    pub code: String,
    pub page: u32,
}

impl NavigationParams {
    pub fn new(code: impl Into<String>, page: u32) -> Self {
        Self {
            code: code.into(),
            page: page.max(1),
        }
    }

    /// Parses `/{locale}/category/{code}` and
    /// `/{locale}/category/{code}/page/{n}`; the locale segment is optional.
    /// Segments are percent-decoded, so the code matches what the server
    /// resolves for the same path.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode_path_segment)
            .collect::<Option<Vec<String>>>()?;
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        let start = segments.iter().position(|s| *s == "category")?;
        if start > 1 {
            return None;
        }
        match &segments[start + 1..] {
            [code] => Some(Self::new(*code, 1)),
            [code, "page", page] => Some(Self::new(*code, parse_page_number(Some(*page)))),
            _ => None,
        }
    }

    pub fn route(&self) -> String {
        category_route(&self.code)
    }

    pub fn href(&self) -> String {
        page_href(&self.route(), PAGE_SUB_ROUTE, self.page)
    }
}

pub struct NavigationSource {
    tx: watch::Sender<NavigationParams>,
}

impl NavigationSource {
    pub fn new(initial: NavigationParams) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> NavigationParams {
        self.tx.borrow().clone()
    }

    /// Publishes new parameters. Subscribers are notified even when the value
    /// is unchanged, so re-clicking the current page re-fetches it.
    pub fn navigate(&self, params: NavigationParams) {
        self.tx.send_replace(params);
    }

    pub fn navigate_to_page(&self, page: u32) {
        self.tx.send_modify(|params| params.page = page.max(1));
    }

    /// Follows a pagination link. Returns `false` for paths that are not
    /// category listings.
    pub fn navigate_to_path(&self, path: &str) -> bool {
        match NavigationParams::from_path(path) {
            Some(params) => {
                self.navigate(params);
                true
            }
            None => false,
        }
    }

    pub fn subscribe(&self) -> NavigationSubscription {
        NavigationSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

pub struct NavigationSubscription {
    rx: watch::Receiver<NavigationParams>,
}

impl NavigationSubscription {
    /// Waits for the next change. `None` once the source is gone.
    pub async fn changed(&mut self) -> Option<NavigationParams> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Stream of changes after the value current at subscription time.
    pub fn into_stream(self) -> impl Stream<Item = NavigationParams> {
        WatchStream::from_changes(self.rx)
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
