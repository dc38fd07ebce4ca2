//! Paginated list view controller.
//!
//! Mounted with the server-rendered seed, then re-fetches whenever the
//! navigation parameters change. Every fetch is tagged with a generation
//! number; only the latest generation may commit, and superseded fetch tasks
//! are aborted. Disposing the view aborts the in-flight fetch and the
//! navigation subscription so nothing writes state afterwards.

use std::sync::{Arc, Mutex, MutexGuard};

use shared::{
    domain::{NavigationItem, PageState},
    pagination::{PaginationControl, PaginationSpec, PAGE_SUB_ROUTE},
    protocol::{ItemPageResponse, RenderPayload},
};
use tokio::{sync::watch, task::JoinHandle};
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::{
    error::SourceError,
    navigation::{NavigationParams, NavigationSource},
    source::ItemPageSource,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    Idle,
    Fetching,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub status: ViewStatus,
    pub page: PageState,
    /// Parameters that produced `page`. Lags `params` while a fetch runs.
    pub page_params: NavigationParams,
    /// Latest requested parameters.
    pub params: NavigationParams,
    pub generation: u64,
}

/// What the view shows for a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRendering {
    Grid {
        items: Vec<NavigationItem>,
        pagination: Option<PaginationControl>,
    },
    Empty,
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ListViewOptions {
    /// Prepended to pagination links, e.g. `/en`.
    pub route_prefix: String,
}

pub struct PaginatedListView {
    shared: Arc<ViewShared>,
    driver: JoinHandle<()>,
}

struct ViewShared {
    source: Arc<dyn ItemPageSource>,
    header_title: String,
    page_size: u32,
    route_prefix: String,
    state: watch::Sender<ViewSnapshot>,
    control: Mutex<FetchControl>,
}

#[derive(Default)]
struct FetchControl {
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    disposed: bool,
}

impl PaginatedListView {
    /// Mounts the view on the seed without fetching. Must be called inside a
    /// tokio runtime.
    pub fn mount(
        seed: &RenderPayload,
        navigation: &NavigationSource,
        source: Arc<dyn ItemPageSource>,
        options: ListViewOptions,
    ) -> Self {
        let params = navigation.current();
        let (state, _) = watch::channel(ViewSnapshot {
            status: ViewStatus::Idle,
            page: seed.page_state(),
            page_params: params.clone(),
            params,
            generation: 0,
        });
        let shared = Arc::new(ViewShared {
            source,
            header_title: seed.header_title.clone(),
            page_size: seed.page_size,
            route_prefix: options.route_prefix,
            state,
            control: Mutex::new(FetchControl::default()),
        });

        let mut changes = navigation.subscribe().into_stream();
        let driver = tokio::spawn({
            let shared = Arc::clone(&shared);
            async move {
                while let Some(params) = changes.next().await {
                    shared.begin_fetch(params);
                }
            }
        });

        Self { shared, driver }
    }

    pub fn header_title(&self) -> &str {
        &self.shared.header_title
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn page_state(&self) -> PageState {
        self.shared.state.borrow().page.clone()
    }

    pub fn status(&self) -> ViewStatus {
        self.shared.state.borrow().status.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.shared.state.subscribe()
    }

    /// Fetches `params` now, superseding any fetch in flight.
    pub fn refetch(&self, params: NavigationParams) {
        self.shared.begin_fetch(params);
    }

    /// Re-issues the fetch for the latest navigation parameters.
    pub fn retry(&self) {
        let params = self.shared.state.borrow().params.clone();
        self.shared.begin_fetch(params);
    }

    pub fn render(&self) -> ListRendering {
        self.shared.render(&self.shared.state.borrow())
    }

    pub fn dispose(self) {}

    fn shutdown(&self) {
        self.driver.abort();
        let mut control = self.shared.lock_control();
        control.disposed = true;
        if let Some(task) = control.in_flight.take() {
            task.abort();
        }
    }
}

impl Drop for PaginatedListView {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl ViewShared {
    fn lock_control(&self) -> MutexGuard<'_, FetchControl> {
        self.control
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin_fetch(self: &Arc<Self>, params: NavigationParams) {
        let mut control = self.lock_control();
        if control.disposed {
            return;
        }
        control.generation += 1;
        let generation = control.generation;
        if let Some(previous) = control.in_flight.take() {
            previous.abort();
        }

        debug!(code = %params.code, page = params.page, generation, "list view fetch started");
        self.state.send_modify(|snapshot| {
            snapshot.status = ViewStatus::Fetching;
            snapshot.params = params.clone();
            snapshot.generation = generation;
        });

        let shared = Arc::clone(self);
        control.in_flight = Some(tokio::spawn(async move {
            let result = shared.source.fetch_page(&params.code, params.page).await;
            shared.commit(generation, &params, result);
        }));
    }

    /// Applies a finished fetch. Returns `false` when the result is stale or
    /// the view is gone.
    fn commit(
        &self,
        generation: u64,
        params: &NavigationParams,
        result: Result<ItemPageResponse, SourceError>,
    ) -> bool {
        let mut control = self.lock_control();
        if control.disposed || control.generation != generation {
            debug!(
                generation,
                latest = control.generation,
                "discarding stale list view fetch"
            );
            return false;
        }
        control.in_flight = None;

        match result {
            Ok(response) => {
                let page = PageState {
                    items: response.navigation_list,
                    current_page: params.page,
                    total: response.total,
                };
                self.state.send_modify(|snapshot| {
                    snapshot.page = page;
                    snapshot.page_params = params.clone();
                    snapshot.status = ViewStatus::Idle;
                });
            }
            Err(err) => {
                warn!(code = %params.code, page = params.page, error = %err, "list view fetch failed");
                let message = err.user_message();
                self.state.send_modify(|snapshot| {
                    snapshot.status = ViewStatus::Failed { message };
                });
            }
        }
        true
    }

    fn render(&self, snapshot: &ViewSnapshot) -> ListRendering {
        if let ViewStatus::Failed { message } = &snapshot.status {
            return ListRendering::Error {
                message: message.clone(),
            };
        }
        if snapshot.page.is_empty() {
            return ListRendering::Empty;
        }
        let route = format!("{}{}", self.route_prefix, snapshot.page_params.route());
        let pagination = PaginationControl::build(PaginationSpec {
            current_page: snapshot.page.current_page,
            total: snapshot.page.total,
            page_size: self.page_size,
            route: &route,
            sub_route: PAGE_SUB_ROUTE,
        });
        ListRendering::Grid {
            items: snapshot.page.items.clone(),
            pagination,
        }
    }
}

#[cfg(test)]
#[path = "tests/list_view_tests.rs"]
mod tests;
