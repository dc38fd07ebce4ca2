use serde::{Deserialize, Serialize};

use crate::domain::{NavigationItem, PageState, SubscriptionId};

/// One page of items plus the exact row count of the whole category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPage {
    pub data: Vec<NavigationItem>,
    pub count: u64,
}

/// Seed handed from the Page Resolver to the List View.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderPayload {
    pub header_title: String,
    pub navigation_list: Vec<NavigationItem>,
    pub current_page: u32,
    pub total: u64,
    pub page_size: u32,
    pub route: String,
}

impl RenderPayload {
    pub fn page_state(&self) -> PageState {
        PageState {
            items: self.navigation_list.clone(),
            current_page: self.current_page,
            total: self.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPageResponse {
    pub navigation_list: Vec<NavigationItem>,
    pub current_page: u32,
    pub total: u64,
    pub page_size: u32,
}

impl From<ItemPageResponse> for PageState {
    fn from(value: ItemPageResponse) -> Self {
        Self {
            items: value.navigation_list,
            current_page: value.current_page,
            total: value.total,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterResponse {
    pub subscription_id: SubscriptionId,
}
