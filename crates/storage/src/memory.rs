//! In-process `DirectoryStore` for tests and local demos.
//!
//! Records how many queries of each kind were issued and can be switched into
//! a failing mode, which makes store-failure paths reachable without SQLite.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use shared::{
    domain::{Category, CategorySummary, ItemId, NavigationItem, Subscription, SubscriptionId},
    protocol::ItemPage,
    validation::ValidSubmission,
};

use crate::DirectoryStore;

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    category_queries: AtomicUsize,
    item_queries: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

#[derive(Default)]
struct MemoryInner {
    categories: Vec<Category>,
    items: Vec<NavigationItem>,
    subscriptions: Vec<Subscription>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&self, code: &str, title: Option<&str>) {
        let mut inner = self.lock();
        inner.categories.retain(|c| c.code != code);
        inner.categories.push(Category {
            code: code.to_string(),
            title: title.map(str::to_string),
        });
    }

    /// Adds `count` items named `{code}-0`, `{code}-1`, ... to the category.
    pub fn add_items(&self, code: &str, count: usize) -> Vec<ItemId> {
        let mut inner = self.lock();
        let mut ids = Vec::with_capacity(count);
        for n in 0..count {
            let id = ItemId(inner.items.len() as i64 + 1);
            inner.items.push(NavigationItem {
                id,
                name: format!("{code}-{n}"),
                title: None,
                url: format!("https://example.com/{code}/{n}"),
                image_url: None,
                description: String::new(),
                category_name: code.to_string(),
            });
            ids.push(id);
        }
        ids
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn category_queries(&self) -> usize {
        self.category_queries.load(Ordering::SeqCst)
    }

    pub fn item_queries(&self) -> usize {
        self.item_queries.load(Ordering::SeqCst)
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.lock().subscriptions.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("memory store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn get_category(&self, code: &str) -> Result<Option<Category>> {
        self.category_queries.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        Ok(self.lock().categories.iter().find(|c| c.code == code).cloned())
    }

    async fn get_item_page(&self, code: &str, offset: u64, limit: u64) -> Result<ItemPage> {
        self.item_queries.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        let inner = self.lock();
        let matching: Vec<&NavigationItem> = inner
            .items
            .iter()
            .filter(|item| item.category_name == code)
            .collect();
        let data = matching
            .iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|item| (*item).clone())
            .collect();
        Ok(ItemPage {
            data,
            count: matching.len() as u64,
        })
    }

    async fn insert_subscription(&self, submission: &ValidSubmission) -> Result<SubscriptionId> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("subscription insert rejected"));
        }
        let mut inner = self.lock();
        let id = SubscriptionId(inner.subscriptions.len() as i64 + 1);
        inner.subscriptions.push(Subscription {
            id,
            name: submission.name.clone(),
            email: submission.email.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_categories(&self) -> Result<Vec<CategorySummary>> {
        self.check_reads()?;
        let inner = self.lock();
        Ok(inner
            .categories
            .iter()
            .map(|category| CategorySummary {
                category: category.clone(),
                item_count: inner
                    .items
                    .iter()
                    .filter(|item| item.category_name == category.code)
                    .count() as u64,
            })
            .collect())
    }

    async fn health_check(&self) -> Result<()> {
        self.check_reads()
    }
}
