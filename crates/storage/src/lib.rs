use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::{
    domain::{Category, CategorySummary, ItemId, NavigationItem, Subscription, SubscriptionId},
    protocol::ItemPage,
    validation::ValidSubmission,
};

pub mod memory;

/// Data-access capability consumed by the Page Resolver, the item API and
/// the newsletter endpoint. Constructed once per process and shared.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Zero-or-one category whose code equals `code`.
    async fn get_category(&self, code: &str) -> Result<Option<Category>>;

    /// Items of one category at `[offset, offset + limit)`, ordered by id,
    /// with the exact count of the whole category.
    async fn get_item_page(&self, code: &str, offset: u64, limit: u64) -> Result<ItemPage>;

    async fn insert_subscription(&self, submission: &ValidSubmission) -> Result<SubscriptionId>;

    async fn list_categories(&self) -> Result<Vec<CategorySummary>>;

    async fn health_check(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub name: String,
    pub title: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub description: String,
    pub category_name: String,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // In-memory databases live as long as their connections; keep one.
        let max_connections = if database_url.starts_with("sqlite::memory:") {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Inserts the category or updates its title when the code already exists.
    pub async fn upsert_category(&self, code: &str, title: Option<&str>) -> Result<()> {
        sqlx::query(
            "INSERT INTO navigation_category (name, title) VALUES (?, ?)
             ON CONFLICT(name) DO UPDATE SET title=excluded.title",
        )
        .bind(code)
        .bind(title)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to upsert category '{code}'"))?;
        Ok(())
    }

    pub async fn insert_item(&self, item: &NewItem) -> Result<ItemId> {
        let rec = sqlx::query(
            "INSERT INTO web_navigation (name, title, url, image_url, description, category_name)
             VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&item.name)
        .bind(item.title.as_deref())
        .bind(&item.url)
        .bind(item.image_url.as_deref())
        .bind(&item.description)
        .bind(&item.category_name)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to insert item '{}'", item.name))?;
        Ok(ItemId(rec.get::<i64, _>(0)))
    }

    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let rows = sqlx::query(
            "SELECT id, name, email, created_at FROM newsletter_subscriptions ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| Subscription {
                id: SubscriptionId(r.get::<i64, _>(0)),
                name: r.get::<String, _>(1),
                email: r.get::<String, _>(2),
                created_at: r.get::<DateTime<Utc>, _>(3),
            })
            .collect())
    }
}

#[async_trait]
impl DirectoryStore for Storage {
    async fn get_category(&self, code: &str) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT name, title FROM navigation_category WHERE name = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("category query failed for '{code}'"))?;
        Ok(row.map(|r| Category {
            code: r.get::<String, _>(0),
            title: r.get::<Option<String>, _>(1),
        }))
    }

    async fn get_item_page(&self, code: &str, offset: u64, limit: u64) -> Result<ItemPage> {
        let offset = i64::try_from(offset).context("item offset out of range")?;
        let limit = i64::try_from(limit).context("item limit out of range")?;

        // Count and slice read the same snapshot.
        let mut tx = self.pool.begin().await?;
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM web_navigation WHERE category_name = ?")
                .bind(code)
                .fetch_one(&mut *tx)
                .await
                .with_context(|| format!("item count failed for '{code}'"))?;
        let rows = sqlx::query(
            "SELECT id, name, title, url, image_url, description, category_name
             FROM web_navigation
             WHERE category_name = ?
             ORDER BY id ASC
             LIMIT ? OFFSET ?",
        )
        .bind(code)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *tx)
        .await
        .with_context(|| format!("item page query failed for '{code}'"))?;
        tx.commit().await?;

        debug!(code, offset, limit, count, rows = rows.len(), "fetched item page");
        Ok(ItemPage {
            data: rows.iter().map(item_from_row).collect(),
            count: u64::try_from(count).unwrap_or_default(),
        })
    }

    async fn insert_subscription(&self, submission: &ValidSubmission) -> Result<SubscriptionId> {
        let rec = sqlx::query(
            "INSERT INTO newsletter_subscriptions (name, email, created_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("failed to insert newsletter subscription")?;
        Ok(SubscriptionId(rec.get::<i64, _>(0)))
    }

    async fn list_categories(&self) -> Result<Vec<CategorySummary>> {
        let rows = sqlx::query(
            "SELECT c.name, c.title, COUNT(w.id)
             FROM navigation_category c
             LEFT JOIN web_navigation w ON w.category_name = c.name
             GROUP BY c.id
             ORDER BY c.sort ASC, c.id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| CategorySummary {
                category: Category {
                    code: r.get::<String, _>(0),
                    title: r.get::<Option<String>, _>(1),
                },
                item_count: u64::try_from(r.get::<i64, _>(2)).unwrap_or_default(),
            })
            .collect())
    }

    async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }
}

fn item_from_row(r: &SqliteRow) -> NavigationItem {
    NavigationItem {
        id: ItemId(r.get::<i64, _>(0)),
        name: r.get::<String, _>(1),
        title: r.get::<Option<String>, _>(2),
        url: r.get::<String, _>(3),
        image_url: r.get::<Option<String>, _>(4),
        description: r.get::<String, _>(5),
        category_name: r.get::<String, _>(6),
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
