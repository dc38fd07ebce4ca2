use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use storage::{DirectoryStore, NewItem, Storage};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/directory.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Creates a category, or retitles an existing one.
    AddCategory {
        code: String,
        #[arg(long)]
        title: Option<String>,
    },
    AddItem {
        #[arg(long)]
        category: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Loads categories and items from a JSON seed file.
    Import { file: PathBuf },
    ListCategories,
    Subscriptions,
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    categories: Vec<SeedCategory>,
    #[serde(default)]
    items: Vec<SeedItem>,
}

#[derive(Debug, Deserialize)]
struct SeedCategory {
    code: String,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeedItem {
    category: String,
    name: String,
    url: String,
    title: Option<String>,
    image_url: Option<String>,
    #[serde(default)]
    description: String,
}

impl From<SeedItem> for NewItem {
    fn from(item: SeedItem) -> Self {
        Self {
            name: item.name,
            title: item.title,
            url: item.url,
            image_url: item.image_url,
            description: item.description,
            category_name: item.category,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::AddCategory { code, title } => {
            storage.upsert_category(&code, title.as_deref()).await?;
            println!("category '{code}' saved");
        }
        Command::AddItem {
            category,
            name,
            url,
            title,
            image_url,
            description,
        } => {
            let item_id = storage
                .insert_item(&NewItem {
                    name,
                    title,
                    url,
                    image_url,
                    description,
                    category_name: category,
                })
                .await?;
            println!("created item_id={}", item_id.0);
        }
        Command::Import { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("failed to read '{}'", file.display()))?;
            let seed: SeedFile = serde_json::from_str(&raw)
                .with_context(|| format!("'{}' is not a valid seed file", file.display()))?;
            let (categories, items) = (seed.categories.len(), seed.items.len());
            for category in seed.categories {
                storage
                    .upsert_category(&category.code, category.title.as_deref())
                    .await?;
            }
            for item in seed.items {
                storage.insert_item(&item.into()).await?;
            }
            println!("imported {categories} categories and {items} items");
        }
        Command::ListCategories => {
            for summary in storage.list_categories().await? {
                println!(
                    "{}\t{}\t{}",
                    summary.category.code,
                    summary.category.display_title(),
                    summary.item_count
                );
            }
        }
        Command::Subscriptions => {
            for sub in storage.list_subscriptions().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    sub.id.0,
                    sub.name,
                    sub.email,
                    sub.created_at.to_rfc3339()
                );
            }
        }
    }

    Ok(())
}
