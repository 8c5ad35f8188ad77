// OpenLibrary Search - Book Search and Wishlist Core
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use openlibrary_core::config::CoreConfig;
use openlibrary_core::search::{SearchState, SearchUpdate};
use openlibrary_core::storage::BookRecord;
use openlibrary_core::{init_logging, LibraryApp};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "openlibrary-cli")]
#[command(about = "OpenLibrary Search CLI - Desktop testing tool", long_about = None)]
struct Cli {
    /// Wishlist database file (defaults to the platform location)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog
    Search {
        query: String,
        /// Only show books with a cover
        #[arg(long)]
        covers: bool,
    },
    /// Search, then add the result at INDEX to the wishlist
    Save {
        query: String,
        /// Position in the search results, starting at 0
        #[arg(short, long, default_value_t = 0)]
        index: usize,
    },
    /// List the wishlist
    Wishlist,
    /// Remove a book from the wishlist by key or position
    Remove {
        /// Catalog key, e.g. /works/OL893415W
        key: Option<String>,
        /// Position in the wishlist, starting at 0
        #[arg(short, long, conflicts_with = "key")]
        index: Option<usize>,
    },
    /// Remove every book from the wishlist
    ClearWishlist,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CoreConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => CoreConfig::default(),
    }
    .with_env_overrides()
    .context("Invalid environment override")?;

    if let Some(db) = cli.db.clone() {
        config.database_path = Some(db);
    }

    init_logging(&config.log_filter);

    let app = LibraryApp::open(config).await.context("Failed to open library")?;

    match cli.command {
        Commands::Search { query, covers } => {
            app.set_cover_filter(covers).await;
            let update = app.search(&query).await.context("Search failed")?;
            print_update(&update, cli.json)?;
        }
        Commands::Save { query, index } => {
            let update = app.search(&query).await.context("Search failed")?;
            if update.state != SearchState::ResultsFound {
                bail!("Nothing to save: search ended in {}", update.state);
            }
            let Some(record) = update.records.get(index).cloned() else {
                bail!("Index {} out of range ({} results)", index, update.records.len());
            };

            let title = record.title.clone();
            let changed = !record.is_wishlisted;
            let outcome = app
                .commit_wishlist_change(record, changed)
                .await
                .context("Failed to update wishlist")?;
            println!("{}: {:?}", title, outcome);
        }
        Commands::Wishlist => {
            let records = app.wishlist_list().await.context("Failed to read wishlist")?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("Wishlist is empty");
            } else {
                print_records(&records);
            }
        }
        Commands::Remove { key, index } => match (key, index) {
            (Some(key), _) => {
                let removed = app.wishlist_remove(&key).await.context("Failed to remove")?;
                println!("{}", if removed { "Removed" } else { "Not in wishlist" });
            }
            (None, Some(index)) => match app.wishlist_remove_at(index).await.context("Failed to remove")? {
                Some(record) => println!("Removed {}", record.title),
                None => println!("No book at position {}", index),
            },
            (None, None) => bail!("Pass a key or --index"),
        },
        Commands::ClearWishlist => {
            let removed = app.wishlist_clear().await.context("Failed to clear wishlist")?;
            println!("Removed {} books", removed);
        }
    }

    app.close().await?;
    Ok(())
}

fn print_update(update: &SearchUpdate, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(update)?);
        return Ok(());
    }

    match status_line(update) {
        Some(line) => println!("{}", line),
        None => print_records(&update.records),
    }
    Ok(())
}

/// One-line status for every state that shows no records
fn status_line(update: &SearchUpdate) -> Option<String> {
    let line = match update.state {
        SearchState::ResultsFound => return None,
        SearchState::ZeroResults if update.cover_filter => {
            format!("No books with a cover found for \"{}\"", update.query)
        }
        SearchState::ZeroResults => format!("No books found for \"{}\"", update.query),
        SearchState::NoInternet => "No internet connection".to_string(),
        SearchState::NoSearchEntry => "Type something to search".to_string(),
        SearchState::PerformingSearch => "Searching...".to_string(),
    };
    Some(line)
}

fn print_records(records: &[BookRecord]) {
    for (i, record) in records.iter().enumerate() {
        let marker = if record.is_wishlisted { "*" } else { " " };
        println!("{:>3} {} {}", i, marker, record.title);
        println!("      {}", record.author_label);
        println!("      {} [{}]", record.additional_info_label, record.key);
    }
}
