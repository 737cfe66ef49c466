//! Iconset CLI - inspect and maintain an icon catalog on local disk.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "iconset")]
#[command(about = "Scan, reconcile, and save SVG icon catalogs")]
struct Args {
    /// Catalog root directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Fail on malformed meta.json instead of skipping it
    #[arg(long, global = true)]
    strict: bool,

    /// Keep a meta.json.bak next to every rewritten file
    #[arg(long, global = true)]
    backup: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List categories, missing files, and orphan folders
    Scan {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show categories whose meta.json is not in normalized form
    Status,
    /// Rewrite every meta.json in normalized form
    Normalize,
    /// Add undescribed icon files to their categories, with lookup data
    AddNew {
        /// Only this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Create a meta.json for a folder of icons that has none
    Adopt {
        /// Folder name
        folder: String,
    },
    /// Store the lookup service credentials
    Auth {
        #[arg(long)]
        key: String,
        #[arg(long)]
        secret: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    debug!("Catalog root: {}", args.root.display());

    let options = commands::Options {
        root: args.root,
        strict: args.strict,
        backup: args.backup,
    };

    match args.command {
        Command::Scan { json } => commands::scan(&options, json).await,
        Command::Status => commands::status(&options).await,
        Command::Normalize => commands::normalize(&options).await,
        Command::AddNew { category } => commands::add_new(&options, category.as_deref()).await,
        Command::Adopt { folder } => commands::adopt(&options, &folder).await,
        Command::Auth { key, secret } => commands::auth(key, secret),
    }
}
