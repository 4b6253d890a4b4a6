//! entity-embed command line.
//!
//! Usage:
//!   entity-embed render --entities fixtures.json page.html
//!   entity-embed tips --long

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use entity_embed::host::{MemoryStorage, PermissionAccess};
use entity_embed::models::Account;
use entity_embed::stack::EmbedStack;
use entity_embed::{Config, FilterContext};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace embed markers in an HTML fragment and print the result.
    Render {
        /// JSON fixture with entity types and entities.
        #[arg(long)]
        entities: PathBuf,

        /// Language to render in (default: EMBED_LANGCODE).
        #[arg(long)]
        langcode: Option<String>,

        /// Permission granted to the viewer; repeatable (default: "access content").
        #[arg(long = "permission")]
        permissions: Vec<String>,

        /// Render as a site administrator.
        #[arg(long)]
        admin: bool,

        /// Stop after the first embedded entity.
        #[arg(long)]
        first_match_only: bool,

        /// Tera glob for element templates (default: EMBED_TEMPLATES).
        #[arg(long)]
        templates: Option<String>,

        /// HTML input file; stdin when omitted.
        input: Option<PathBuf>,
    },

    /// Print author help for the embed syntax.
    Tips {
        /// Show the detailed variant.
        #[arg(long)]
        long: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    match args.command {
        Command::Render {
            entities,
            langcode,
            permissions,
            admin,
            first_match_only,
            templates,
            input,
        } => {
            let storage = MemoryStorage::from_path(&entities)?;
            info!(entities = storage.len(), "entity fixture loaded");

            let account = viewer(permissions, admin);
            let mut settings = config.embed.clone();
            settings.first_match_only |= first_match_only;
            let templates = templates.or(config.templates.clone());

            let stack = EmbedStack::new(
                Arc::new(storage),
                Arc::new(PermissionAccess::new(account)),
                settings,
                templates.as_deref(),
            )?;

            let html = read_input(input.as_ref())?;
            let langcode = langcode.unwrap_or(config.langcode);
            let output = stack.process(&html, &FilterContext::new(&langcode));
            println!("{output}");
        }
        Command::Tips { long } => {
            let stack = EmbedStack::new(
                Arc::new(MemoryStorage::new()),
                Arc::new(PermissionAccess::new(Account::anonymous())),
                config.embed,
                None,
            )?;
            for tip in stack.tips(long) {
                println!("{tip}");
            }
        }
    }

    Ok(())
}

fn viewer(mut permissions: Vec<String>, admin: bool) -> Account {
    if admin {
        permissions.push("administer site".to_string());
    }
    if permissions.is_empty() {
        permissions.push("access content".to_string());
        return Account {
            permissions,
            ..Account::anonymous()
        };
    }
    Account::authenticated(Uuid::nil(), permissions)
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut html = String::new();
            std::io::stdin()
                .read_to_string(&mut html)
                .context("failed to read stdin")?;
            Ok(html)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
