//! CLI administration tool for link-gateway.
//!
//! Talks to the configured document store directly, without going through
//! the HTTP API, its pacing or its admin key.
//!
//! # Usage
//!
//! ```bash
//! # Show or resync the cached link counter
//! cargo run --bin admin -- counter show
//! cargo run --bin admin -- counter resync
//!
//! # Browse, verify and delete links
//! cargo run --bin admin -- links list --count 20
//! cargo run --bin admin -- links verify 1x9kz0q2m00000
//! cargo run --bin admin -- links delete 1x9kz0q2m00000 -y
//!
//! # Show the id a URL hashes to
//! cargo run --bin admin -- id "https://example.com/page"
//! ```
//!
//! # Environment Variables
//!
//! - `STORE_URL`, `STORE_SECRET_PATH` (required): document store location
//! - `STORE_TIMEOUT_MS` (optional, default 6000)
//! - `SHORT_ID_LENGTH`, `MAX_URL_LENGTH`, `STORE_CAPACITY` (optional, server defaults)

use link_gateway::application::services::{
    CounterService, LinkPolicy, LinkService, PaginationService, QuotaLimiter, VerificationService,
    VerificationStatus,
};
use link_gateway::domain::clock::{Clock, SystemClock};
use link_gateway::domain::repositories::LinkRepository;
use link_gateway::infrastructure::ledger::MemoryLedger;
use link_gateway::infrastructure::persistence::StoreLinkRepository;
use link_gateway::infrastructure::store::FirebaseStore;
use link_gateway::utils::short_id::{IdMatcher, id_for};
use link_gateway::utils::url_normalizer::normalize_url;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;
use std::time::Duration;

/// CLI tool for managing link-gateway.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect or repair the link counter
    Counter {
        #[command(subcommand)]
        action: CounterAction,
    },

    /// Manage stored links
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },

    /// Print the normalized form of a URL and the id it maps to
    Id {
        /// Long URL
        url: String,
    },
}

#[derive(Subcommand)]
enum CounterAction {
    /// Show the cached counter next to the real number of links
    Show,

    /// Overwrite the counter with the real number of links
    Resync,
}

#[derive(Subcommand)]
enum LinksAction {
    /// List links in key order
    List {
        /// Page size
        #[arg(short, long, default_value_t = 15)]
        count: usize,

        /// Resume after this id
        #[arg(long)]
        cursor: Option<String>,
    },

    /// Mark a link as verified
    Verify {
        id: String,
    },

    /// Delete a link
    Delete {
        id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Settings read from the environment, with the server's defaults.
struct Settings {
    store_url: String,
    store_secret_path: String,
    store_timeout: Duration,
    policy: LinkPolicy,
}

impl Settings {
    fn from_env() -> Result<Self> {
        let store_url = std::env::var("STORE_URL").context("STORE_URL must be set")?;
        let store_secret_path =
            std::env::var("STORE_SECRET_PATH").context("STORE_SECRET_PATH must be set")?;

        Ok(Self {
            store_url,
            store_secret_path,
            store_timeout: Duration::from_millis(env_or("STORE_TIMEOUT_MS", 6000)),
            policy: LinkPolicy {
                id_length: env_or("SHORT_ID_LENGTH", 14),
                max_url_length: env_or("MAX_URL_LENGTH", 2000),
                capacity: env_or("STORE_CAPACITY", 1000),
                max_daily_writes: env_or("MAX_DAILY_WRITES", 10),
                quota_window_days: env_or("QUOTA_WINDOW_DAYS", 1),
            },
        })
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::Id { url } = &cli.command {
        return print_id(url, env_or("SHORT_ID_LENGTH", 14));
    }

    let settings = Settings::from_env()?;

    let store = Arc::new(
        FirebaseStore::new(
            &settings.store_url,
            &settings.store_secret_path,
            settings.store_timeout,
        )
        .context("Failed to build store client")?,
    );
    let repository = Arc::new(StoreLinkRepository::new(store));

    match cli.command {
        Commands::Counter { action } => handle_counter_action(action, repository).await?,
        Commands::Links { action } => handle_links_action(action, repository, &settings).await?,
        Commands::Id { .. } => {}
    }

    Ok(())
}

/// Prints the normalized URL and its id.
fn print_id(url: &str, id_length: usize) -> Result<()> {
    let normalized = normalize_url(url).map_err(|e| anyhow::anyhow!("Not a valid URL: {}", e))?;
    let id = id_for(&normalized, id_length);

    println!("  URL: {}", normalized.cyan());
    println!("  ID:  {}", id.bright_yellow().bold());

    Ok(())
}

async fn handle_counter_action(
    action: CounterAction,
    repository: Arc<StoreLinkRepository>,
) -> Result<()> {
    let service = CounterService::new(repository.clone());

    match action {
        CounterAction::Show => {
            println!("{}", "📊 Link counter".bright_blue().bold());
            println!();

            let cached = service
                .current()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read counter: {}", e))?;

            match cached {
                Some(value) => println!(
                    "  Cached: {}",
                    value.to_string().bright_green().bold()
                ),
                None => println!("  Cached: {}", "not initialized".yellow()),
            }

            let actual = repository
                .count_ids()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to count links: {}", e))?;
            println!("  Actual: {}", actual.to_string().bright_white().bold());

            if cached != Some(actual as i64) {
                println!();
                println!(
                    "{}",
                    "⚠️  Counter is out of sync, run `admin counter resync`".yellow()
                );
            }
            println!();
        }
        CounterAction::Resync => {
            println!("{}", "🔄 Resync link counter".bright_blue().bold());
            println!();

            let report = service.resync().await;

            if !report.success {
                anyhow::bail!("Counter resync failed, see logs for the store error");
            }

            println!(
                "{} {}",
                "✅ Counter set to".green().bold(),
                report.actual_count.to_string().bright_white().bold()
            );
            println!();
        }
    }

    Ok(())
}

async fn handle_links_action(
    action: LinksAction,
    repository: Arc<StoreLinkRepository>,
    settings: &Settings,
) -> Result<()> {
    let matcher = IdMatcher::new(settings.policy.id_length).context("Invalid SHORT_ID_LENGTH")?;
    let check_id = |id: &str| -> Result<()> {
        if !matcher.is_valid(id) {
            anyhow::bail!(
                "'{}' is not a valid id ({} characters of [A-Za-z0-9_-])",
                id,
                settings.policy.id_length
            );
        }
        Ok(())
    };

    match action {
        LinksAction::List { count, cursor } => list_links(repository, count, cursor).await?,
        LinksAction::Verify { id } => {
            check_id(&id)?;
            verify_link(repository, &id).await?;
        }
        LinksAction::Delete { id, yes } => {
            check_id(&id)?;
            delete_link(repository, settings, &id, yes).await?;
        }
    }

    Ok(())
}

/// Lists one page of links.
///
/// # Output Format
///
/// ```text
/// 📋 Links
///
///   ID              Posted             Verified  URL
///   ──────────────────────────────────────────────────────────────────
///   1x9kz0q2m00000  2026-01-15 10:30   yes       https://example.com/
/// ```
async fn list_links(
    repository: Arc<StoreLinkRepository>,
    count: usize,
    cursor: Option<String>,
) -> Result<()> {
    if count == 0 {
        anyhow::bail!("--count must be at least 1");
    }

    println!("{}", "📋 Links".bright_blue().bold());
    println!();

    let page = PaginationService::new(repository)
        .page(cursor, count)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if page.items.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<16} {:<18} {:<9} {}",
        "ID".bright_white().bold(),
        "Posted".bright_white().bold(),
        "Verified".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &page.items {
        let verified = if link.is_verified {
            "yes".green()
        } else {
            "no".yellow()
        };

        println!(
            "  {:<16} {:<18} {:<9} {}",
            link.id.cyan(),
            link.post_date
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            verified,
            link.long_url
        );
    }

    println!();
    if let Some(next) = page.next_cursor {
        println!("  More links follow. Next page: {} {}", "--cursor".bright_cyan(), next);
    } else {
        println!("  {}", "End of list".bright_black());
    }
    println!();

    Ok(())
}

async fn verify_link(repository: Arc<StoreLinkRepository>, id: &str) -> Result<()> {
    match VerificationService::new(repository).verify(id).await {
        VerificationStatus::VerifiedNow => {
            println!("{}", "✅ Link verified successfully".green().bold())
        }
        VerificationStatus::AlreadyVerified => {
            println!("{}", "⚠️  Link already verified".yellow())
        }
        VerificationStatus::NotFound => anyhow::bail!("No link stored at {}", id),
        VerificationStatus::Error => anyhow::bail!("Store unavailable, link not verified"),
    }

    Ok(())
}

/// Deletes a link after showing it, with confirmation unless `--yes`.
async fn delete_link(
    repository: Arc<StoreLinkRepository>,
    settings: &Settings,
    id: &str,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🗑️  Delete link".bright_blue().bold());
    println!();

    // Deletes never consult the quota; the limiter only satisfies the constructor.
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let quota = Arc::new(QuotaLimiter::new(
        Arc::new(MemoryLedger::new(clock.clone())),
        clock.clone(),
    ));
    let service = LinkService::new(repository, quota, clock, settings.policy.clone());

    let link = service
        .resolve(id)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("  ID:  {}", link.id.cyan());
    println!("  URL: {}", link.long_url);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "✅ Link deleted".green().bold());
    println!();

    Ok(())
}
