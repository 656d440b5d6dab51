use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use rs_inbox::config::{Config, load_config, resolve_db_path};
use rs_inbox::domain::email::EmailSummary;
use rs_inbox::domain::filter::Filter;
use rs_inbox::domain::route::Route;
use rs_inbox::inbox::{Inbox, InboxView, SelectOutcome};
use rs_inbox::mail::decoders::{body_to_text, header_date, list_date, normalize_snippet};
use rs_inbox::mail::http::HttpGateway;
use rs_inbox::store::debounce::Debouncer;
use rs_inbox::store::kv::{KeyValueStore, MemoryKv};
use rs_inbox::store::sqlite::SqliteKv;

#[derive(Parser)]
#[command(name = "rs_inbox")]
#[command(about = "Paged inbox over a remote mail API", long_about = None)]
struct Cli {
    /// Keep read/favorite state in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show one page of the inbox
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = Filter::All)]
        filter: Filter,
    },

    /// Open an email and mark it read
    Open {
        id: String,

        /// Pages to load before looking the email up
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Toggle the favorite flag of an email
    Favorite {
        id: String,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
    let inbox = build_inbox(&cfg, cli.ephemeral)?;

    let result = run(&inbox, cli.cmd).await;
    inbox.flush();
    result
}

fn build_inbox(cfg: &Config, ephemeral: bool) -> Result<Inbox> {
    let kv: Arc<dyn KeyValueStore> = if ephemeral {
        Arc::new(MemoryKv::new())
    } else {
        Arc::new(SqliteKv::open(&resolve_db_path(cfg)?)?)
    };
    let gateway = HttpGateway::new(&cfg.api_base_url(), cfg.request_timeout())?;
    let debouncer = Debouncer::new(kv.clone(), cfg.debounce_window());
    Ok(Inbox::new(Arc::new(gateway), kv, debouncer))
}

async fn run(inbox: &Inbox, cmd: Command) -> Result<()> {
    match cmd {
        Command::List { page, filter } => {
            goto_page(inbox, page).await?;
            inbox.set_filter(filter);
            print_view(&inbox.snapshot());
            Ok(())
        }

        Command::Open { id, page } => {
            let outcome = if page <= 1 {
                inbox.open(&Route::Email(id.clone())).await
            } else {
                goto_page(inbox, page).await?;
                Some(inbox.select_email(&id).await)
            };
            match outcome {
                Some(SelectOutcome::Resolved) => {}
                Some(SelectOutcome::Cancelled) => {
                    return Err(anyhow!("selection of {id} was superseded"));
                }
                Some(SelectOutcome::Failed) | None => return Err(store_error(inbox)),
            }
            let email = inbox.selected().ok_or_else(|| anyhow!("no email selected"))?;
            println!("{}", inbox.route());
            let sender = &email.summary.sender;
            println!("From:    {} <{}>", sender.name, sender.email);
            println!("Subject: {}", email.summary.subject);
            println!("Date:    {}", header_date(email.summary.date));
            if email.summary.favorite {
                println!("Marked as favorite");
            }
            println!();
            println!("{}", body_to_text(&email.body, 80));
            Ok(())
        }

        Command::Favorite { id, page } => {
            goto_page(inbox, page).await?;
            match inbox.toggle_favorite(&id) {
                Some(true) => println!("{id} added to favorites"),
                Some(false) => println!("{id} removed from favorites"),
                None => return Err(anyhow!("email {id} is not on pages 1..={page}")),
            }
            Ok(())
        }
    }
}

/// Walk forward one page at a time, the way the pager buttons do.
async fn goto_page(inbox: &Inbox, page: u32) -> Result<()> {
    inbox.open(&Route::Inbox).await;
    while inbox.error().is_none() && inbox.page() < page {
        if !inbox.next_page().await {
            return Err(anyhow!(
                "page {page} out of range (1..={})",
                inbox.total_pages()
            ));
        }
    }
    match inbox.error() {
        Some(_) => Err(store_error(inbox)),
        None => Ok(()),
    }
}

fn store_error(inbox: &Inbox) -> anyhow::Error {
    match inbox.error() {
        Some(err) => anyhow!("{err}: {}", err.detail()),
        None => anyhow!("unknown failure"),
    }
}

fn print_view(view: &InboxView) {
    if view.emails.is_empty() {
        println!("No emails match filter '{}'.", view.filter);
    }
    let active = view.selected.as_ref().map(|s| s.id());
    for e in &view.emails {
        println!("{}", format_row(e, active == Some(e.id.as_str())));
    }
    if view.show_pagination {
        println!();
        println!("Page {} of {}", view.page, view.total_pages);
    } else {
        println!();
        println!(
            "{} of {} on this page ({})",
            view.emails.len(),
            view.unfiltered_count,
            view.filter
        );
    }
}

/// `>` marks the open email, `*` an unread one, `★` a favorite.
fn format_row(e: &EmailSummary, active: bool) -> String {
    let cursor = if active { '>' } else { ' ' };
    let read = if e.read { ' ' } else { '*' };
    let fav = if e.favorite { '★' } else { ' ' };
    format!(
        "{cursor}{read}{fav} {:>4}  {:<20}  {}  {}  {}",
        e.id,
        normalize_snippet(&e.sender.name, 20),
        list_date(e.date),
        e.subject,
        normalize_snippet(&e.short_description, 40)
    )
}
