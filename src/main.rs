//! wikibot CLI
//!
//! Thin entry points over the [`wikibot`] session engine.
//!
//! # Commands
//!
//! - `page` - Print the wikitext of a page or section
//! - `toc` - Print a page's section outline
//! - `list` - Walk a paginated `list=` query
//! - `sandbox-reset` - Restore a sandbox page left untouched for a while
//!
//! Configuration comes from `WIKIBOT_*` environment variables; the wiki
//! account from `WIKIBOT_USER` / `WIKIBOT_PASS`.

use std::env;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use wikibot::wiki_api::Transport;
use wikibot::{logging, ListQuery, Session, WikiConfig, WikiError};

/// Ten years.
const MAX_SANDBOX_HOURS: i64 = 87_600;

/// Maintenance bot for MediaWiki sites.
#[derive(Parser)]
#[command(name = "wikibot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the wiki (overrides WIKIBOT_URL)
    #[arg(global = true, long)]
    wiki: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the wikitext of a page or section
    Page {
        title: String,

        /// Section number to restrict the read to
        #[arg(short, long)]
        section: Option<u32>,

        /// Revision id to read instead of the latest
        #[arg(short, long)]
        revision: Option<u64>,
    },

    /// Print a page's section outline
    Toc {
        title: String,

        /// Revision id to outline instead of the latest
        #[arg(short, long)]
        revision: Option<u64>,
    },

    /// Walk a paginated list query and print one item per line
    List {
        /// List module name, e.g. allpages or categorymembers
        name: String,

        /// Extra query parameters as KEY=VALUE
        #[arg(short, long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },

    /// Reset a sandbox page that has not been edited recently
    SandboxReset {
        #[arg(long, default_value = "Wikinews:Sandbox")]
        page: String,

        /// Content the sandbox is reset to
        #[arg(long, default_value = "{{sandbox}}")]
        content: String,

        /// Minimum hours since the last edit
        #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(i64).range(0..=MAX_SANDBOX_HOURS))]
        hours: i64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = WikiConfig::from_env();
    if let Some(wiki) = cli.wiki {
        config.api.base_url = wiki;
    }
    let verbose = config.verbose || cli.verbose;
    let config = config.with_verbose(verbose);
    logging::init(verbose);

    match run(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) if error.is_warning() => {
            eprintln!("warning: {error}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}: {error}", error.severity());
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: WikiConfig) -> Result<(), WikiError> {
    let mut session = Session::connect(config)?;
    if let (Ok(user), Ok(pass)) = (env::var("WIKIBOT_USER"), env::var("WIKIBOT_PASS")) {
        session.authenticate(&user, &pass)?;
    }

    let outcome = match command {
        Commands::Page {
            title,
            section,
            revision,
        } => session
            .get_page(&title, false, revision, section)
            .map(|text| println!("{text}")),
        Commands::Toc { title, revision } => session.get_toc(&title, revision).map(|toc| {
            for entry in toc {
                let indent = "  ".repeat(entry.toclevel as usize);
                println!("{indent}{} {}", entry.number, entry.line);
            }
        }),
        Commands::List { name, params } => {
            let list = params
                .into_iter()
                .fold(ListQuery::list(&name), |list, (key, value)| {
                    list.param(key, value)
                });
            session.fetch_list(&list).map(|items| {
                for item in items {
                    match item.get("title").and_then(|title| title.as_str()) {
                        Some(title) => println!("{title}"),
                        None => println!("{item}"),
                    }
                }
            })
        }
        Commands::SandboxReset {
            page,
            content,
            hours,
        } => sandbox_reset(&mut session, &page, &content, hours),
    };

    if session.is_authenticated() {
        session.deauthenticate();
    }
    outcome
}

fn sandbox_reset<T: Transport>(
    session: &mut Session<T>,
    page: &str,
    content: &str,
    hours: i64,
) -> Result<(), WikiError> {
    let current = session.get_page(page, true, None, None)?;
    let Some(last_edit) = session.snapshot().map(|snapshot| snapshot.timestamp.clone()) else {
        return Ok(());
    };
    let last_edit_at = OffsetDateTime::parse(&last_edit, &Rfc3339).map_err(|_| {
        WikiError::InvalidTimestamp {
            value: last_edit.clone(),
        }
    })?;
    let threshold = hours
        .checked_mul(3600)
        .map(Duration::seconds)
        .and_then(|age| OffsetDateTime::now_utc().checked_sub(age))
        .ok_or_else(|| WikiError::InvalidTimestamp {
            value: format!("{hours} hours ago"),
        })?;

    println!("Page timestamp: {last_edit}");
    if last_edit_at >= threshold || current.trim() == content.trim() {
        println!("Sandbox left alone.");
        return Ok(());
    }

    let summary = format!("Clear sandbox, untouched for {hours} hours");
    session.write_page(page, content, Some(&summary), None)?;
    session.log(&format!("Reset [[{page}]] (last edited {last_edit})"));
    println!("Sandbox reset.");
    Ok(())
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_owned(), value.to_owned()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}
