//! CLI entry point for the samlib author tracker.

use anyhow::{Context, bail};
use clap::Parser;
use samlib_net::HttpFetcher;
use samlib_sync::Agent;
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;
mod output;

use cli::{Cli, Command, ListTarget};

/// `exn::Exn` does not implement `std::error::Error`, so it cannot flow
/// through `anyhow`'s blanket `From` conversion; bridge it via `Display`.
trait AnyhowExt<T> {
    fn anyhow(self) -> anyhow::Result<T>;
}

impl<T, E: std::fmt::Display> AnyhowExt<T> for Result<T, E> {
    fn anyhow(self) -> anyhow::Result<T> {
        self.map_err(|e| anyhow::anyhow!("{e}"))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

/// `~` is not the shell's business once the path is inside an argument
/// default, so expand it here.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest.trim_start_matches('/')),
        _ => PathBuf::from(path),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let db_file = expand_home(&cli.location).join("samlib.db");
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let fetcher = HttpFetcher::new().anyhow().context("cannot set up the http client")?;
    let agent = Agent::open(&db_file.to_string_lossy(), &cli.location, fetcher)
        .await
        .anyhow()
        .context("cannot open the local store")?;

    match cli.command {
        Command::Add { url } => {
            let author = agent.add_author(&url).await.anyhow().context("cannot add the author")?;
            println!("Tracking author [{}] \"{}\"", author.id, author.name);
        }
        Command::Remove { id } => {
            agent.remove_author(id).await.anyhow().context("cannot remove the author")?;
            println!("Author #{id} removed");
        }
        Command::Check => {
            agent
                .check_updates_with_progress(|author, current, total| {
                    println!("[{current}/{total}] {}", author.name);
                })
                .await
                .anyhow()
                .context("update check failed")?;
        }
        Command::List { target, author, group, new_only } => match target {
            ListTarget::Authors => {
                output::list_authors(&agent.get_authors(new_only).await.anyhow()?);
            }
            ListTarget::Groups => {
                let Some(author) = author else {
                    bail!("listing groups needs an author (e.g. `--author=123`)");
                };
                output::list_groups(&agent.get_groups(author, new_only).await.anyhow()?);
            }
            ListTarget::Books => {
                if let Some(group) = group {
                    output::list_works(&agent.get_works_by_group(group, new_only).await.anyhow()?);
                } else if let Some(author) = author {
                    output::list_works(&agent.get_works_by_author(author, new_only).await.anyhow()?);
                } else {
                    bail!("listing books needs an author or a group (e.g. `--author=123`)");
                }
            }
        },
        Command::Show { author, group, book, path_only } => {
            if let Some(id) = author {
                let author = agent.get_author(id).await.anyhow()?;
                let groups = agent.count_groups(id, false).await.anyhow()?;
                let works = agent.count_works_by_author(id, false).await.anyhow()?;
                output::show_author(&author, groups, works);
            } else if let Some(id) = group {
                let group = agent.get_group(id).await.anyhow()?;
                let works = agent.count_works_by_group(id, false).await.anyhow()?;
                output::show_group(&group, works);
            } else if let Some(id) = book {
                let work = agent.get_work(id).await.anyhow()?;
                let local = agent.local_path(&work).await;
                if path_only {
                    match local {
                        Some(path) => println!("{}", path.display()),
                        None => bail!("the book has no local copy yet"),
                    }
                } else {
                    output::show_work(&work, local.as_deref());
                }
            } else {
                bail!("show needs one of --author, --group or --book");
            }
        }
        Command::MarkRead { author, group, book } => {
            if let Some(id) = author {
                agent.mark_author_read(id).await.anyhow()?;
            } else if let Some(id) = group {
                agent.mark_group_read(id).await.anyhow()?;
            } else if let Some(id) = book {
                agent.mark_work_read(id).await.anyhow()?;
            } else {
                bail!("mark-read needs one of --author, --group or --book");
            }
        }
        Command::MarkUnread { book } => {
            agent.mark_work_unread(book).await.anyhow()?;
        }
        Command::Fetch { book, format } => {
            let path = agent.fetch_work(book, format.into()).await.anyhow().context("cannot fetch the book")?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
