//! Command-line surface.

use clap::{Parser, Subcommand, ValueEnum};
use samlib_net::WorkFormat;

#[derive(Debug, Parser)]
#[command(name = "samlib", version, about = "Tracks authors on samlib.ru and mirrors their updates locally")]
pub struct Cli {
    /// Data location holding the database and the downloaded books
    #[arg(long, default_value = "~/.local/share/SamLib/")]
    pub location: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start tracking an author (full URL or the bare name tail)
    Add { url: String },
    /// Stop tracking the author with this id
    Remove { id: i64 },
    /// Check all tracked authors for updates
    Check,
    /// List authors, or one author's groups or books
    List {
        #[arg(value_enum, default_value = "authors")]
        target: ListTarget,
        /// Author id (required for groups and books)
        #[arg(short, long)]
        author: Option<i64>,
        /// Narrow books down to one group
        #[arg(short, long)]
        group: Option<i64>,
        /// Only new/updated items
        #[arg(short = 'n', long)]
        new_only: bool,
    },
    /// Show one record in detail
    Show {
        #[arg(short, long)]
        author: Option<i64>,
        #[arg(short, long)]
        group: Option<i64>,
        #[arg(short, long)]
        book: Option<i64>,
        /// Only print the path of the local copy of the book
        #[arg(long)]
        path_only: bool,
    },
    /// Mark an author, a group or a book as read
    MarkRead {
        #[arg(short, long)]
        author: Option<i64>,
        #[arg(short, long)]
        group: Option<i64>,
        #[arg(short, long)]
        book: Option<i64>,
    },
    /// Mark a book as unread (authors and groups only go the other way)
    MarkUnread { book: i64 },
    /// Download the body of a book into the local store
    Fetch {
        book: i64,
        #[arg(long, value_enum, default_value = "fb2")]
        format: FormatArg,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ListTarget {
    Authors,
    Groups,
    Books,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    /// Compressed structured format, with a markup fallback
    Fb2,
    /// Raw markup snapshot
    Html,
}

impl From<FormatArg> for WorkFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Fb2 => Self::Fb2,
            FormatArg::Html => Self::Html,
        }
    }
}
