pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::sources::mangadex::PopularSort;
use crate::sources::SourceId;
use crate::store::ReadingMode;

#[derive(Parser)]
#[command(name = "mangaplex")]
#[command(about = "Search and read manga across sources", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/mangaplex/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search one source, or all of them
    Search {
        query: String,
        /// Only search this source
        #[arg(short, long, value_enum)]
        source: Option<SourceId>,
        #[arg(short, long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// List popular titles
    Popular {
        #[arg(long, value_enum, default_value_t = PopularSort::Followed)]
        sort: PopularSort,
        #[arg(short, long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show a manga with its chapter list
    Manga {
        /// Manga id, e.g. `abc-123` or `mangapill:2--one-piece`
        id: String,
    },
    /// Resolve the pages of a chapter
    Pages {
        id: String,
        /// Print proxy paths instead of the raw page data
        #[arg(long)]
        proxied: bool,
        /// Use compressed pages where the source offers them
        #[arg(long)]
        data_saver: bool,
    },
    /// Download an image through the proxy
    Image {
        /// Proxy path, e.g. `/api/proxy/cover/<id>/<file>`
        path: String,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Manage the library
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },
    /// Reading progress
    Progress {
        #[command(subcommand)]
        action: ProgressAction,
    },
    /// Reading mode preference
    Mode {
        #[command(subcommand)]
        action: ModeAction,
    },
}

#[derive(Subcommand)]
pub enum LibraryAction {
    List,
    /// Add a manga; title and cover are looked up unless given
    Add {
        id: String,
        #[arg(long)]
        title: Option<String>,
    },
    Remove {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ProgressAction {
    /// All progress, most recent first
    List,
    /// Progress and read chapters for one manga
    Show {
        manga_id: String,
    },
    /// Record the current page and mark the chapter read
    Save {
        manga_id: String,
        chapter_id: String,
        #[arg(long)]
        page: u32,
        #[arg(long)]
        total_pages: u32,
        /// Chapter number label
        #[arg(long)]
        chapter: Option<String>,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        cover: String,
    },
}

#[derive(Subcommand)]
pub enum ModeAction {
    Get {
        manga_id: Option<String>,
    },
    /// Set the mode; with a manga id it also becomes the default
    Set {
        #[arg(value_enum)]
        mode: ReadingMode,
        manga_id: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::parse_from(["mangaplex", "search", "one piece", "-s", "mangapill", "-l", "5"]);
        match cli.command {
            Commands::Search {
                query,
                source,
                limit,
                offset,
            } => {
                assert_eq!(query, "one piece");
                assert_eq!(source, Some(SourceId::MangaPill));
                assert_eq!(limit, Some(5));
                assert_eq!(offset, 0);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_popular_default_sort() {
        let cli = Cli::parse_from(["mangaplex", "popular"]);
        assert!(matches!(
            cli.command,
            Commands::Popular {
                sort: PopularSort::Followed,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_mode_set() {
        let cli = Cli::parse_from(["mangaplex", "mode", "set", "scroll", "abc"]);
        match cli.command {
            Commands::Mode {
                action: ModeAction::Set { mode, manga_id },
            } => {
                assert_eq!(mode, ReadingMode::Scroll);
                assert_eq!(manga_id.as_deref(), Some("abc"));
            }
            _ => panic!("expected mode set"),
        }
    }

    #[test]
    fn test_rejects_unknown_source() {
        assert!(Cli::try_parse_from(["mangaplex", "search", "x", "--source", "comick"]).is_err());
    }
}
