//! Subcommands of the `autoget` binary.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run as a daemon: progress sync on an interval, seeding policy daily
    Run,

    /// Run one progress and finalization pass
    Sync {
        /// Only this downloader (default: all)
        #[arg(short, long)]
        downloader: Option<String>,
    },

    /// Run one seeding policy pass
    Seeding {
        /// Only this downloader (default: all)
        #[arg(short, long)]
        downloader: Option<String>,
    },

    /// Start tracking a download that was handed to a torrent client
    Track {
        /// Downloader the torrent was added to
        downloader: String,
        /// Torrent info hash
        hash: String,
        #[arg(long, default_value = "")]
        title: String,
        /// Secondary title (e.g. the original-language name)
        #[arg(long, default_value = "")]
        title2: String,
        /// Indexer the torrent came from
        #[arg(long, default_value = "")]
        indexer: String,
        #[arg(long, default_value = "")]
        category: String,
        /// Files in the torrent (repeatable)
        #[arg(long = "file")]
        files: Vec<String>,
    },

    /// List tracked downloads
    List {
        /// Only this downloader (default: all)
        #[arg(short, long)]
        downloader: Option<String>,
    },
}
