use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cinegrid::ranking::RankingKind;

/// Debugging CLI for the ranked movie catalog
#[derive(Parser)]
#[command(name = "cinegrid")]
#[command(about = "Fetch and inspect ranked movie lists", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the per-user config dir)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a ranking and list it
    Rank {
        #[arg(short, long, value_enum, default_value_t = RankingKind::TopRated)]
        kind: RankingKind,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch a ranking and show one entry in detail
    Show {
        /// Zero-based position in the ranking
        index: usize,
        #[arg(short, long, value_enum, default_value_t = RankingKind::TopRated)]
        kind: RankingKind,
    },
    /// Print the request URL with the credential masked
    Url {
        #[arg(short, long, value_enum, default_value_t = RankingKind::TopRated)]
        kind: RankingKind,
    },
}
