mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cinegrid::prelude::*;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    cinegrid::logging::init();
    let cli = Cli::parse();
    let fetcher = cinegrid::connect(cli.config.as_deref())?;

    match cli.command {
        Commands::Rank { kind, json } => {
            let session = GridSession::new(fetcher);
            if let FetchStatus::Failed(msg) = session.refresh(kind).await {
                anyhow::bail!("could not fetch {kind} ranking: {msg}");
            }
            let movies = session.list().snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&*movies)?);
            } else {
                for (i, m) in movies.iter().enumerate() {
                    println!("{:>3}. {} ({}) {}", i, m.title, m.release_year(), m.rating_label());
                }
            }
        }
        Commands::Show { index, kind } => {
            let session = GridSession::new(fetcher);
            if let FetchStatus::Failed(msg) = session.refresh(kind).await {
                anyhow::bail!("could not fetch {kind} ranking: {msg}");
            }
            let m = session
                .select(index)
                .with_context(|| format!("no entry at position {index} ({} fetched)", session.list().len()))?;
            print_details(&m);
        }
        Commands::Url { kind } => {
            println!("{}", fetcher.redacted_ranking_url(kind)?);
        }
    }
    Ok(())
}

fn print_details(m: &MovieRecord) {
    println!("{}", m.title);
    println!("  id:       {}", m.id);
    println!("  released: {}", m.release_date_text());
    println!("  rating:   {}", m.rating_label());
    println!("  poster:   {}", m.poster_path);
    if !m.summary.is_empty() {
        println!();
        println!("{}", m.summary);
    }
}
