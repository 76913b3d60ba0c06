use std::path::PathBuf;

use clap::Parser;

use super::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(
    name = "movie_dashboard",
    about = "Scrape a public movie-list profile and summarise it"
)]
pub struct Cli {
    /// RON config file (default: ./dashboard.ron if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Profile identifier (e.g. ur14323971) or profile URL
    #[arg(short, long)]
    pub profile: Option<String>,
    /// Use the JSON backend at this base URL instead of scraping
    #[arg(long, conflicts_with_all = ["direct", "proxy"])]
    pub api: Option<String>,
    /// Scrape pages without going through a proxy
    #[arg(long, conflicts_with = "proxy")]
    pub direct: bool,
    /// Scrape through this AllOrigins-style proxy endpoint
    #[arg(long)]
    pub proxy: Option<String>,
    /// Lists fetched at once (1 = one after another)
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,
    /// Per-request timeout in seconds (default: none)
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Where log output goes
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,
    /// Print records and aggregates as JSON
    #[arg(long)]
    pub json: bool,
    /// Print the effective configuration as RON and exit
    #[arg(long)]
    pub print_config: bool,
}
