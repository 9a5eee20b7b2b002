mod display;
mod parser;
mod record;
mod report;
mod session;
mod settings;
mod store;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{ArgGroup, Args, Parser, Subcommand};

use parser::classify::classify_row;
use report::report;
use session::fetch_rows;
use settings::Settings;

#[derive(Parser)]
#[command(name = "coin_tracker", about = "Top cryptocurrencies by market cap, scraped from a listing page")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the listing page and extract the top coins
    Fetch {
        /// Page to load (default from config)
        #[arg(long)]
        url: Option<String>,
        /// Also save the raw rows as JSON for offline replay
        #[arg(long)]
        dump_rows: Option<PathBuf>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Extract from a saved HTML page or a row capture
    #[command(group(ArgGroup::new("input").required(true).args(["html", "rows"])))]
    Parse {
        /// Saved HTML page
        #[arg(long)]
        html: Option<PathBuf>,
        /// JSON row capture written by `fetch --dump-rows`
        #[arg(long)]
        rows: Option<PathBuf>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Classify a single row given as cell texts
    Classify {
        /// Cell texts in column order
        cells: Vec<String>,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Max rows to extract
    #[arg(short = 'n', long)]
    top_n: Option<usize>,
    /// CSV output path
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print the table without writing CSV
    #[arg(long)]
    no_csv: bool,
}

impl OutputArgs {
    fn apply(&self, settings: &mut Settings) -> Result<()> {
        if let Some(n) = self.top_n {
            settings.top_n = n;
        }
        if let Some(path) = &self.output {
            settings.output = path.clone();
        }
        settings.validate()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Fetch { url, dump_rows, out } => {
            if let Some(url) = url {
                settings.url = url;
            }
            out.apply(&mut settings)?;
            let rows = fetch_rows(&settings).await?;
            if let Some(path) = dump_rows {
                store::save_capture(&path, &rows)?;
                println!("Raw rows saved to {}", path.display());
            }
            report(&settings, &rows, !out.no_csv).map(drop)
        }
        Commands::Parse { html, rows, out } => {
            out.apply(&mut settings)?;
            let rows = match (html, rows) {
                (Some(path), _) => {
                    let html = std::fs::read_to_string(&path)?;
                    parser::rows::read_rows(&html)
                }
                (None, Some(path)) => store::load_capture(&path)?,
                (None, None) => anyhow::bail!("pass --html or --rows"),
            };
            report(&settings, &rows, !out.no_csv).map(drop)
        }
        Commands::Classify { cells } => {
            let f = classify_row(&cells, settings.collision);
            let show = |v: Option<String>| v.unwrap_or_else(|| "(unmatched)".into());
            println!("Name:       {}", show(f.name));
            println!("Price:      {}", show(f.price));
            println!("24h Change: {}", show(f.change_percent));
            println!("Market Cap: {}", show(f.market_cap));
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}
