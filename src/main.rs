//! Lianjia-Scout main entry point
//!
//! This is the command-line interface for the listing crawler and the detail
//! enrichment pass.

use clap::{Parser, Subcommand};
use lianjia_scout::config::{
    load_city_codes, parse_page_range, resolve_city, resolve_config, Config,
};
use lianjia_scout::crawler::{
    build_session, enrich_listings, Coordinator, CrawlJob, EnrichOptions, PacingWindow,
};
use lianjia_scout::output::{
    default_detail_output, load_listings, print_crawl_report, print_enrich_report, RunFiles,
};
use lianjia_scout::url::listing_root;
use lianjia_scout::{ConfigError, ScoutError};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Lianjia-Scout: a paced second-hand listing crawler
///
/// `crawl` collects the search-result pages of one city into CSV and JSON.
/// `details` enriches a crawled JSON file with data from each detail page.
#[derive(Parser, Debug)]
#[command(name = "lianjia-scout")]
#[command(version = "1.0.0")]
#[command(about = "A paced second-hand listing crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (default: ./lianjia-scout.toml if present)
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl search-result pages of one city
    Crawl {
        /// City name as listed in the city table (prompted if omitted)
        #[arg(long)]
        city: Option<String>,

        /// Inclusive page range such as "1-5" (prompted if omitted)
        #[arg(long)]
        pages: Option<String>,
    },

    /// Enrich crawled listings with detail-page fields
    Details {
        /// JSON file written by `crawl`
        #[arg(long)]
        input: PathBuf,

        /// Detail CSV path (default: <input stem>_details.csv beside the input)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Minimum delay between records, in seconds
        #[arg(long)]
        min_delay: Option<f64>,

        /// Maximum delay between records, in seconds
        #[arg(long)]
        max_delay: Option<f64>,

        /// Only process the first N listings
        #[arg(long)]
        limit: Option<usize>,

        /// Raw Cookie header from a logged-in browser session
        #[arg(long)]
        cookie_string: Option<String>,

        /// Cookie file (JSON object, JSON list of pairs, or raw header)
        #[arg(long)]
        cookie_file: Option<PathBuf>,

        /// Use this User-Agent for every request instead of the pool
        #[arg(long)]
        user_agent: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let result = match resolve_config(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Command::Crawl { city, pages } => handle_crawl(config, city, pages, cli.quiet).await,
            Command::Details {
                input,
                output,
                min_delay,
                max_delay,
                limit,
                cookie_string,
                cookie_file,
                user_agent,
            } => {
                let args = DetailArgs {
                    input,
                    output,
                    min_delay,
                    max_delay,
                    limit,
                    cookie_string,
                    cookie_file,
                    user_agent,
                };
                handle_details(config, args, cli.quiet).await
            }
        },
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(ScoutError::Config(e)) => {
            eprintln!("{}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lianjia_scout=info,warn"),
            1 => EnvFilter::new("lianjia_scout=debug,info"),
            2 => EnvFilter::new("lianjia_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Reads one trimmed line from stdin after printing `prompt`
fn prompt(label: &str) -> std::io::Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Handles the `crawl` command
async fn handle_crawl(
    config: Config,
    city: Option<String>,
    pages: Option<String>,
    quiet: bool,
) -> lianjia_scout::Result<()> {
    let codes = load_city_codes(config.site.city_codes_path.as_deref())?;

    let city = match city {
        Some(city) => city,
        None => prompt("请输入城市:")?,
    };
    let code = resolve_city(&codes, &city)?;

    let pages = match pages {
        Some(pages) => pages,
        None => prompt("请输入页数范围:")?,
    };
    let (start_page, end_page) = parse_page_range(&pages, config.crawler.max_page)?;

    let root = listing_root(&config.site.scheme, &code, &config.site.domain)
        .map_err(|e| ConfigError::Validation(format!("Cannot build listing URL: {}", e)))?;

    let session = build_session(&config.session, None, None, None)?;
    let mut files = RunFiles::new(&config.output.directory, &city, start_page, end_page);
    let job = CrawlJob {
        city: city.trim().to_string(),
        listing_root: root,
        start_page,
        end_page,
    };

    let mut coordinator = Coordinator::new(session, config.crawler.clone(), config.pacing.clone());
    let report = coordinator.run(&job, &mut files).await?;

    if !quiet {
        print_crawl_report(&report);
        if report.dataset_written {
            println!("CSV: {}", files.csv_path().display());
            println!("JSON: {}", files.json_path().display());
        }
    }
    Ok(())
}

/// Arguments of the `details` command
struct DetailArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    min_delay: Option<f64>,
    max_delay: Option<f64>,
    limit: Option<usize>,
    cookie_string: Option<String>,
    cookie_file: Option<PathBuf>,
    user_agent: Option<String>,
}

/// Handles the `details` command
async fn handle_details(
    config: Config,
    args: DetailArgs,
    quiet: bool,
) -> lianjia_scout::Result<()> {
    let records = load_listings(&args.input)?;
    let output = args
        .output
        .unwrap_or_else(|| default_detail_output(&args.input));

    let configured = config.pacing.detail;
    let delay = PacingWindow::clamped(
        args.min_delay.unwrap_or(configured.min),
        args.max_delay.unwrap_or(configured.max),
    );

    let mut session = build_session(
        &config.session,
        args.cookie_string.as_deref(),
        args.cookie_file.as_deref(),
        args.user_agent.as_deref(),
    )?;

    let options = EnrichOptions {
        limit: args.limit,
        fetch_retries: config.crawler.fetch_retries,
        fetch_retry: config.pacing.fetch_retry,
        delay,
    };
    let report = enrich_listings(&mut session, &records, &options, &output).await?;

    if !quiet {
        print_enrich_report(&report);
    }
    Ok(())
}
