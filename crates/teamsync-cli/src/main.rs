mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "teamsync",
    about = "Sync editor rosters and package data from GitHub into the site's CSV files",
    version,
    propagate_version = true
)]
struct Cli {
    /// Site root holding the data directory (default: auto-detect from teamsync.yaml or .git/)
    #[arg(long, global = true, env = "TEAMSYNC_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// GitHub token for authenticated API calls
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the active and emeritus editor rosters from the live GitHub teams
    Editors {
        /// Compute the rosters and report, without writing files
        #[arg(long)]
        dry_run: bool,

        /// Treat a failed team fetch as an empty team instead of aborting
        #[arg(long)]
        lenient: bool,

        /// Account to leave out of both rosters (repeatable)
        #[arg(long, value_name = "LOGIN")]
        exclude: Vec<String>,
    },

    /// Fetch the package catalog and write it as CSV
    Packages {
        /// Fetch and flatten the catalog without writing the CSV
        #[arg(long)]
        dry_run: bool,
    },

    /// Normalize GitHub issue JSON (one object or an array) from a file or `-` for stdin
    Issue { file: PathBuf },

    /// Print the chart theme as a Vega-Lite config block
    Theme {
        /// Merge the theme into this chart spec and print the result
        #[arg(long, value_name = "CHART")]
        apply: Option<PathBuf>,

        /// Print the font stylesheet <link> tag instead
        #[arg(long, conflicts_with = "apply")]
        font_link: bool,
    },

    /// Show, create, or validate teamsync.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let token = cli.token;

    let result = match cli.command {
        Commands::Editors {
            dry_run,
            lenient,
            exclude,
        } => cmd::editors::run(&root, token, dry_run, lenient, exclude, cli.json),
        Commands::Packages { dry_run } => cmd::packages::run(&root, token, dry_run, cli.json),
        Commands::Issue { file } => cmd::issue::run(&file, cli.json),
        Commands::Theme { apply, font_link } => {
            cmd::theme::run(&root, apply.as_deref(), font_link)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
