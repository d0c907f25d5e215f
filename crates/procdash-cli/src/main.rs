mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    catalog::{PriceSubcommand, WorkItemSubcommand},
    config::ConfigSubcommand,
    doc::DocSubcommand,
    project::ProjectSubcommand,
};
use procdash_core::types::DocumentKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "procdash",
    about = "Procurement dashboard: BQ and RAB documents, projects, SLA workdays and price databases",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .procdash/)
    #[arg(long, global = true, env = "PROCDASH_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize procdash in the current directory
    Init,

    /// Working days elapsed between two dates (YYYY-MM-DD)
    Sla {
        received: String,
        finish: String,
    },

    /// List the holiday calendar used for SLA counting
    Holidays {
        /// Only show this year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// Manage Bill of Quantity documents
    Bq {
        #[command(subcommand)]
        subcommand: DocSubcommand,
    },

    /// Manage budget plan (RAB) documents
    Rab {
        #[command(subcommand)]
        subcommand: DocSubcommand,
    },

    /// Status, SLA and workload overview
    Dashboard {
        /// Restrict to one document kind (bq or rab)
        #[arg(long)]
        kind: Option<DocumentKind>,
    },

    /// Manage the unit price database
    Price {
        #[command(subcommand)]
        subcommand: PriceSubcommand,
    },

    /// Manage work items and their price analysis
    WorkItem {
        #[command(subcommand)]
        subcommand: WorkItemSubcommand,
    },

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Sla { received, finish } => cmd::sla::run(&root, &received, &finish, cli.json),
        Commands::Holidays { year } => cmd::sla::holidays(&root, year, cli.json),
        Commands::Project { subcommand } => cmd::project::run(&root, subcommand, cli.json),
        Commands::Bq { subcommand } => cmd::doc::run(&root, DocumentKind::Bq, subcommand, cli.json),
        Commands::Rab { subcommand } => {
            cmd::doc::run(&root, DocumentKind::Rab, subcommand, cli.json)
        }
        Commands::Dashboard { kind } => cmd::dashboard::run(&root, kind, cli.json),
        Commands::Price { subcommand } => cmd::catalog::run_price(&root, subcommand, cli.json),
        Commands::WorkItem { subcommand } => {
            cmd::catalog::run_work_item(&root, subcommand, cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
