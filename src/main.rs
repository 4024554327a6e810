use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber;

mod analyzer;
mod cli;
mod config;
mod graph;
mod index;
mod indexer;
mod server;
mod service;

#[derive(Parser)]
#[command(name = "codecheck")]
#[command(author = "Intent Project Team")]
#[command(version = "0.1.0")]
#[command(about = "Cross-file static consistency checker for mixed Python/C repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project directory (shorthand for 'codecheck serve <project>')
    #[arg(value_name = "PROJECT")]
    project: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the analysis server (stdio transport) - default command
    Serve {
        /// Project directory to serve
        #[arg(short, long, default_value = ".")]
        project: String,
    },

    /// Build the repository symbol table
    Index {
        /// Project directory to index
        #[arg(short, long, default_value = ".")]
        project: String,

        /// Force a full rebuild
        #[arg(short, long)]
        rebuild: bool,
    },

    /// Analyze one file against the repository index
    Analyze {
        /// File to analyze
        file: String,

        /// Project directory
        #[arg(short, long, default_value = ".")]
        project: String,

        /// Emit diagnostics as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show symbol table statistics
    Stats {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        project: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List supported languages
    Languages,
}

fn init_logging(debug: bool, verbose: bool) {
    let level = if debug {
        Level::DEBUG
    } else if verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.debug, cli.verbose);

    info!("CodeCheck v{} starting...", env!("CARGO_PKG_VERSION"));

    // Handle shorthand: codecheck <project>
    let command = if let Some(cmd) = cli.command {
        cmd
    } else if let Some(project) = cli.project {
        Commands::Serve { project }
    } else {
        Commands::Serve {
            project: ".".to_string(),
        }
    };

    match command {
        Commands::Serve { project } => {
            info!("Starting analysis server for project: {}", project);
            cli::serve::serve_stdio(project).await?;
        }

        Commands::Index { project, rebuild } => {
            cli::index::index_repo(project, rebuild).await?;
        }

        Commands::Analyze {
            file,
            project,
            json,
        } => {
            cli::analyze::analyze_file(file, project, json).await?;
        }

        Commands::Stats { project, verbose } => {
            cli::stats::show_stats(project, verbose).await?;
        }

        Commands::Languages => {
            println!("Supported languages:");
            println!("  python (.py)");
            println!("  c (.c, .h)");
        }
    }

    Ok(())
}
