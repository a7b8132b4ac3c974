use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
use commands::{cmd_cleanup, cmd_equalize, cmd_resave};

#[derive(Parser)]
#[command(name = "radioprep")]
#[command(version, about = "Batch utilities for radiograph TIFF processing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the equalize-and-report pipeline over a directory tree
    Equalize {
        /// Root directory to walk for source files
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// Source file suffix to match (default: .tif)
        #[arg(long, value_name = "SUFFIX")]
        suffix: Option<String>,

        /// Configuration file (JSON)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Number of parallel threads (1 = sequential)
        #[arg(short = 'j', long, value_name = "N", default_value = "1")]
        threads: usize,

        /// Write the list of failed files as JSON, for retrying
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Enable verbose output
        #[arg(long)]
        verbose: bool,
    },

    /// Remove generated diagnostic reports and output directories
    Cleanup {
        /// Root directory to clean
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// Enable verbose output
        #[arg(long)]
        verbose: bool,
    },

    /// Rewrite TIFF files in place via an external image tool
    Resave {
        /// Root directory to walk (defaults to the current directory)
        #[arg(value_name = "ROOT", default_value = ".")]
        root: PathBuf,

        /// External image tool to invoke
        #[arg(long, value_name = "TOOL", default_value = "mogrify")]
        tool: String,

        /// Enable verbose output
        #[arg(long)]
        verbose: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Equalize {
            root,
            suffix,
            config,
            threads,
            report,
            verbose,
        } => cmd_equalize(root, suffix, config, threads, report, verbose),

        Commands::Cleanup { root, verbose } => cmd_cleanup(root, verbose),

        Commands::Resave {
            root,
            tool,
            verbose,
        } => cmd_resave(root, tool, verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
