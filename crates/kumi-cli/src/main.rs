//! kumi CLI
//!
//! Inspect the lint configuration kumi composes for a project

mod commands;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use colored::Colorize;
use kumi_core::init_tracing;
use std::io;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "kumi")]
#[command(about = "kumi: override-aware lint configuration composer")]
#[command(version = kumi_core::VERSION)]
#[command(
    long_about = "kumi resolves the lint configuration of a JavaScript project: the nearest\n\
project config, path-scoped overrides, runtime-gated rules and formatter settings.\n\
\n\
Examples:\n  \
kumi print-config src/index.js     # Config the engine would receive for a file\n  \
kumi groups src test               # Files grouped by the overrides they match\n  \
kumi groups --format json src      # Same, as JSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Working directory for config discovery and override matching
    #[arg(long, global = true, env = "KUMI_CWD")]
    cwd: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Number of threads to use for parallel processing
    #[arg(
        short = 'j',
        long,
        global = true,
        help = "Number of threads (default: number of CPU cores)"
    )]
    threads: Option<usize>,

    /// Generate shell completion script
    #[arg(
        long,
        value_enum,
        help = "Generate completion script for specified shell"
    )]
    generate_completion: Option<Shell>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the merged configuration for a file as JSON
    #[command(alias = "config")]
    PrintConfig {
        /// File to resolve configuration for
        #[arg(help = "File path, relative to the working directory")]
        file: PathBuf,

        /// Extra options as a JSON object, layered over the project config
        #[arg(long, help = "Caller options as JSON (e.g. '{\"space\": 4}')")]
        options: Option<String>,
    },

    /// Group files by the overrides that apply to them
    Groups {
        /// Files to group
        #[arg(required = true, help = "Files to group")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "human", help = "Output format for groups")]
        format: OutputFormat,

        /// Extra options as a JSON object, layered over the project config
        #[arg(long, help = "Caller options as JSON (e.g. '{\"esnext\": false}')")]
        options: Option<String>,
    },

    /// Show version information
    #[command(alias = "ver")]
    Version {
        /// Show detailed version information
        #[arg(long, help = "Show detailed version and build information")]
        detailed: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON format for programmatic consumption
    Json,
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.generate_completion {
        generate_completion_script(shell);
        return;
    }

    let use_colors = !cli.no_color && std::env::var("NO_COLOR").is_err();
    colored::control::set_override(use_colors);

    let log_level = match cli.verbose {
        0 => "kumi=error",
        1 => "kumi=warn",
        2 => "kumi=info",
        3 => "kumi=debug",
        _ => "kumi=trace",
    };
    unsafe {
        std::env::set_var("RUST_LOG", log_level);
    }
    init_tracing();

    if let Some(threads) = cli.threads
        && let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
    {
        error!("Failed to set thread pool size: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run_command(cli, use_colors) {
        eprintln!("{} {:#}", "error:".red(), e);
        std::process::exit(1);
    }
}

fn generate_completion_script(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn run_command(cli: Cli, use_colors: bool) -> Result<()> {
    match cli.command {
        Some(Commands::PrintConfig { file, options }) => {
            commands::print_config_command(cli.cwd, file, options.as_deref())
        }

        Some(Commands::Groups {
            paths,
            format,
            options,
        }) => commands::groups_command(cli.cwd, paths, format, options.as_deref(), use_colors),

        Some(Commands::Version { detailed }) => {
            if detailed {
                println!("kumi {}", kumi_core::VERSION);
                println!("Build information:");
                println!("  Target: {}", std::env::consts::ARCH);
                println!("  OS: {}", std::env::consts::OS);
            } else {
                println!("{}", kumi_core::VERSION);
            }
            Ok(())
        }

        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
