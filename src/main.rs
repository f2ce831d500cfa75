// File: src/main.rs
//
// Main entry point for the Minipar interpreter.
// Handles command-line argument parsing and dispatches to the appropriate
// subcommand (run, check, or tokens).

use clap::{Parser as ClapParser, Subcommand};
use minipar::errors::MiniparError;
use minipar::interpreter::InterpreterConfig;
use minipar::lexer;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(
    name = "minipar",
    about = "Minipar: a small language with parallel blocks and network channels",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Run a Minipar program (reads stdin when no file is given)
    Run {
        /// Path to the .minipar file
        file: Option<PathBuf>,

        /// Skip semantic analysis
        #[arg(long)]
        no_check: bool,

        /// Stop each s_channel server after this many connections
        #[arg(long, value_name = "N")]
        max_connections: Option<usize>,

        /// Bytes read from each s_channel request
        #[arg(long, value_name = "N", default_value_t = minipar::interpreter::DEFAULT_RECV_BUFFER_SIZE)]
        recv_buffer: usize,
    },

    /// Parse and check a program without running it
    Check {
        file: PathBuf,
    },

    /// Print the token stream of a program
    Tokens {
        file: PathBuf,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("MINIPAR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn read_source(file: Option<&Path>) -> Result<String, String> {
    match file {
        Some(path) => fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path.display(), e)),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .map_err(|e| format!("failed to read stdin: {}", e))?;
            Ok(source)
        }
    }
}

fn exit_with(result: Result<(), MiniparError>) {
    if let Err(e) = result {
        eprint!("{}", e.report());
        process::exit(1);
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let source = match &cli.command {
        Commands::Run { file, .. } => read_source(file.as_deref()),
        Commands::Check { file } | Commands::Tokens { file } => read_source(Some(file)),
    };
    let source = source.unwrap_or_else(|message| {
        eprintln!("{}", message);
        process::exit(1);
    });

    match cli.command {
        Commands::Run { no_check, max_connections, recv_buffer, .. } => {
            let mut config = InterpreterConfig::new().with_recv_buffer_size(recv_buffer);
            if let Some(limit) = max_connections {
                config = config.with_max_connections(limit);
            }
            exit_with(minipar::run_pipeline(&source, config, !no_check));
        }

        Commands::Check { .. } => {
            exit_with(minipar::check_source(&source));
            println!("ok");
        }

        Commands::Tokens { .. } => {
            for (token, line) in lexer::tokenize(&source) {
                println!("{:>4}  {:<10} {}", line, token.tag.to_string(), token.value);
            }
        }
    }
}
