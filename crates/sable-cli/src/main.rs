// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Sable compiler command-line interface.
//!
//! This is the main entry point for the `sable` command.

use clap::{Parser, Subcommand};
use miette::Result;

mod commands;
mod manifest;

/// Sable: a statically typed, C-family language
#[derive(Debug, Parser)]
#[command(name = "sable")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a Sable project to a module AST
    Build {
        /// Project root directory
        #[arg(default_value = ".")]
        root: String,

        /// Project manifest filename within the root
        #[arg(long, default_value = "sable.project")]
        project: String,

        /// Write token-tree JSON dumps to parsertrees/
        #[arg(long)]
        dump_parse_trees: bool,
    },

    /// Check source files for errors without building
    Check {
        /// Source file or project directory to check
        #[arg(default_value = ".")]
        path: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber only if RUST_LOG is explicitly set.
    // This keeps stderr clean for diagnostic output otherwise.
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
    }

    // Install miette's fancy error handler for CLI-level failures.
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Build {
            root,
            project,
            dump_parse_trees,
        } => commands::build::build(&root, &project, dump_parse_trees),
        Command::Check { path } => commands::check::check(&path),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}
