use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Job board server and maintenance commands
#[derive(Debug, Parser)]
#[command(name = "job-board", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run migrations and start the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Upsert the placeholder job dataset
    Seed,
    /// Render a detail page for every approved job into a directory
    Prerender {
        #[arg(long, default_value = "public")]
        out_dir: PathBuf,
    },
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}
