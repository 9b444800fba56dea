mod cli;
mod commands;
mod terminal;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::Env;

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let env = Env::new(&cli);

    match cli.command {
        Commands::Headings(args) => commands::transform(&env, args, |s| s.infer_headings()),
        Commands::Cards(args) => commands::transform(&env, args, |s| s.format_cards()),
        Commands::Strip(args) => commands::transform(&env, args, |s| s.strip_formatting()),
        Commands::Sidebar(args) => commands::sidebar(&env, args),
        Commands::Pipeline(args) => commands::pipeline(&env, args),
        Commands::Navigate(args) => commands::navigate(&env, args),
        Commands::Clear(args) => commands::clear(&env, args),
        Commands::Company(command) => commands::company(&env, command),
        Commands::Config => commands::show_config(&env),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
